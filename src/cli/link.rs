//
//  git-weblinks
//  cli/link.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Link command - build a web link to a file
//!
//! Picks the host from the repository's remotes, resolves the ref for the
//! requested link type and prints the link. With `--open` the link is also
//! opened in the browser.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use crate::config::{Config, LinkFormat};
use crate::context::{RefInfo, Repository};
use crate::links::{FileInfo, LinkOptions, LinkTarget, LinkType, RefType};
use crate::locate::clamp_to_file;
use crate::output::OutputFormat;
use crate::selection::PartialSelectedRange;
use crate::util::{open_browser, resolve_path};

use super::{repository_at, CommandError, GlobalOptions};

/// Print a web link to a file
#[derive(Args, Debug)]
pub struct LinkCommand {
    /// File to link to
    pub file: PathBuf,

    /// Lines to select: 10, 10-12 or 10:3-12:8
    #[arg(long, short = 'l', value_name = "RANGE")]
    pub lines: Option<PartialSelectedRange>,

    /// Ref to link to [default: the default_link_type setting]
    #[arg(long = "type", short = 't', value_enum, conflicts_with = "reference")]
    pub link_type: Option<LinkType>,

    /// Link to this exact branch, tag or commit
    #[arg(long = "ref", value_name = "REF")]
    pub reference: Option<String>,

    /// What kind of ref --ref names
    #[arg(long, value_enum, default_value = "branch")]
    pub ref_type: RefType,

    /// Only consider this remote
    #[arg(long, short = 'r')]
    pub remote: Option<String>,

    /// Print a markdown link
    #[arg(long, short = 'm')]
    pub markdown: bool,

    /// Open the link in the browser
    #[arg(long, short = 'o')]
    pub open: bool,
}

impl LinkCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let provider = global.provider()?;

        let path = resolve_path(&self.file)?;
        let repository = self.restrict_remotes(repository_at(&path)?)?;

        let selected = provider.select(&repository).ok_or_else(|| {
            CommandError::NotFound(format!(
                "No remote of {} is on a known server. Run 'gwl handlers' to see the supported servers",
                repository.root.display()
            ))
        })?;

        let mut file = FileInfo::new(&path);
        if let Some(lines) = &self.lines {
            if let Some(range) = clamp_to_file(&path, lines)? {
                file = file.with_selection(range);
            }
        }

        let options = LinkOptions {
            target: self.target(&config),
        };
        let created = selected
            .handler
            .create_url(&repository, selected.remote_url, &file, &options)
            .await?;

        let output = global.output();
        output.write(&created, || {
            if self.markdown || config.links.link_format == LinkFormat::Markdown {
                created.markdown()
            } else {
                created.url.clone()
            }
        })?;

        if self.open {
            if output.format() == OutputFormat::Text {
                output.write_info(&format!("Opening {} in browser...", created.relative_path));
            }
            open_browser(&created.url, config.core.browser.as_deref())?;
        }

        Ok(())
    }

    fn target(&self, config: &Config) -> LinkTarget {
        match &self.reference {
            Some(reference) => LinkTarget::Ref {
                reference: explicit_ref(reference, self.ref_type),
                ref_type: self.ref_type,
            },
            None => LinkTarget::Preset(self.link_type.unwrap_or(config.links.default_link_type)),
        }
    }

    /// Drops every remote but `--remote`, when given.
    fn restrict_remotes(&self, mut repository: Repository) -> Result<Repository> {
        if let Some(name) = &self.remote {
            repository.remotes.retain(|remote| &remote.name == name);
            if repository.remotes.is_empty() {
                bail!("No remote named '{}' in {}", name, repository.root.display());
            }
        }
        Ok(repository)
    }
}

/// A ref given on the command line, in both spellings.
fn explicit_ref(reference: &str, ref_type: RefType) -> RefInfo {
    match ref_type {
        RefType::Branch => RefInfo::branch(reference.strip_prefix("refs/heads/").unwrap_or(reference)),
        RefType::Tag => RefInfo::tag(reference.strip_prefix("refs/tags/").unwrap_or(reference)),
        RefType::Commit => RefInfo::new(reference, reference),
    }
}

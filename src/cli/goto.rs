//
//  git-weblinks
//  cli/goto.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Goto command - find the local file behind a web link
//!
//! Every handler gets a chance to decode the link. The candidates are then
//! looked up in the repository around the current directory and in the
//! working copies below `--root`, and printed as `path:line:column`.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::context::{find_repositories, find_repository, Repository};
use crate::interactive::choose;
use crate::locate::{locate, LocatedFile};
use crate::output::OutputFormat;
use crate::util::resolve_path;

use super::{CommandError, GlobalOptions};

/// Find the local file a web link points to
#[derive(Args, Debug)]
pub struct GotoCommand {
    /// Link to a file on a supported host
    pub url: String,

    /// Also search the working copies below this directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl GotoCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        let provider = global.provider()?;

        let infos = provider.get_url_info(&self.url);
        if infos.is_empty() {
            return Err(CommandError::NotFound(format!("No supported host makes links like {}", self.url)).into());
        }
        debug!("{} decoded to {} candidate(s)", self.url, infos.len());

        let repositories = self.repositories().await?;
        let located = locate(&infos, &repositories, &provider)?;
        if located.is_empty() {
            let files: Vec<&str> = infos.iter().map(|info| info.file_path.as_str()).collect();
            return Err(CommandError::NotFound(format!(
                "{} was not found in any matching repository",
                files.join(" or ")
            ))
            .into());
        }

        let output = global.output();
        if output.format() == OutputFormat::Json {
            return output.write(&located, String::new);
        }

        if global.prompts(&config) {
            let labels: Vec<String> = located.iter().map(LocatedFile::position).collect();
            let index = choose("Which file?", &labels, true)?.ok_or(CommandError::Cancelled)?;
            println!("{}", labels[index]);
        } else {
            if located.len() > 1 {
                output.write_warning(&format!("{} files match the link", located.len()));
            }
            for file in &located {
                println!("{}", file.position());
            }
        }
        Ok(())
    }

    /// The repository around the current directory, then those below `--root`.
    async fn repositories(&self) -> Result<Vec<Repository>> {
        let cwd = std::env::current_dir().context("Failed to read the current directory")?;
        let mut repositories: Vec<Repository> = find_repository(&cwd)?.into_iter().collect();

        if let Some(root) = &self.root {
            let root = resolve_path(root)?;
            let found = tokio::task::spawn_blocking(move || find_repositories(&root))
                .await
                .context("Repository search failed")?;
            repositories.extend(found);
        }

        let mut seen = HashSet::new();
        repositories.retain(|repository| seen.insert(repository.root.clone()));
        Ok(repositories)
    }
}

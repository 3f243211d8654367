//
//  git-weblinks
//  cli/refs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Refs command - preview the ref behind every link type

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::context::RefInfo;
use crate::links::{LinkError, LinkType};
use crate::output::{or_dash, TableOutput};
use crate::util::resolve_path;

use super::{repository_at, CommandError, GlobalOptions};

/// Show the refs each link type would use
#[derive(Args, Debug)]
pub struct RefsCommand {
    /// A path inside the repository [default: current directory]
    pub path: Option<PathBuf>,
}

/// One link type and what it resolved to.
#[derive(Debug, Serialize)]
struct RefRow {
    link_type: LinkType,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<RefInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RefRow {
    fn new(link_type: LinkType, result: Result<RefInfo, LinkError>) -> Self {
        match result {
            Ok(reference) => Self {
                link_type,
                reference: Some(reference),
                error: None,
            },
            Err(e) => Self {
                link_type,
                reference: None,
                error: Some(e.to_string()),
            },
        }
    }
}

impl TableOutput for RefRow {
    fn headers() -> &'static [&'static str] {
        &["Type", "Ref", "Symbolic"]
    }

    fn row(&self) -> Vec<String> {
        match (&self.reference, &self.error) {
            (Some(reference), _) => vec![
                self.link_type.to_string(),
                reference.abbreviated.clone(),
                or_dash(&reference.symbolic),
            ],
            (None, error) => vec![
                self.link_type.to_string(),
                or_dash(error.as_deref().unwrap_or_default()),
                "-".to_string(),
            ],
        }
    }
}

impl RefsCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let provider = global.provider()?;
        let path = resolve_path(self.path.as_deref().unwrap_or(std::path::Path::new(".")))?;
        let repository = repository_at(&path)?;

        let selected = provider.select(&repository).ok_or_else(|| {
            CommandError::NotFound(format!("No remote of {} is on a known server", repository.root.display()))
        })?;
        let handler = selected.handler;

        let (branch, commit, default_branch, tag) = tokio::join!(
            handler.get_ref(LinkType::Branch, &repository, selected.remote_url),
            handler.get_ref(LinkType::Commit, &repository, selected.remote_url),
            handler.get_ref(LinkType::DefaultBranch, &repository, selected.remote_url),
            handler.get_ref(LinkType::Tag, &repository, selected.remote_url),
        );

        let rows: Vec<RefRow> = LinkType::ALL
            .into_iter()
            .zip([branch, commit, default_branch, tag])
            .map(|(link_type, result)| RefRow::new(link_type, result))
            .collect();

        global.output().write_list(&rows)
    }
}

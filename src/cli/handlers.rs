//
//  git-weblinks
//  cli/handlers.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Handlers command - list supported hosts
//!
//! Shows each handler in the order it is tried, the servers it currently
//! knows (built-in and configured), and the configuration keys that add
//! more.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::links::LinkHandler;
use crate::output::TableOutput;

use super::GlobalOptions;

/// List the supported hosts and their servers
#[derive(Args, Debug)]
pub struct HandlersCommand {
    /// Only show handlers that have servers
    #[arg(long)]
    pub configured: bool,
}

#[derive(Debug, Serialize)]
struct HandlerRow {
    name: String,
    self_hosted: bool,
    servers: Vec<String>,
    settings_keys: Vec<String>,
}

impl From<&LinkHandler> for HandlerRow {
    fn from(handler: &LinkHandler) -> Self {
        let definition = handler.definition();
        Self {
            name: handler.name().to_string(),
            self_hosted: definition.is_private(),
            servers: handler.servers(),
            settings_keys: definition
                .server_settings_keys()
                .into_iter()
                .map(|key| format!("servers.{key}"))
                .collect(),
        }
    }
}

impl TableOutput for HandlerRow {
    fn headers() -> &'static [&'static str] {
        &["Handler", "Servers", "Configure with"]
    }

    fn row(&self) -> Vec<String> {
        let servers = if self.servers.is_empty() {
            "(none configured)".to_string()
        } else {
            self.servers.join("\n")
        };
        let keys = if self.settings_keys.is_empty() {
            "-".to_string()
        } else {
            self.settings_keys.join(", ")
        };
        vec![self.name.clone(), servers, keys]
    }
}

impl HandlersCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let provider = global.provider()?;
        let rows: Vec<HandlerRow> = provider
            .handlers()
            .iter()
            .map(HandlerRow::from)
            .filter(|row| !self.configured || !row.servers.is_empty())
            .collect();
        global.output().write_list(&rows)
    }
}

//
//  git-weblinks
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod completion;
mod config;
mod goto;
mod handlers;
mod link;
mod refs;

pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use goto::GotoCommand;
pub use handlers::HandlersCommand;
pub use link::LinkCommand;
pub use refs::RefsCommand;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{Config, ConfigFile};
use crate::context::{find_repository, LocalGit, Repository};
use crate::links::LinkHandlerProvider;
use crate::output::{OutputFormat, OutputWriter};

/// gwl - Share links to code in your git repositories
#[derive(Parser, Debug)]
#[command(
    name = "gwl",
    version,
    about = "Turn files in a git repository into web links, and back",
    long_about = "gwl builds links to files and line ranges on GitHub, GitLab, Bitbucket, \
                  Azure DevOps, Gitea and Gitiles.\n\n\
                  It also takes such a link and finds the file it points to in your working copies.",
    propagate_version = true,
    after_help = "Use 'gwl <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(
        long,
        global = true,
        env = "GWL_NO_PROMPT",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_prompt: bool,

    /// Configuration file to use instead of the default one
    #[arg(long, global = true, env = "GWL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    /// The configuration file in effect.
    pub fn config_path(&self) -> Result<PathBuf> {
        Config::resolve_path(self.config.as_deref())
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }

    /// A provider reading servers from the configuration file on every match.
    pub fn provider(&self) -> Result<LinkHandlerProvider> {
        let settings = Arc::new(ConfigFile::new(self.config_path()?));
        Ok(LinkHandlerProvider::new(settings, Arc::new(LocalGit))?)
    }

    pub fn output(&self) -> OutputWriter {
        OutputWriter::new(OutputFormat::from_json_flag(self.json))
    }

    /// Whether to ask the user. `--no-prompt`, JSON output and the `prompt`
    /// setting all turn prompts off.
    pub fn prompts(&self, config: &Config) -> bool {
        !self.no_prompt && !self.json && config.prompts_enabled() && console::user_attended()
    }
}

/// Failures that map to their own exit code.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    NotFound(String),

    #[error("Cancelled")]
    Cancelled,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a web link to a file
    #[command(visible_alias = "l")]
    Link(LinkCommand),

    /// Find the local file a web link points to
    #[command(visible_alias = "open")]
    Goto(GotoCommand),

    /// Show the refs each link type would use
    Refs(RefsCommand),

    /// List the supported hosts and their servers
    Handlers(HandlersCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}

/// The repository containing `path`.
fn repository_at(path: &Path) -> Result<Repository> {
    let dir = if path.is_file() { path.parent().unwrap_or(path) } else { path };
    find_repository(dir)?
        .with_context(|| format!("{} is not inside a git repository", path.display()))
}

//
//  git-weblinks
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # git-weblinks
//!
//! Links from files in a git working copy to the same file on its hosting
//! service, and back.
//!
//! ## Overview
//!
//! This library provides the engine behind the `gwl` CLI. Given a file, a
//! line range and a repository, it picks the host from the remotes and
//! builds a link such as
//! `https://github.com/acme/widgets/blob/main/src/index.ts#L10-L12`. Given
//! such a link, it works out which file and lines it points to.
//!
//! ## Features
//!
//! - **Seven hosts**: GitHub, GitLab, Bitbucket Cloud, Bitbucket Server,
//!   Azure DevOps, Gitea and Gitiles, including self-hosted installations
//! - **Hosts as data**: every host is a YAML table of templates and patterns
//! - **Any ref**: current branch, commit, the remote's default branch or a tag
//! - **Reverse lookup**: decode a link and find the file across working copies
//!
//! ## Module Structure
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`links`]: Handler definitions, templates, server matching, link creation
//! - [`selection`]: Line/column ranges and clamping
//! - [`context`]: Repository discovery and ref resolution on libgit2
//! - [`config`]: Configuration file management
//! - [`locate`]: Finding the file behind a decoded link
//! - [`output`]: Output formatting (text and JSON)
//! - [`interactive`]: Prompts
//! - [`util`]: Utility functions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use git_weblinks::{Config, LinkHandlerProvider};
//! use git_weblinks::context::{find_repository, LocalGit};
//! use git_weblinks::links::{FileInfo, LinkOptions};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let provider = LinkHandlerProvider::new(Arc::new(config), Arc::new(LocalGit))?;
//!
//! let repository = find_repository(std::path::Path::new("."))?.expect("not in a repository");
//! let selected = provider.select(&repository).expect("no supported remote");
//! let created = selected
//!     .handler
//!     .create_url(&repository, selected.remote_url, &FileInfo::new("src/lib.rs"), &LinkOptions::default())
//!     .await?;
//! println!("{}", created.url);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Configuration file management.
///
/// Manages the CLI's configuration stored in platform-specific locations:
/// - Linux: `~/.config/gwl/config.toml`
/// - macOS: `~/Library/Application Support/gwl/config.toml`
/// - Windows: `%APPDATA%\gwl\config\config.toml`
pub mod config;

/// Git repository context.
///
/// Discovers working copies and their remotes, and resolves branches,
/// commits and tags through libgit2.
pub mod context;

/// The link engine.
pub mod links;

/// Reverse lookup of decoded links to files on disk.
pub mod locate;

/// Line and column ranges.
pub mod selection;

/// Output formatting for text and JSON.
pub mod output;

/// Interactive prompts.
pub mod interactive;

/// Utility functions and helpers.
pub mod util;

/// Re-export of the main CLI struct for convenient access.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use git_weblinks::Cli;
///
/// let cli = Cli::parse();
/// ```
pub use cli::Cli;

/// Re-export of the configuration struct.
pub use config::Config;

/// Re-export of the handler registry.
pub use links::LinkHandlerProvider;

/// Application name constant.
///
/// The name of the CLI binary, used for display purposes and shell completions.
pub const APP_NAME: &str = "gwl";

/// Application version constant.
///
/// # Example
///
/// ```rust
/// use git_weblinks::VERSION;
///
/// println!("gwl version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Example
///
/// ```rust,no_run
/// use git_weblinks::exit_codes;
/// use std::process;
///
/// process::exit(exit_codes::NOT_FOUND);
/// ```
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// An unspecified error occurred during execution.
    /// Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// No branch to link to.
    ///
    /// HEAD is detached, or the remote's HEAD is not known locally. Link to
    /// a commit instead, or run `git remote set-head <remote> --auto`.
    pub const NO_REMOTE_HEAD: i32 = 4;

    /// Nothing matched.
    ///
    /// No remote is on a supported server, no handler decodes the link, or
    /// the linked file is not in any working copy.
    pub const NOT_FOUND: i32 = 8;

    /// Operation cancelled by user.
    pub const CANCELLED: i32 = 16;
}

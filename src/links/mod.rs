//
//  git-weblinks
//  links/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Link Engine
//!
//! Builds web links for files in a git repository and decodes them again.
//!
//! ## Supported Hosts
//!
//! | Handler | Servers |
//! |---------|---------|
//! | Bitbucket Server | configured only (`bitbucket_server`) |
//! | Gitea | configured only (`gitea`) |
//! | Gitiles | configured only (`gitiles`) |
//! | Azure DevOps | `dev.azure.com`, `ssh.dev.azure.com` |
//! | Bitbucket | `bitbucket.org` |
//! | GitHub | `github.com`, plus `github_enterprise` |
//! | GitLab | `gitlab.com`, plus `gitlab_enterprise` |
//!
//! ## Architecture
//!
//! Hosts are data, not code. Each one is a YAML [`HandlerDefinition`] with
//! templates for the link, the selection suffix and the reverse mapping.
//! A single [`LinkHandler`] type interprets any definition:
//!
//! - [`template`]: tera templates and URI encoding
//! - [`server`]: matching remote and web URLs to servers
//! - [`definition`]: the definition model and the built-in set
//! - [`handler`]: link creation and reverse lookup for one definition
//! - [`provider`]: handler selection across all definitions
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use git_weblinks::config::Config;
//! use git_weblinks::context::LocalGit;
//! use git_weblinks::links::LinkHandlerProvider;
//!
//! let provider = LinkHandlerProvider::new(Arc::new(Config::default()), Arc::new(LocalGit))
//!     .expect("built-in definitions are valid");
//!
//! for info in provider.get_url_info("https://github.com/acme/widgets/blob/main/src/lib.rs#L3") {
//!     println!("{} -> {} {:?}", info.handler, info.file_path, info.selection.start_line);
//! }
//! ```

/// Handler definitions and the built-in set.
pub mod definition;

/// Error type shared by the link engine.
pub mod error;

/// One compiled handler.
pub mod handler;

/// The handler registry.
pub mod provider;

/// Server lists and URL normalization.
pub mod server;

/// What to link to, and what was produced.
pub mod target;

/// Templates and URI encoding.
pub mod template;

pub use definition::{
    builtin_definitions, BranchRefKind, HandlerDefinition, QueryModification, ReverseSelectionTemplates,
    ReverseServerTemplates, ReverseSettings, ServerSource,
};
pub use error::LinkError;
pub use handler::{LinkHandler, UrlInfo};
pub use provider::{LinkHandlerProvider, SelectedHandler};
pub use server::{normalize_url, repository_path, DynamicServer, RemoteServer, ServerFactory, ServerSpec, StaticServer};
pub use target::{CreatedUrl, FileInfo, LinkOptions, LinkTarget, LinkType, RefType};
pub use template::{decode_uri, encode_uri, encode_uri_component, Template, TemplateContext};

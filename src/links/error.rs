//
//  git-weblinks
//  links/error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Error type for link creation and handler loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading handler definitions or creating a link.
///
/// "No handler matched" and "no server matched" during selection or reverse
/// lookup are not errors; those paths return `None` or an empty list.
///
/// | Variant | Raised by | Recoverable by the caller |
/// |---------|-----------|---------------------------|
/// | `NoRemoteHead` | ref resolution | yes, with a specific message |
/// | `NoTag` | ref resolution | yes |
/// | `NoMatchingServer` | `create_url` | yes |
/// | `FileOutsideRepository` | `create_url` | yes |
/// | `InvalidDefinition` | definition loading | no, the definition is broken |
/// | `InvalidUrl` | `create_url` | no, the definition is broken |
/// | `Template` | rendering | no |
/// | `InvalidPattern` | definition loading | no |
/// | `Git` | the VCS collaborator | propagated unchanged |
#[derive(Error, Debug)]
pub enum LinkError {
    /// The branch to link to could not be determined: HEAD is detached, or
    /// the remote has no default branch configured.
    #[error("{0}")]
    NoRemoteHead(String),

    /// No tag points at the current commit.
    #[error("No tag points at the current commit")]
    NoTag,

    /// The remote URL does not belong to any server of the handler.
    #[error("The remote '{0}' does not match any server of this handler")]
    NoMatchingServer(String),

    /// The file is not inside the repository's working directory.
    #[error("'{}' is not inside the repository", .0.display())]
    FileOutsideRepository(PathBuf),

    /// A handler definition failed validation.
    #[error("Invalid handler definition '{handler}': {reason}")]
    InvalidDefinition { handler: String, reason: String },

    /// A template produced something that is not an absolute URL.
    #[error("Handler '{handler}' produced an invalid URL '{url}': {source}")]
    InvalidUrl {
        handler: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A template failed to parse or render.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// A regular expression in a definition failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Any failure of the git collaborator.
    #[error(transparent)]
    Git(#[from] anyhow::Error),
}

impl LinkError {
    /// Shorthand for building an [`LinkError::InvalidDefinition`].
    pub fn invalid_definition(handler: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            handler: handler.to_string(),
            reason: reason.into(),
        }
    }
}

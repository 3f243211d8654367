//
//  git-weblinks
//  links/definition.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Handler Definitions
//!
//! Declarative description of one hosting provider's URL dialect. A
//! definition carries no behavior; [`LinkHandler`](super::LinkHandler)
//! compiles and validates it.
//!
//! ## Fields
//!
//! | Field | Purpose |
//! |-------|---------|
//! | `branch_ref` | whether branches are linked by short name or full ref |
//! | `settings_keys` | configuration keys that affect this handler |
//! | `server` | public server list, or the settings key of a self-hosted product |
//! | `url` | template producing the link to a file |
//! | `query` | query parameters added for matching file paths |
//! | `selection` | template producing the line range suffix |
//! | `reverse` | how to decode a link back into file and selection |
//!
//! ## Template variables
//!
//! `url` sees `base`, `http`, `ssh`, `web`, `repository`, `ref`,
//! `encoded_ref`, `ref_type`, `file` and `raw_file`. `selection` sees
//! `startLine`, `startColumn`, `endLine` and `endColumn`. The reverse
//! templates see the match of `reverse.pattern` as `captures.<name>` and
//! `groups`, plus the matched server as `server.http`, `server.ssh` and
//! `server.web`.
//!
//! ## Built-in definitions
//!
//! The built-in providers are YAML files embedded at compile time, returned
//! by [`builtin_definitions`] in priority order: self-hosted products first,
//! then public ones.

use serde::{Deserialize, Serialize};

use super::error::LinkError;
use super::server::ServerSpec;

/// How a branch is written into a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchRefKind {
    /// `main`
    #[default]
    Abbreviated,
    /// `refs/heads/main`
    Symbolic,
}

/// Where a handler's servers come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerSource {
    /// A product with public servers. Servers configured under the
    /// definition's `settings_keys` are tried after the public ones.
    Public { servers: Vec<ServerSpec> },
    /// A self-hosted product; every server comes from configuration.
    Private { settings_key: String },
}

/// A query parameter appended when `pattern` matches the file path
/// relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryModification {
    pub pattern: String,
    pub key: String,
    pub value: String,
}

/// Templates rebuilding the server of a decoded link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseServerTemplates {
    pub http: String,
    pub ssh: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<String>,
}

/// Templates extracting the selection of a decoded link. Absent templates
/// leave the field unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseSelectionTemplates {
    pub start_line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<String>,
}

/// Decoding rules for links produced by the same definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseSettings {
    /// Regex run against the link.
    pub pattern: String,
    /// Template producing the percent-encoded file path.
    pub file: String,
    /// Set when the ref and the file path cannot be told apart, so the
    /// extracted path may still start with part of a branch name.
    #[serde(default)]
    pub file_may_start_with_branch: bool,
    pub server: ReverseServerTemplates,
    pub selection: ReverseSelectionTemplates,
}

/// One hosting provider's URL dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerDefinition {
    pub name: String,
    #[serde(default)]
    pub branch_ref: BranchRefKind,
    #[serde(default)]
    pub settings_keys: Vec<String>,
    pub server: ServerSource,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryModification>,
    pub selection: String,
    pub reverse: ReverseSettings,
}

impl HandlerDefinition {
    /// Parses a definition from YAML.
    ///
    /// `origin` names the source in error messages.
    pub fn from_yaml(origin: &str, yaml: &str) -> Result<Self, LinkError> {
        serde_yaml::from_str(yaml).map_err(|e| LinkError::invalid_definition(origin, e.to_string()))
    }

    /// The configuration keys user servers are read from.
    pub fn server_settings_keys(&self) -> Vec<&str> {
        match &self.server {
            ServerSource::Public { .. } => self.settings_keys.iter().map(String::as_str).collect(),
            ServerSource::Private { settings_key } => vec![settings_key.as_str()],
        }
    }

    /// Whether the product only exists as self-hosted installations.
    pub fn is_private(&self) -> bool {
        matches!(self.server, ServerSource::Private { .. })
    }
}

/// Embedded provider tables, in priority order.
const BUILTIN: &[(&str, &str)] = &[
    ("bitbucket-server.yaml", include_str!("definitions/bitbucket-server.yaml")),
    ("gitea.yaml", include_str!("definitions/gitea.yaml")),
    ("gitiles.yaml", include_str!("definitions/gitiles.yaml")),
    ("azure-devops.yaml", include_str!("definitions/azure-devops.yaml")),
    ("bitbucket.yaml", include_str!("definitions/bitbucket.yaml")),
    ("github.yaml", include_str!("definitions/github.yaml")),
    ("gitlab.yaml", include_str!("definitions/gitlab.yaml")),
];

/// Parses the built-in definitions.
pub fn builtin_definitions() -> Result<Vec<HandlerDefinition>, LinkError> {
    BUILTIN
        .iter()
        .map(|(origin, yaml)| HandlerDefinition::from_yaml(origin, yaml))
        .collect()
}

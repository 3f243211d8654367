//
//  git-weblinks
//  links/target.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Inputs and outputs of link creation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::context::RefInfo;
use crate::selection::SelectedRange;

/// Which ref a link should point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// The commit HEAD points at.
    Commit,
    /// The checked out branch.
    #[default]
    Branch,
    /// The branch the remote's HEAD points at.
    DefaultBranch,
    /// A tag pointing at HEAD.
    Tag,
}

impl LinkType {
    pub const ALL: [LinkType; 4] = [
        LinkType::Branch,
        LinkType::Commit,
        LinkType::DefaultBranch,
        LinkType::Tag,
    ];

    /// The kind of ref this link type resolves to.
    pub fn ref_type(self) -> RefType {
        match self {
            LinkType::Commit => RefType::Commit,
            LinkType::Branch | LinkType::DefaultBranch => RefType::Branch,
            LinkType::Tag => RefType::Tag,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Commit => "commit",
            LinkType::Branch => "branch",
            LinkType::DefaultBranch => "default_branch",
            LinkType::Tag => "tag",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "commit" => Ok(LinkType::Commit),
            "branch" => Ok(LinkType::Branch),
            "default_branch" => Ok(LinkType::DefaultBranch),
            "tag" => Ok(LinkType::Tag),
            _ => anyhow::bail!(
                "Invalid link type '{}'. Expected branch, commit, default_branch or tag",
                s
            ),
        }
    }
}

/// The kind of an already resolved ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Branch,
    Commit,
    Tag,
}

impl RefType {
    /// The value templates see as `ref_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            RefType::Branch => "branch",
            RefType::Commit => "commit",
            RefType::Tag => "tag",
        }
    }
}

/// What a link points at: a policy, or an exact ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Resolve the ref from the working copy when the link is created.
    Preset(LinkType),
    /// Use this ref as given.
    Ref { reference: RefInfo, ref_type: RefType },
}

impl Default for LinkTarget {
    fn default() -> Self {
        LinkTarget::Preset(LinkType::default())
    }
}

/// Options for [`LinkHandler::create_url`](super::LinkHandler::create_url).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOptions {
    pub target: LinkTarget,
}

impl LinkOptions {
    pub fn preset(link_type: LinkType) -> Self {
        Self {
            target: LinkTarget::Preset(link_type),
        }
    }
}

/// A file in a working copy, with an optional selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Absolute, or relative to the repository root.
    pub path: PathBuf,
    pub selection: Option<SelectedRange>,
}

impl FileInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: SelectedRange) -> Self {
        self.selection = Some(selection);
        self
    }
}

/// A link to a file.
///
/// # Fields
///
/// * `url` - The complete link
/// * `relative_path` - The file path relative to the repository root, not encoded
/// * `selection` - The rendered selection suffix, when a selection was given
/// * `range` - The selection itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedUrl {
    pub url: String,
    pub relative_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SelectedRange>,
}

impl CreatedUrl {
    /// A markdown link labelled with the path and selection.
    ///
    /// The label carries the host's own selection suffix when that suffix
    /// is a fragment. Hosts that anchor lines in the query get the
    /// `L10-L12` form instead.
    ///
    /// ```rust
    /// use git_weblinks::links::CreatedUrl;
    /// use git_weblinks::selection::SelectedRange;
    ///
    /// let created = CreatedUrl {
    ///     url: "https://github.com/acme/widgets/blob/main/src/index.ts#L10-L12".into(),
    ///     relative_path: "src/index.ts".into(),
    ///     selection: Some("#L10-L12".into()),
    ///     range: Some(SelectedRange::lines(10, 12)),
    /// };
    /// assert_eq!(
    ///     created.markdown(),
    ///     "[src/index.ts#L10-L12](https://github.com/acme/widgets/blob/main/src/index.ts#L10-L12)"
    /// );
    /// ```
    pub fn markdown(&self) -> String {
        let label = match (&self.selection, &self.range) {
            (Some(suffix), _) if suffix.starts_with('#') => format!("{}{}", self.relative_path, suffix),
            (_, Some(range)) => format!("{}#{}", self.relative_path, range.label()),
            _ => self.relative_path.clone(),
        };
        format!("[{}]({})", label, self.url)
    }
}

//
//  git-weblinks
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Context Module
//!
//! Everything the link engine needs to know about a working copy, and the
//! collaborators that find it out.
//!
//! ## Overview
//!
//! - [`Repository`] and [`Remote`]: the root of a working copy and its
//!   remotes, read once per command
//! - [`Git`]: asynchronous ref resolution (current branch, HEAD commit,
//!   a remote's default branch, a tag at HEAD)
//! - [`LocalGit`]: the [`Git`] implementation on libgit2
//! - [`find_repository`] / [`find_repositories`]: repository discovery
//!
//! ## Example
//!
//! ```rust,no_run
//! use git_weblinks::context::{find_repository, Git, LocalGit};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let repository = find_repository(std::path::Path::new("."))?
//!     .ok_or_else(|| anyhow::anyhow!("Not in a git repository"))?;
//!
//! let git = LocalGit;
//! if let Some(branch) = git.current_branch(&repository.root).await? {
//!     println!("On {}", branch.abbreviated);
//! }
//! # Ok(())
//! # }
//! ```

mod discovery;
mod git;

pub use discovery::*;
pub use git::*;

use std::path::PathBuf;

use serde::Serialize;

/// A git working copy.
///
/// # Fields
///
/// * `root` - Absolute path of the working directory
/// * `remotes` - Remotes in the order git lists them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub root: PathBuf,
    pub remotes: Vec<Remote>,
}

impl Repository {
    /// Finds the remote one of whose URLs is `url`.
    pub fn remote_for_url(&self, url: &str) -> Option<&Remote> {
        self.remotes
            .iter()
            .find(|remote| remote.urls.iter().any(|u| u == url))
    }
}

/// A named remote with its fetch URL and, when different, its push URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub urls: Vec<String>,
}

/// A ref in both of its spellings.
///
/// | Ref | `abbreviated` | `symbolic` |
/// |-----|---------------|------------|
/// | branch | `main` | `refs/heads/main` |
/// | tag | `v1.2.0` | `refs/tags/v1.2.0` |
/// | commit | `1a2b3c4` | the full hash |
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefInfo {
    pub abbreviated: String,
    pub symbolic: String,
}

impl RefInfo {
    pub fn new(abbreviated: impl Into<String>, symbolic: impl Into<String>) -> Self {
        Self {
            abbreviated: abbreviated.into(),
            symbolic: symbolic.into(),
        }
    }

    /// A branch ref from its short name.
    pub fn branch(name: &str) -> Self {
        Self::new(name, format!("refs/heads/{name}"))
    }

    /// A tag ref from its short name.
    pub fn tag(name: &str) -> Self {
        Self::new(name, format!("refs/tags/{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_for_url() {
        let repository = Repository {
            root: PathBuf::from("/work/widgets"),
            remotes: vec![
                Remote {
                    name: "origin".into(),
                    urls: vec!["git@github.com:me/widgets.git".into()],
                },
                Remote {
                    name: "upstream".into(),
                    urls: vec![
                        "https://github.com/acme/widgets.git".into(),
                        "git@github.com:acme/widgets.git".into(),
                    ],
                },
            ],
        };
        let remote = repository.remote_for_url("git@github.com:acme/widgets.git").unwrap();
        assert_eq!(remote.name, "upstream");
        assert!(repository.remote_for_url("git@gitlab.com:acme/widgets.git").is_none());
    }

    #[test]
    fn test_ref_constructors() {
        assert_eq!(RefInfo::branch("feature/x").symbolic, "refs/heads/feature/x");
        assert_eq!(RefInfo::tag("v1.0").abbreviated, "v1.0");
    }
}

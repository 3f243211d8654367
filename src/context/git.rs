//
//  git-weblinks
//  context/git.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Ref Resolution
//!
//! The [`Git`] trait is the only place the link engine suspends. Each call is
//! a single attempt: failures are returned to the caller as they are, never
//! retried.
//!
//! [`LocalGit`] answers through libgit2. libgit2 is blocking, so every call
//! opens the repository on tokio's blocking pool.
//!
//! ## Notes
//!
//! - "Not available" answers (detached HEAD, no remote HEAD, no tag) are
//!   `Ok(None)`; only unexpected repository errors are `Err`
//! - A repository is opened per call; nothing is cached between calls

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use git2::{ErrorCode, Repository as GitRepository};
use tracing::debug;

use super::RefInfo;

/// Resolves refs of a working copy.
#[async_trait]
pub trait Git: Send + Sync {
    /// The checked out branch, or `None` when HEAD is detached.
    async fn current_branch(&self, root: &Path) -> Result<Option<RefInfo>>;

    /// The commit HEAD points at.
    async fn commit(&self, root: &Path) -> Result<RefInfo>;

    /// The branch `refs/remotes/<remote>/HEAD` points at, if configured.
    async fn default_branch(&self, root: &Path, remote: &str) -> Result<Option<RefInfo>>;

    /// A tag pointing at the HEAD commit. The first in name order wins.
    async fn head_tag(&self, root: &Path) -> Result<Option<RefInfo>>;
}

/// [`Git`] on libgit2.
///
/// # Example
///
/// ```rust,no_run
/// use git_weblinks::context::{Git, LocalGit};
/// use std::path::Path;
///
/// # async fn run() -> anyhow::Result<()> {
/// let commit = LocalGit.commit(Path::new("/path/to/repo")).await?;
/// println!("HEAD is {}", commit.symbolic);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGit;

/// Opens the repository at `root` on the blocking pool and runs `f` on it.
async fn with_repository<T, F>(root: &Path, f: F) -> Result<T>
where
    F: FnOnce(&GitRepository) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let repo = GitRepository::open(&root)
            .with_context(|| format!("Failed to open repository at {}", root.display()))?;
        f(&repo)
    })
    .await?
}

#[async_trait]
impl Git for LocalGit {
    async fn current_branch(&self, root: &Path) -> Result<Option<RefInfo>> {
        with_repository(root, |repo| {
            // Read HEAD itself so an unborn branch still resolves.
            let head = repo.find_reference("HEAD")?;
            let branch = head
                .symbolic_target()
                .and_then(|target| target.strip_prefix("refs/heads/"))
                .map(RefInfo::branch);
            debug!("Current branch: {:?}", branch);
            Ok(branch)
        })
        .await
    }

    async fn commit(&self, root: &Path) -> Result<RefInfo> {
        with_repository(root, |repo| {
            let commit = repo
                .head()
                .and_then(|head| head.peel_to_commit())
                .context("HEAD does not point at a commit")?;
            let short = commit.as_object().short_id()?;
            let abbreviated = short.as_str().unwrap_or_default().to_string();
            Ok(RefInfo::new(abbreviated, commit.id().to_string()))
        })
        .await
    }

    async fn default_branch(&self, root: &Path, remote: &str) -> Result<Option<RefInfo>> {
        let name = format!("refs/remotes/{remote}/HEAD");
        let prefix = format!("refs/remotes/{remote}/");
        with_repository(root, move |repo| {
            let reference = match repo.find_reference(&name) {
                Ok(reference) => reference,
                Err(e) if e.code() == ErrorCode::NotFound => {
                    debug!("{} is not set", name);
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            Ok(reference
                .symbolic_target()
                .and_then(|target| target.strip_prefix(&prefix))
                .map(RefInfo::branch))
        })
        .await
    }

    async fn head_tag(&self, root: &Path) -> Result<Option<RefInfo>> {
        with_repository(root, |repo| {
            let head = match repo.head() {
                Ok(head) => head.peel_to_commit()?.id(),
                Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let mut names: Vec<String> = repo.tag_names(None)?.iter().flatten().map(String::from).collect();
            names.sort();

            for name in names {
                let reference = repo.find_reference(&format!("refs/tags/{name}"))?;
                // Tags pointing at trees or blobs are skipped.
                let Ok(commit) = reference.peel_to_commit() else {
                    continue;
                };
                if commit.id() == head {
                    return Ok(Some(RefInfo::tag(&name)));
                }
            }
            Ok(None)
        })
        .await
    }
}

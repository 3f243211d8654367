//
//  git-weblinks
//  context/discovery.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Discovery
//!
//! Finds working copies and reads their remotes.
//!
//! - [`find_repository`] walks up from a path, the way `git` itself does
//! - [`find_repositories`] walks down a directory tree and returns every
//!   working copy below it, used when decoding a link whose repository is
//!   not the current one
//!
//! Bare repositories have no working directory and are never returned.

use std::path::Path;

use anyhow::Result;
use git2::{ErrorCode, Repository as GitRepository};
use tracing::debug;
use walkdir::WalkDir;

use super::{Remote, Repository};

/// Finds the working copy containing `path`.
///
/// # Returns
///
/// - `Ok(Some(Repository))` when `path` is inside a working copy
/// - `Ok(None)` when it is not, or the repository is bare
/// - `Err` for unexpected repository errors
///
/// # Example
///
/// ```rust,no_run
/// use git_weblinks::context::find_repository;
/// use std::path::Path;
///
/// if let Some(repository) = find_repository(Path::new("src/main.rs"))? {
///     println!("Root: {}", repository.root.display());
///     for remote in &repository.remotes {
///         println!("  {} -> {:?}", remote.name, remote.urls);
///     }
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn find_repository(path: &Path) -> Result<Option<Repository>> {
    let repo = match GitRepository::discover(path) {
        Ok(repo) => repo,
        Err(e) if e.code() == ErrorCode::NotFound => {
            debug!("No repository contains {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    read_repository(&repo)
}

/// Finds every working copy at or below `root`.
///
/// Unreadable directories are skipped. The search does not descend into
/// `.git` directories, but does descend into working copies, so nested
/// repositories and submodules are found as well.
pub fn find_repositories(root: &Path) -> Vec<Repository> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir() && entry.path().join(".git").exists())
        .filter_map(|entry| match GitRepository::open(entry.path()) {
            Ok(repo) => read_repository(&repo).ok().flatten(),
            Err(e) => {
                debug!("Skipping {}: {}", entry.path().display(), e);
                None
            }
        })
        .collect()
}

fn read_repository(repo: &GitRepository) -> Result<Option<Repository>> {
    let Some(workdir) = repo.workdir() else {
        return Ok(None);
    };
    let root = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());

    let mut remotes = Vec::new();
    for name in repo.remotes()?.iter().flatten() {
        let remote = repo.find_remote(name)?;
        let mut urls: Vec<String> = remote.url().map(String::from).into_iter().collect();
        if let Some(push) = remote.pushurl() {
            if !urls.iter().any(|url| url == push) {
                urls.push(push.to_string());
            }
        }
        remotes.push(Remote {
            name: name.to_string(),
            urls,
        });
    }

    Ok(Some(Repository { root, remotes }))
}

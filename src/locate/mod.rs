//
//  git-weblinks
//  locate/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # File Location
//!
//! The last step of the reverse path: turning [`UrlInfo`] candidates into
//! files on disk.
//!
//! A candidate applies to a repository when one of the repository's remotes
//! belongs to the same server as the link, according to the handler that
//! decoded it. Within such a repository the file path is tried as is, and
//! when the handler flagged it with `file_may_start_with_branch`, with its
//! leading segments dropped one at a time. The longest path that names an
//! existing file wins.
//!
//! The link's selection is then clamped against the file's contents.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::context::Repository;
use crate::links::{normalize_url, LinkHandlerProvider, UrlInfo};
use crate::selection::{clamp, to_selection, EditorSelection, PartialSelectedRange, SelectedRange};

/// A file a link points to.
///
/// # Fields
///
/// * `handler` - Handler that decoded the link
/// * `repository` - Root of the working copy holding the file
/// * `path` - Absolute path of the file
/// * `relative_path` - `/`-separated path inside the repository
/// * `range` - The link's selection fitted to the file, if it had one
/// * `selection` - `range` in 0-based editor positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedFile {
    pub handler: String,
    pub repository: PathBuf,
    pub path: PathBuf,
    pub relative_path: String,
    pub range: Option<SelectedRange>,
    pub selection: Option<EditorSelection>,
}

impl LocatedFile {
    /// `path:line:column`, the form editors accept on the command line.
    pub fn position(&self) -> String {
        match &self.range {
            Some(range) => format!("{}:{}:{}", self.path.display(), range.start_line, range.start_column),
            None => self.path.display().to_string(),
        }
    }
}

/// Finds the files that `infos` point to across `repositories`.
///
/// The result keeps the order of `infos`, then of `repositories`. A file
/// found through several candidates is reported once.
///
/// # Errors
///
/// Fails when a matching file exists but cannot be read.
pub fn locate(
    infos: &[UrlInfo],
    repositories: &[Repository],
    provider: &LinkHandlerProvider,
) -> Result<Vec<LocatedFile>> {
    let mut seen = HashSet::new();
    let mut located = Vec::new();

    for info in infos {
        for repository in repositories {
            if !serves(info, repository, provider) {
                continue;
            }
            let Some(relative_path) = find_file(&repository.root, info) else {
                debug!("{} has no file matching {}", repository.root.display(), info.file_path);
                continue;
            };

            let path = repository.root.join(&relative_path);
            if !seen.insert(path.clone()) {
                continue;
            }

            let (range, selection) = fit_selection(&path, info)?;
            located.push(LocatedFile {
                handler: info.handler.clone(),
                repository: repository.root.clone(),
                path,
                relative_path,
                range,
                selection,
            });
        }
    }

    Ok(located)
}

/// Paths to try inside a repository, longest first.
pub fn candidate_paths(info: &UrlInfo) -> Vec<String> {
    let segments: Vec<&str> = info.file_path.split('/').filter(|s| !s.is_empty()).collect();
    if !info.file_may_start_with_branch {
        return vec![segments.join("/")];
    }
    (0..segments.len()).map(|skip| segments[skip..].join("/")).collect()
}

/// True when a remote of `repository` is on the server the link came from.
fn serves(info: &UrlInfo, repository: &Repository, provider: &LinkHandlerProvider) -> bool {
    let Some(handler) = provider.handler(&info.handler) else {
        return false;
    };
    let expected = normalize_url(&info.server.http);

    repository
        .remotes
        .iter()
        .flat_map(|remote| remote.urls.iter())
        .filter_map(|url| handler.handles_remote(url))
        .any(|server| normalize_url(&server.http) == expected)
}

fn find_file(root: &Path, info: &UrlInfo) -> Option<String> {
    candidate_paths(info)
        .into_iter()
        .find(|candidate| !candidate.is_empty() && root.join(candidate).is_file())
}

fn fit_selection(path: &Path, info: &UrlInfo) -> Result<(Option<SelectedRange>, Option<EditorSelection>)> {
    if info.selection.start_line.is_none() {
        return Ok((None, None));
    }
    let lines = read_lines(path)?;
    let length = |line: u32| line_length(&lines, line);
    let range = clamp(&info.selection, line_count(&lines), length);
    let selection = range.as_ref().map(|range| to_selection(range, length));
    Ok((range, selection))
}

/// Fits `selection` onto the contents of the file at `path`.
///
/// Returns `None` when the selection has no start line.
///
/// # Errors
///
/// Fails when the file cannot be read.
pub fn clamp_to_file(path: &Path, selection: &PartialSelectedRange) -> Result<Option<SelectedRange>> {
    if selection.start_line.is_none() {
        return Ok(None);
    }
    let lines = read_lines(path)?;
    Ok(clamp(selection, line_count(&lines), |line| line_length(&lines, line)))
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.lines().map(str::to_string).collect())
}

fn line_count(lines: &[String]) -> u32 {
    u32::try_from(lines.len()).unwrap_or(u32::MAX)
}

/// Length in characters of the 1-based `line`, 0 past the end.
fn line_length(lines: &[String], line: u32) -> u32 {
    lines
        .get((line as usize).saturating_sub(1))
        .map(|text| text.chars().count() as u32)
        .unwrap_or(0)
}

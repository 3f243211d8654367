//
//  git-weblinks
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small helpers shared by the commands.
//!
//! - [`open_browser`]: open a link in the configured or system browser
//! - [`resolve_path`]: make a command-line path absolute

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Opens `url` in a browser.
///
/// `browser` is the `core.browser` setting. When it is set, that program is
/// started with the URL as its only argument; otherwise the system default
/// browser is used through `webbrowser`.
///
/// # Example
///
/// ```rust,no_run
/// use git_weblinks::util::open_browser;
///
/// open_browser("https://github.com/acme/widgets/blob/main/README.md", None)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn open_browser(url: &str, browser: Option<&str>) -> Result<()> {
    match browser.map(str::trim).filter(|b| !b.is_empty()) {
        Some(program) => {
            debug!("Opening {} with {}", url, program);
            std::process::Command::new(program)
                .arg(url)
                .spawn()
                .with_context(|| format!("Failed to start browser '{}'", program))?;
        }
        None => {
            webbrowser::open(url).with_context(|| format!("Failed to open {}", url))?;
        }
    }
    Ok(())
}

/// Resolves `path` against the current directory.
///
/// The file does not have to exist. Symlinks are resolved when it does, so
/// the result can be compared with repository roots reported by git.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read the current directory")?
            .join(path)
    };
    Ok(absolute.canonicalize().unwrap_or(absolute))
}

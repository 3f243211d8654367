//
//  git-weblinks
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O
//!
//! Reading and writing the raw configuration text. Parsing lives in
//! [`Config`](super::Config).

use std::path::Path;

use anyhow::{Context, Result};

/// Reads a configuration file.
///
/// # Returns
///
/// - `Ok(Some(String))` - The file contents
/// - `Ok(None)` - The file does not exist
/// - `Err` - The file exists but could not be read
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use git_weblinks::config::read_config_file;
///
/// match read_config_file(Path::new("/tmp/gwl.toml"))? {
///     Some(content) => println!("{}", content),
///     None => println!("No configuration, using defaults"),
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn read_config_file(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Writes a configuration file, creating parent directories as needed.
///
/// The content goes to a sibling temporary file first and is then renamed
/// over the target, so readers never see a half-written file.
///
/// # Notes
///
/// - Overwrites any existing file
/// - The temporary file is `<name>.tmp` next to the target
pub fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let temp = path.with_extension("tmp");
    std::fs::write(&temp, content).with_context(|| format!("Failed to write {}", temp.display()))?;
    std::fs::rename(&temp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

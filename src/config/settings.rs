//
//  git-weblinks
//  config/settings.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Settings
//!
//! What link handlers read from configuration. Handlers hold an
//! `Arc<dyn Settings>` and ask again on every match, so the answer may
//! change between two calls.
//!
//! | Implementation | Reads |
//! |----------------|-------|
//! | [`Config`] | a snapshot already in memory |
//! | [`ConfigFile`] | the file on disk, on every call |

use std::path::{Path, PathBuf};

use tracing::warn;

use super::Config;
use crate::links::ServerSpec;

/// Configuration consumed by link handlers.
pub trait Settings: Send + Sync {
    /// User-configured servers under a provider settings key.
    fn servers(&self, key: &str) -> Vec<ServerSpec>;

    /// Remote tried first when picking a handler for a repository.
    fn preferred_remote(&self) -> Option<String>;

    /// Link commits by their abbreviated hash.
    fn use_short_hash(&self) -> bool;
}

impl Settings for Config {
    fn servers(&self, key: &str) -> Vec<ServerSpec> {
        self.servers.get(key).cloned().unwrap_or_default()
    }

    fn preferred_remote(&self) -> Option<String> {
        self.links.preferred_remote.clone()
    }

    fn use_short_hash(&self) -> bool {
        self.links.use_short_hash
    }
}

/// Settings read from a configuration file each time they are asked for.
///
/// A file that cannot be loaded is logged and treated as empty.
///
/// # Example
///
/// ```rust,no_run
/// use git_weblinks::config::{ConfigFile, Settings};
///
/// let settings = ConfigFile::new("/home/me/.config/gwl/config.toml");
/// for server in settings.servers("gitea") {
///     println!("{:?}", server);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Config {
        Config::load_from(&self.path).unwrap_or_else(|e| {
            warn!("Ignoring configuration {}: {:#}", self.path.display(), e);
            Config::default()
        })
    }
}

impl Settings for ConfigFile {
    fn servers(&self, key: &str) -> Vec<ServerSpec> {
        self.read().servers.remove(key).unwrap_or_default()
    }

    fn preferred_remote(&self) -> Option<String> {
        self.read().links.preferred_remote
    }

    fn use_short_hash(&self) -> bool {
        self.read().links.use_short_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_snapshot() {
        let config: Config = toml::from_str(
            r#"
            [links]
            preferred_remote = "upstream"

            [[servers.gitea]]
            http = "https://gitea.acme.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.servers("gitea").len(), 1);
        assert!(config.servers("gitiles").is_empty());
        assert_eq!(Settings::preferred_remote(&config).as_deref(), Some("upstream"));
    }

    #[test]
    fn test_config_file_is_reread() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let settings = ConfigFile::new(&path);

        assert!(settings.servers("gitea").is_empty());

        std::fs::write(&path, "[[servers.gitea]]\nhttp = \"https://gitea.acme.com\"\n").unwrap();
        assert_eq!(settings.servers("gitea").len(), 1);

        std::fs::write(&path, "[links]\nuse_short_hash = true\n").unwrap();
        assert!(settings.servers("gitea").is_empty());
        assert!(settings.use_short_hash());
    }

    #[test]
    fn test_unreadable_config_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let settings = ConfigFile::new(&path);
        assert!(settings.servers("gitea").is_empty());
        assert!(!settings.use_short_hash());
    }
}

//
//  git-weblinks
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loading, saving and accessing the `gwl` configuration file, and the
//! [`Settings`] view of it that link handlers consume.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/gwl/config.toml`
//! - **macOS**: `~/Library/Application Support/gwl/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\gwl\config\config.toml`
//!
//! `--config <PATH>` or the `GWL_CONFIG` environment variable override it.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [core]
//! browser = "firefox"
//!
//! [links]
//! preferred_remote = "upstream"
//! default_link_type = "commit"
//! use_short_hash = true
//! link_format = "markdown"
//!
//! [[servers.github_enterprise]]
//! http = "https://github.acme.com"
//! ssh = "git@github.acme.com"
//!
//! [[servers.bitbucket_server]]
//! http = "https://git.acme.com"
//! ssh = "ssh://git@git.acme.com:7999"
//! ```
//!
//! Server entries are read under the settings key of each provider:
//!
//! | Key | Provider |
//! |-----|----------|
//! | `github_enterprise` | GitHub Enterprise |
//! | `gitlab_enterprise` | self-managed GitLab |
//! | `bitbucket_server` | Bitbucket Server / Data Center |
//! | `gitea` | Gitea / Forgejo |
//! | `gitiles` | Gitiles |
//!
//! An entry with a `remote_pattern` is a dynamic server; see
//! [`DynamicServer`](crate::links::DynamicServer).
//!
//! ## Submodules
//!
//! - [`file`]: Low-level file I/O
//! - [`settings`]: The [`Settings`] trait and its implementations

mod file;
mod settings;

pub use file::*;
pub use settings::*;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::links::{LinkType, ServerSpec};

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "preferred_remote",
    "default_link_type",
    "use_short_hash",
    "link_format",
    "browser",
    "prompt",
];

/// Global configuration.
///
/// # Fields
///
/// * `core` - General CLI settings
/// * `links` - Link creation defaults
/// * `servers` - Self-hosted servers, keyed by provider settings key
///
/// # Example
///
/// ```rust
/// use git_weblinks::config::Config;
///
/// let config: Config = toml::from_str(r#"
///     [links]
///     use_short_hash = true
///
///     [[servers.gitea]]
///     http = "https://gitea.acme.com"
/// "#).unwrap();
///
/// assert!(config.links.use_short_hash);
/// assert_eq!(config.servers["gitea"].len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub links: LinksConfig,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub servers: HashMap<String, Vec<ServerSpec>>,
}

/// General CLI settings.
///
/// | Field | Default |
/// |-------|---------|
/// | `browser` | `None` (system default browser) |
/// | `prompt` | `"enabled"` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Browser command used by `--open`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,

    /// `"enabled"` or `"disabled"`. Disabled prompts pick the first
    /// candidate instead of asking.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_prompt() -> String {
    "enabled".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            browser: None,
            prompt: default_prompt(),
        }
    }
}

/// Link creation defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Remote tried before any other when picking a handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_remote: Option<String>,

    /// Link type used when `link` is given neither `--type` nor `--ref`.
    #[serde(default)]
    pub default_link_type: LinkType,

    /// Link to the abbreviated commit hash instead of the full one.
    #[serde(default)]
    pub use_short_hash: bool,

    /// How `link` prints its result.
    #[serde(default)]
    pub link_format: LinkFormat,
}

/// Output format of a created link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    /// The bare URL.
    #[default]
    Raw,
    /// `[path#L1-L2](url)`
    Markdown,
}

impl fmt::Display for LinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkFormat::Raw => f.write_str("raw"),
            LinkFormat::Markdown => f.write_str("markdown"),
        }
    }
}

impl FromStr for LinkFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(LinkFormat::Raw),
            "markdown" => Ok(LinkFormat::Markdown),
            _ => anyhow::bail!("Invalid link format '{}'. Expected raw or markdown", s),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, or from the default location.
    ///
    /// A missing file is not an error; defaults are used.
    ///
    /// # Errors
    ///
    /// - The file exists but cannot be read
    /// - The file is not valid TOML, or does not match the schema
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use git_weblinks::config::Config;
    ///
    /// let config = Config::load(None)?;
    /// println!("Default link type: {}", config.links.default_link_type);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        Self::load_from(&path)
    }

    /// Loads the configuration from exactly `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        match read_config_file(path)? {
            Some(content) => toml::from_str(&content)
                .with_context(|| format!("Invalid configuration in {}", path.display())),
            None => Ok(Self::default()),
        }
    }

    /// Saves the configuration to `path`, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = Self::resolve_path(path)?;
        let content = toml::to_string_pretty(self)?;
        write_config_file(&path, &content)
    }

    /// `path` when given, else [`Config::config_path`].
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_path(),
        }
    }

    /// The default configuration file path.
    ///
    /// The file may not exist; this only returns where it would be.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "gwl")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Gets a scalar setting by key.
    ///
    /// # Returns
    ///
    /// - `Some(String)` - The value, when the key is known and set
    /// - `None` - For unknown keys and unset optional values
    ///
    /// # Example
    ///
    /// ```rust
    /// use git_weblinks::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.get("default_link_type"), Some("branch".to_string()));
    /// assert_eq!(config.get("preferred_remote"), None);
    /// assert_eq!(config.get("unknown_key"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "preferred_remote" => self.links.preferred_remote.clone(),
            "default_link_type" => Some(self.links.default_link_type.to_string()),
            "use_short_hash" => Some(self.links.use_short_hash.to_string()),
            "link_format" => Some(self.links.link_format.to_string()),
            "browser" => self.core.browser.clone(),
            "prompt" => Some(self.core.prompt.clone()),
            _ => None,
        }
    }

    /// Sets a scalar setting by key.
    ///
    /// # Errors
    ///
    /// - The key is unknown
    /// - The value does not parse for the key's type
    ///
    /// # Example
    ///
    /// ```rust
    /// use git_weblinks::config::Config;
    ///
    /// let mut config = Config::default();
    /// config.set("use_short_hash", "true").unwrap();
    /// assert!(config.links.use_short_hash);
    ///
    /// assert!(config.set("use_short_hash", "maybe").is_err());
    /// assert!(config.set("unknown_key", "value").is_err());
    /// ```
    ///
    /// # Notes
    ///
    /// Changes are only persisted when [`Config::save`] is called.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "preferred_remote" => self.links.preferred_remote = Some(value.to_string()),
            "default_link_type" => self.links.default_link_type = value.parse()?,
            "use_short_hash" => {
                self.links.use_short_hash = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Expected true or false, got '{}'", value))?
            }
            "link_format" => self.links.link_format = value.parse()?,
            "browser" => self.core.browser = Some(value.to_string()),
            "prompt" => match value {
                "enabled" | "disabled" => self.core.prompt = value.to_string(),
                _ => anyhow::bail!("Expected enabled or disabled, got '{}'", value),
            },
            _ => anyhow::bail!(
                "Unknown configuration key '{}'. Valid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Clears an optional setting, or resets a required one to its default.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let defaults = Config::default();
        match key {
            "preferred_remote" => self.links.preferred_remote = None,
            "default_link_type" => self.links.default_link_type = defaults.links.default_link_type,
            "use_short_hash" => self.links.use_short_hash = defaults.links.use_short_hash,
            "link_format" => self.links.link_format = defaults.links.link_format,
            "browser" => self.core.browser = None,
            "prompt" => self.core.prompt = defaults.core.prompt,
            _ => anyhow::bail!("Unknown configuration key '{}'", key),
        }
        Ok(())
    }

    /// Whether interactive prompts may be shown.
    pub fn prompts_enabled(&self) -> bool {
        self.core.prompt != "disabled"
    }
}

//
//  git-weblinks
//  links/server.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Server Matcher
//!
//! Decides whether a git remote URL, or a URL seen in a browser, belongs to
//! one of the servers of a provider family, and produces the concrete
//! http/ssh/web addresses of that server.
//!
//! ## Server kinds
//!
//! | Kind | Addresses | Matching |
//! |------|-----------|----------|
//! | [`StaticServer`] | fixed | prefix of the normalized URL |
//! | [`DynamicServer`] | rendered from a regex match | `remote_pattern` / `web_pattern` |
//!
//! Candidates are tried in declaration order and the first match wins, so a
//! more specific server must be listed before a broader one.
//!
//! ## Lazy server lists
//!
//! Servers configured by the user are read through a factory every time a
//! match is attempted. Nothing is cached, so configuration changes apply to
//! the next match.
//!
//! ```rust
//! use git_weblinks::links::{RemoteServer, ServerSpec, StaticServer};
//!
//! let github = RemoteServer::fixed(&[ServerSpec::Static(StaticServer {
//!     http: "https://github.com".into(),
//!     ssh: Some("git@github.com".into()),
//!     web: None,
//! })])
//! .unwrap();
//!
//! let server = github.match_remote("git@github.com:acme/widgets.git").unwrap();
//! assert_eq!(server.http, "https://github.com");
//! assert!(github.match_remote("git@github.company.com:acme/widgets.git").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::LinkError;
use super::template::{Template, TemplateContext};

/// Matches a `user@` or `scheme://user@` credential prefix.
static CREDENTIALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*://)?[^/@]*@").unwrap());

/// A server with fixed base addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticServer {
    /// Base address used for http(s) remotes.
    pub http: String,
    /// Base address used for ssh remotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<String>,
    /// Base address of the web UI, when it differs from `http`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<String>,
}

impl StaticServer {
    /// The address links are built on: `web`, or `http` when there is none.
    pub fn web_or_http(&self) -> &str {
        self.web.as_deref().unwrap_or(&self.http)
    }
}

/// A server whose addresses are derived from the URL being matched.
///
/// Used where the base address embeds a variable part, such as the
/// organization in `https://dev.azure.com/{org}`. The templates see the
/// named groups of the pattern as `captures.<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicServer {
    pub remote_pattern: String,
    pub http: String,
    pub ssh: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<String>,
}

/// One server of a provider family, as written in a definition or in the
/// user's configuration.
///
/// An entry with a `remote_pattern` is dynamic; anything else is static.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerSpec {
    Dynamic(DynamicServer),
    Static(StaticServer),
}

/// Normalizes a remote or web URL for comparison.
///
/// Removes an `ssh://` prefix, a `user@` credential prefix (keeping any
/// scheme in front of it) and trailing slashes. The steps are repeated until
/// nothing changes, which makes the function idempotent.
pub fn normalize_url(url: &str) -> String {
    let mut current = url.trim().to_string();
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(url: &str) -> String {
    let url = url.strip_prefix("ssh://").unwrap_or(url);
    let url = CREDENTIALS.replace(url, "$1");
    url.strip_suffix('/').unwrap_or(&url).to_string()
}

/// True when `prefix` is a prefix of `value` that ends on an address
/// boundary, so `github.com` does not match `github.company.com`.
fn starts_with_boundary(value: &str, prefix: &str) -> bool {
    if prefix.is_empty() || !value.starts_with(prefix) {
        return false;
    }
    if prefix.ends_with(['/', ':']) {
        return true;
    }
    matches!(value.as_bytes().get(prefix.len()), None | Some(b'/') | Some(b':'))
}

/// Extracts the repository path from a remote URL of `server`.
///
/// `git@github.com:acme/widgets.git` on GitHub gives `acme/widgets`.
pub fn repository_path(remote_url: &str, server: &StaticServer) -> Option<String> {
    let remote = normalize_url(remote_url);
    let bases = [Some(&server.http), server.ssh.as_ref(), server.web.as_ref()];

    bases.into_iter().flatten().find_map(|base| {
        let base = normalize_url(base);
        if !starts_with_boundary(&remote, &base) {
            return None;
        }
        let rest = remote[base.len()..].trim_start_matches(['/', ':']);
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        Some(rest.trim_end_matches('/').to_string())
    })
}

#[derive(Debug, Clone)]
struct CompiledDynamic {
    remote_pattern: Regex,
    web_pattern: Option<Regex>,
    http: Template,
    ssh: Template,
    web: Option<Template>,
}

impl CompiledDynamic {
    fn compile(spec: &DynamicServer) -> Result<Self, LinkError> {
        let compiled = Self {
            remote_pattern: Regex::new(&spec.remote_pattern)?,
            web_pattern: spec.web_pattern.as_deref().map(Regex::new).transpose()?,
            http: Template::parse(&spec.http)?,
            ssh: Template::parse(&spec.ssh)?,
            web: spec.web.as_deref().map(Template::parse).transpose()?,
        };
        compiled.validate()?;
        Ok(compiled)
    }

    /// Every template must render against the groups of every pattern it
    /// can be fed from.
    fn validate(&self) -> Result<(), LinkError> {
        let patterns = std::iter::once(&self.remote_pattern).chain(self.web_pattern.as_ref());
        for pattern in patterns {
            let mut context = TemplateContext::new();
            context.insert_probe_captures(pattern);
            self.http.render(&context)?;
            self.ssh.render(&context)?;
            if let Some(web) = &self.web {
                web.render(&context)?;
            }
        }
        Ok(())
    }

    fn render(&self, pattern: &Regex, url: &str) -> Option<StaticServer> {
        let captures = pattern.captures(url)?;
        let mut context = TemplateContext::new();
        context.insert_captures(pattern, &captures);

        let rendered = (|| -> tera::Result<StaticServer> {
            Ok(StaticServer {
                http: self.http.render(&context)?,
                ssh: self.ssh.render_optional(&context)?,
                web: match &self.web {
                    Some(web) => web.render_optional(&context)?,
                    None => None,
                },
            })
        })();

        match rendered {
            Ok(server) => Some(server),
            Err(e) => {
                warn!("Failed to render server for '{}': {}", url, e);
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
enum CompiledServer {
    Static(StaticServer),
    Dynamic(CompiledDynamic),
}

impl CompiledServer {
    fn compile(spec: &ServerSpec) -> Result<Self, LinkError> {
        match spec {
            ServerSpec::Static(server) => Ok(Self::Static(server.clone())),
            ServerSpec::Dynamic(server) => Ok(Self::Dynamic(CompiledDynamic::compile(server)?)),
        }
    }

    fn match_remote(&self, normalized: &str) -> Option<StaticServer> {
        match self {
            Self::Static(server) => {
                let http = starts_with_boundary(normalized, &normalize_url(&server.http));
                let ssh = server
                    .ssh
                    .as_deref()
                    .is_some_and(|ssh| starts_with_boundary(normalized, &normalize_url(ssh)));
                (http || ssh).then(|| server.clone())
            }
            Self::Dynamic(server) => server.render(&server.remote_pattern, normalized),
        }
    }

    fn match_web(&self, normalized: &str) -> Option<StaticServer> {
        match self {
            Self::Static(server) => {
                let web = server
                    .web
                    .as_deref()
                    .is_some_and(|web| starts_with_boundary(normalized, &normalize_url(web)));
                let http = starts_with_boundary(normalized, &normalize_url(&server.http));
                (web || http).then(|| server.clone())
            }
            Self::Dynamic(server) => {
                let pattern = server.web_pattern.as_ref().unwrap_or(&server.remote_pattern);
                server.render(pattern, normalized)
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Static(server) => server.http.clone(),
            Self::Dynamic(server) => server.remote_pattern.as_str().to_string(),
        }
    }
}

/// Produces the user-configured servers of a provider family on demand.
pub type ServerFactory = Arc<dyn Fn() -> Vec<ServerSpec> + Send + Sync>;

/// The servers of one provider family.
///
/// Holds the servers fixed in the definition, followed by servers produced
/// by an optional [`ServerFactory`].
#[derive(Clone)]
pub struct RemoteServer {
    fixed: Vec<CompiledServer>,
    factory: Option<ServerFactory>,
}

impl RemoteServer {
    /// A matcher over a fixed list. Invalid specs are an error.
    pub fn fixed(specs: &[ServerSpec]) -> Result<Self, LinkError> {
        Self::new(specs, None)
    }

    /// A matcher over `specs` followed by whatever `factory` returns at the
    /// time of each match.
    pub fn new(specs: &[ServerSpec], factory: Option<ServerFactory>) -> Result<Self, LinkError> {
        let fixed = specs
            .iter()
            .map(CompiledServer::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fixed, factory })
    }

    /// Matches a git remote URL against the http and ssh addresses.
    pub fn match_remote(&self, url: &str) -> Option<StaticServer> {
        let normalized = normalize_url(url);
        let found = self.find(|server| server.match_remote(&normalized));
        debug!("Remote '{}' matched server: {:?}", url, found);
        found
    }

    /// Matches a browser URL against the web addresses.
    pub fn match_web(&self, url: &str) -> Option<StaticServer> {
        let normalized = normalize_url(url);
        self.find(|server| server.match_web(&normalized))
    }

    /// A description of every current server, for display.
    pub fn describe(&self) -> Vec<String> {
        let mut servers: Vec<String> = self.fixed.iter().map(CompiledServer::describe).collect();
        servers.extend(self.configured().iter().map(CompiledServer::describe));
        servers
    }

    fn find<F>(&self, matcher: F) -> Option<StaticServer>
    where
        F: Fn(&CompiledServer) -> Option<StaticServer>,
    {
        if let Some(server) = self.fixed.iter().find_map(&matcher) {
            return Some(server);
        }
        self.configured().iter().find_map(&matcher)
    }

    /// Reads and compiles the factory's servers. User-supplied servers that
    /// fail to compile are skipped with a warning.
    fn configured(&self) -> Vec<CompiledServer> {
        let Some(factory) = &self.factory else {
            return Vec::new();
        };
        factory()
            .iter()
            .filter_map(|spec| match CompiledServer::compile(spec) {
                Ok(server) => Some(server),
                Err(e) => {
                    warn!("Ignoring invalid server {:?}: {}", spec, e);
                    None
                }
            })
            .collect()
    }
}

impl fmt::Debug for RemoteServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteServer")
            .field("fixed", &self.fixed)
            .field("lazy", &self.factory.is_some())
            .finish()
    }
}

/// Flattens a server into the `server.*` variables of a template context.
/// Missing addresses become empty strings.
pub(crate) fn server_variables(server: &StaticServer) -> HashMap<&'static str, String> {
    HashMap::from([
        ("http", server.http.clone()),
        ("ssh", server.ssh.clone().unwrap_or_default()),
        ("web", server.web.clone().unwrap_or_default()),
    ])
}

//
//  git-weblinks
//  links/provider.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Link Handler Provider
//!
//! The registry of every [`LinkHandler`]. It is constructed explicitly and
//! passed around; tests build one from their own definitions with
//! [`LinkHandlerProvider::with_definitions`].
//!
//! ## Handler selection
//!
//! For a repository, [`LinkHandlerProvider::select`] tries:
//!
//! 1. the preferred remote (from settings), then the other remotes in order
//! 2. each URL of a remote, in order
//! 3. each handler, in priority order
//!
//! and stops at the first handler whose servers include the URL.
//!
//! ## Reverse lookup
//!
//! [`LinkHandlerProvider::get_url_info`] asks every handler and returns all
//! answers. Handler patterns are meant to be disjoint but nothing enforces
//! it, so several answers are possible and left to the caller.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::definition::{builtin_definitions, HandlerDefinition};
use super::error::LinkError;
use super::handler::{LinkHandler, UrlInfo};
use crate::config::Settings;
use crate::context::{Git, Remote, Repository};

/// The handler chosen for a repository, and the remote URL it matched.
#[derive(Debug, Clone, Copy)]
pub struct SelectedHandler<'a> {
    pub handler: &'a LinkHandler,
    pub remote_name: &'a str,
    pub remote_url: &'a str,
}

/// Owns the handlers.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use git_weblinks::config::Config;
/// use git_weblinks::context::{find_repository, LocalGit};
/// use git_weblinks::links::{FileInfo, LinkHandlerProvider, LinkOptions};
///
/// # async fn run() -> anyhow::Result<()> {
/// let provider = LinkHandlerProvider::new(Arc::new(Config::load(None)?), Arc::new(LocalGit))?;
/// let repository = find_repository(Path::new("."))?.expect("not in a repository");
///
/// if let Some(selected) = provider.select(&repository) {
///     let file = FileInfo::new(repository.root.join("README.md"));
///     let created = selected
///         .handler
///         .create_url(&repository, selected.remote_url, &file, &LinkOptions::default())
///         .await?;
///     println!("{}", created.url);
/// }
/// # Ok(())
/// # }
/// ```
pub struct LinkHandlerProvider {
    handlers: Vec<LinkHandler>,
    settings: Arc<dyn Settings>,
}

impl fmt::Debug for LinkHandlerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkHandlerProvider")
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl LinkHandlerProvider {
    /// A provider over the built-in definitions.
    pub fn new(settings: Arc<dyn Settings>, git: Arc<dyn Git>) -> Result<Self, LinkError> {
        Self::with_definitions(builtin_definitions()?, settings, git)
    }

    /// A provider over `definitions`, in the given priority order.
    pub fn with_definitions(
        definitions: Vec<HandlerDefinition>,
        settings: Arc<dyn Settings>,
        git: Arc<dyn Git>,
    ) -> Result<Self, LinkError> {
        let handlers = definitions
            .into_iter()
            .map(|definition| LinkHandler::new(definition, settings.clone(), git.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { handlers, settings })
    }

    pub fn handlers(&self) -> &[LinkHandler] {
        &self.handlers
    }

    /// Finds a handler by name, ignoring case.
    pub fn handler(&self, name: &str) -> Option<&LinkHandler> {
        self.handlers.iter().find(|h| h.name().eq_ignore_ascii_case(name))
    }

    /// Picks the handler and remote URL to build links for `repository`.
    ///
    /// Returns `None` when no remote belongs to a known server.
    pub fn select<'a>(&'a self, repository: &'a Repository) -> Option<SelectedHandler<'a>> {
        let preferred = self.settings.preferred_remote();
        let selected = ordered_remotes(&repository.remotes, preferred)
            .flat_map(|remote| remote.urls.iter().map(move |url| (remote, url)))
            .find_map(|(remote, url)| {
                self.handlers
                    .iter()
                    .find(|handler| handler.handles_remote(url).is_some())
                    .map(|handler| SelectedHandler {
                        handler,
                        remote_name: &remote.name,
                        remote_url: url,
                    })
            });

        match &selected {
            Some(s) => debug!("Selected {} for remote {} ({})", s.handler.name(), s.remote_name, s.remote_url),
            None => debug!("No handler matches any remote of {}", repository.root.display()),
        }
        selected
    }

    /// Decodes `url` with every handler.
    pub fn get_url_info(&self, url: &str) -> Vec<UrlInfo> {
        self.handlers
            .iter()
            .filter_map(|handler| handler.get_url_info(url))
            .collect()
    }
}

/// The preferred remote, if present, followed by the others in order.
fn ordered_remotes(remotes: &[Remote], preferred: Option<String>) -> impl Iterator<Item = &Remote> {
    let first = preferred
        .as_deref()
        .and_then(|name| remotes.iter().find(|remote| remote.name == name));
    first.into_iter().chain(
        remotes
            .iter()
            .filter(move |remote| preferred.as_deref() != Some(remote.name.as_str())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::links::handler::tests::{test_config, FakeGit};
    use crate::links::server::{ServerSpec, StaticServer};
    use crate::links::target::{FileInfo, LinkOptions, LinkType};
    use std::path::PathBuf;

    fn provider(config: Config) -> LinkHandlerProvider {
        LinkHandlerProvider::new(Arc::new(config), Arc::new(FakeGit::default())).unwrap()
    }

    fn repository(remotes: &[(&str, &[&str])]) -> Repository {
        Repository {
            root: PathBuf::from("/work/widgets"),
            remotes: remotes
                .iter()
                .map(|(name, urls)| Remote {
                    name: name.to_string(),
                    urls: urls.iter().map(|u| u.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_select_first_matching_remote() {
        let provider = provider(test_config());
        let repository = repository(&[
            ("mirror", &["https://example.com/widgets.git"]),
            ("origin", &["git@github.com:acme/widgets.git"]),
            ("backup", &["git@gitlab.com:acme/widgets.git"]),
        ]);
        let selected = provider.select(&repository).unwrap();
        assert_eq!(selected.handler.name(), "GitHub");
        assert_eq!(selected.remote_name, "origin");
        assert_eq!(selected.remote_url, "git@github.com:acme/widgets.git");
    }

    #[test]
    fn test_preferred_remote_is_tried_first() {
        let mut config = test_config();
        config.links.preferred_remote = Some("backup".to_string());
        let provider = provider(config);
        let repository = repository(&[
            ("origin", &["git@github.com:acme/widgets.git"]),
            ("backup", &["git@gitlab.com:acme/widgets.git"]),
        ]);
        let selected = provider.select(&repository).unwrap();
        assert_eq!(selected.handler.name(), "GitLab");
        assert_eq!(selected.remote_name, "backup");
    }

    #[test]
    fn test_missing_preferred_remote_falls_back_to_order() {
        let mut config = test_config();
        config.links.preferred_remote = Some("upstream".to_string());
        let provider = provider(config);
        let repository = repository(&[("origin", &["git@github.com:acme/widgets.git"])]);
        assert_eq!(provider.select(&repository).unwrap().remote_name, "origin");
    }

    #[tokio::test]
    async fn test_default_branch_comes_from_selected_remote() {
        let remotes: &[(&str, &[&str])] = &[
            ("origin", &["git@github.com:acme/widgets.git"]),
            ("upstream", &["git@github.com:upstream/widgets.git"]),
        ];
        let file = FileInfo::new("/work/widgets/a.rs");
        let options = LinkOptions::preset(LinkType::DefaultBranch);

        // Only origin has a known HEAD.
        for (preferred, expected) in [("origin", Some("trunk")), ("upstream", None)] {
            let mut config = test_config();
            config.links.preferred_remote = Some(preferred.to_string());
            let provider = provider(config);
            let repository = repository(remotes);
            let selected = provider.select(&repository).unwrap();
            assert_eq!(selected.remote_name, preferred);

            let reference = selected
                .handler
                .get_ref(LinkType::DefaultBranch, &repository, selected.remote_url)
                .await;
            let created = selected
                .handler
                .create_url(&repository, selected.remote_url, &file, &options)
                .await;
            match expected {
                Some(branch) => {
                    assert_eq!(reference.unwrap().abbreviated, branch);
                    assert!(created.unwrap().url.contains(&format!("/blob/{branch}/")));
                }
                None => {
                    assert!(reference.unwrap_err().to_string().contains(preferred));
                    assert!(created.unwrap_err().to_string().contains(preferred));
                }
            }
        }
    }

    #[test]
    fn test_urls_of_a_remote_are_tried_in_order() {
        let provider = provider(test_config());
        let repository = repository(&[(
            "origin",
            &["https://example.com/widgets.git", "git@bitbucket.org:acme/widgets.git"],
        )]);
        let selected = provider.select(&repository).unwrap();
        assert_eq!(selected.handler.name(), "Bitbucket");
        assert_eq!(selected.remote_url, "git@bitbucket.org:acme/widgets.git");
    }

    #[test]
    fn test_self_hosted_handlers_win_over_public_ones() {
        let mut config = Config::default();
        config.servers.insert(
            "gitea".to_string(),
            vec![ServerSpec::Static(StaticServer {
                http: "https://github.com".to_string(),
                ssh: None,
                web: None,
            })],
        );
        let provider = provider(config);
        let repository = repository(&[("origin", &["https://github.com/acme/widgets.git"])]);
        assert_eq!(provider.select(&repository).unwrap().handler.name(), "Gitea");
    }

    #[test]
    fn test_select_is_stable() {
        let provider = provider(test_config());
        let repository = repository(&[
            ("origin", &["https://git.acme.com/scm/proj/repo.git"]),
            ("github", &["git@github.com:acme/widgets.git"]),
        ]);
        let first = provider.select(&repository).unwrap();
        for _ in 0..5 {
            let again = provider.select(&repository).unwrap();
            assert_eq!(again.handler.name(), first.handler.name());
            assert_eq!(again.remote_url, first.remote_url);
        }
        assert_eq!(first.handler.name(), "Bitbucket Server");
    }

    #[test]
    fn test_no_handler_for_unknown_remote() {
        let provider = provider(Config::default());
        let unknown = repository(&[("origin", &["https://example.com/widgets.git"])]);
        assert!(provider.select(&unknown).is_none());
        let empty = repository(&[]);
        assert!(provider.select(&empty).is_none());
    }

    #[test]
    fn test_configuration_changes_apply_to_next_select() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let settings = Arc::new(crate::config::ConfigFile::new(&path));
        let provider = LinkHandlerProvider::new(settings, Arc::new(FakeGit::default())).unwrap();
        let repository = repository(&[("origin", &["git@gitea.acme.com:acme/widgets.git"])]);

        assert!(provider.select(&repository).is_none());
        std::fs::write(&path, "[[servers.gitea]]\nhttp = \"https://gitea.acme.com\"\nssh = \"git@gitea.acme.com\"\n")
            .unwrap();
        assert_eq!(provider.select(&repository).unwrap().handler.name(), "Gitea");
    }

    #[test]
    fn test_get_url_info_decodes_github_link() {
        let provider = provider(test_config());
        let infos = provider.get_url_info("https://github.com/acme/widgets/blob/main/src/index.ts#L10-L12");
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].handler, "GitHub");
        assert_eq!(infos[0].file_path, "src/index.ts");
        assert_eq!(infos[0].selection.start_line, Some(10));
        assert_eq!(infos[0].selection.end_line, Some(12));
    }

    #[test]
    fn test_get_url_info_returns_every_match() {
        let mut config = Config::default();
        let shared = vec![ServerSpec::Static(StaticServer {
            http: "https://code.acme.com".to_string(),
            ssh: None,
            web: None,
        })];
        config.servers.insert("github_enterprise".to_string(), shared.clone());
        config.servers.insert("gitlab_enterprise".to_string(), shared);
        let provider = provider(config);

        let infos = provider.get_url_info("https://code.acme.com/acme/widgets/-/blob/main/src/index.ts#L4");
        let handlers: Vec<&str> = infos.iter().map(|i| i.handler.as_str()).collect();
        assert_eq!(handlers, vec!["GitHub", "GitLab"]);
        assert!(infos.iter().all(|i| i.file_path == "src/index.ts"));
    }

    #[test]
    fn test_get_url_info_unknown_url() {
        let provider = provider(test_config());
        assert!(provider.get_url_info("https://example.com/some/page").is_empty());
        assert!(provider.get_url_info("not a url").is_empty());
    }

    #[test]
    fn test_handler_lookup() {
        let provider = provider(test_config());
        assert_eq!(provider.handlers().len(), 7);
        assert!(provider.handler("github").is_some());
        assert!(provider.handler("sourcehut").is_none());
    }
}

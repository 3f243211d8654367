//
//  git-weblinks
//  links/handler.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Link Handler
//!
//! One provider's forward and reverse behavior, driven entirely by a
//! [`HandlerDefinition`].
//!
//! ## Forward
//!
//! [`LinkHandler::create_url`] resolves the ref (the only suspension point),
//! then hands over to the synchronous [`LinkHandler::render_url`]:
//!
//! 1. match the remote against the handler's servers
//! 2. compute the repository-relative path and encode each segment
//! 3. render the `url` template
//! 4. append the query parameters whose pattern matches the path
//! 5. render the `selection` template and merge it into the URL
//!
//! ## Reverse
//!
//! [`LinkHandler::get_url_info`] requires the URL to belong to one of the
//! handler's servers, runs the reverse pattern, and renders the file, server
//! and selection templates from the match.
//!
//! ## Validation
//!
//! Every template is rendered once against placeholder values when the
//! handler is built, so a template that names a variable or capture group
//! that does not exist fails at load time with
//! [`LinkError::InvalidDefinition`].

use std::fmt::{self, Display};
use std::path::{Component, Path};
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::definition::{BranchRefKind, HandlerDefinition, ServerSource};
use super::error::LinkError;
use super::server::{repository_path, server_variables, RemoteServer, ServerFactory, StaticServer};
use super::target::{CreatedUrl, FileInfo, LinkOptions, LinkTarget, LinkType, RefType};
use super::template::{decode_uri, encode_uri, encode_uri_component, Template, TemplateContext};
use crate::config::Settings;
use crate::context::{Git, RefInfo, Repository};
use crate::selection::{PartialSelectedRange, SelectedRange};

/// Remote used for the default branch when the link's remote is unnamed.
const DEFAULT_REMOTE: &str = "origin";

/// A link decoded by one handler.
///
/// # Fields
///
/// * `handler` - Name of the handler that decoded it
/// * `file_path` - `/`-separated path, percent-decoded
/// * `file_may_start_with_branch` - The path may still begin with segments
///   of a branch name, so it should be matched as a suffix
/// * `server` - The server the link belongs to
/// * `selection` - Whatever the link says about the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlInfo {
    pub handler: String,
    pub file_path: String,
    pub file_may_start_with_branch: bool,
    pub server: StaticServer,
    pub selection: PartialSelectedRange,
}

#[derive(Debug, Clone)]
struct QueryRule {
    pattern: Regex,
    key: String,
    value: String,
}

#[derive(Debug, Clone)]
struct Reverse {
    pattern: Regex,
    file: Template,
    file_may_start_with_branch: bool,
    http: Template,
    ssh: Template,
    web: Option<Template>,
    start_line: Template,
    start_column: Option<Template>,
    end_line: Option<Template>,
    end_column: Option<Template>,
}

/// A compiled, validated handler definition bound to its collaborators.
pub struct LinkHandler {
    definition: HandlerDefinition,
    server: RemoteServer,
    url: Template,
    selection: Template,
    query: Vec<QueryRule>,
    reverse: Reverse,
    settings: Arc<dyn Settings>,
    git: Arc<dyn Git>,
}

fn invalid(handler: &str, what: &str, error: impl Display) -> LinkError {
    LinkError::invalid_definition(handler, format!("{what}: {error}"))
}

fn compile(handler: &str, what: &str, source: &str) -> Result<Template, LinkError> {
    Template::parse(source).map_err(|e| invalid(handler, what, e))
}

fn compile_optional(handler: &str, what: &str, source: Option<&str>) -> Result<Option<Template>, LinkError> {
    source.map(|source| compile(handler, what, source)).transpose()
}

/// Context the `url` template is validated against.
fn url_probe() -> TemplateContext {
    TemplateContext::new()
        .with("base", "https://example.com")
        .with("http", "https://example.com")
        .with("ssh", "git@example.com")
        .with("web", "https://example.com")
        .with("repository", "project/repository")
        .with("ref", "main")
        .with("encoded_ref", "main")
        .with("ref_type", RefType::Branch.as_str())
        .with("file", "file.txt")
        .with("raw_file", "file.txt")
}

fn selection_context(range: &SelectedRange) -> TemplateContext {
    TemplateContext::new()
        .with("startLine", &range.start_line)
        .with("startColumn", &range.start_column)
        .with("endLine", &range.end_line)
        .with("endColumn", &range.end_column)
}

/// Splits `path` into its segments, rejecting anything that escapes the
/// directory it is relative to.
fn relative_segments(path: &Path) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(segments)
}

/// Merges a rendered selection suffix into `url`.
///
/// The part before any `#` is read as query parameters when it starts with
/// `?` or `&`; the part after it becomes the fragment.
fn merge_selection(url: &mut Url, suffix: &str) {
    let (query, fragment) = match suffix.split_once('#') {
        Some((query, fragment)) => (query, Some(fragment)),
        None => (suffix, None),
    };

    let query = query.trim_start_matches(['?', '&']);
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        url.set_fragment(Some(fragment));
    }
}

impl LinkHandler {
    /// Compiles and validates `definition`.
    ///
    /// # Errors
    ///
    /// [`LinkError::InvalidDefinition`] when a pattern does not compile, a
    /// template does not parse, a template refers to a variable its context
    /// lacks, or the `url` template does not produce an absolute URL.
    pub fn new(
        definition: HandlerDefinition,
        settings: Arc<dyn Settings>,
        git: Arc<dyn Git>,
    ) -> Result<Self, LinkError> {
        let name = definition.name.clone();

        let fixed = match &definition.server {
            ServerSource::Public { servers } => servers.clone(),
            ServerSource::Private { .. } => Vec::new(),
        };
        let keys: Vec<String> = definition
            .server_settings_keys()
            .into_iter()
            .map(String::from)
            .collect();
        let factory: Option<ServerFactory> = if keys.is_empty() {
            None
        } else {
            let settings = settings.clone();
            let factory: ServerFactory = Arc::new(move || {
                keys.iter()
                    .flat_map(|key| settings.servers(key))
                    .collect::<Vec<_>>()
            });
            Some(factory)
        };
        let server = RemoteServer::new(&fixed, factory).map_err(|e| invalid(&name, "server", e))?;

        let url = compile(&name, "url", &definition.url)?;
        let selection = compile(&name, "selection", &definition.selection)?;

        let query = definition
            .query
            .iter()
            .map(|q| {
                Ok::<_, LinkError>(QueryRule {
                    pattern: Regex::new(&q.pattern).map_err(|e| invalid(&name, "query pattern", e))?,
                    key: q.key.clone(),
                    value: q.value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let settings_reverse = &definition.reverse;
        let reverse = Reverse {
            pattern: Regex::new(&settings_reverse.pattern)
                .map_err(|e| invalid(&name, "reverse pattern", e))?,
            file: compile(&name, "reverse file", &settings_reverse.file)?,
            file_may_start_with_branch: settings_reverse.file_may_start_with_branch,
            http: compile(&name, "reverse server http", &settings_reverse.server.http)?,
            ssh: compile(&name, "reverse server ssh", &settings_reverse.server.ssh)?,
            web: compile_optional(&name, "reverse server web", settings_reverse.server.web.as_deref())?,
            start_line: compile(&name, "reverse start line", &settings_reverse.selection.start_line)?,
            start_column: compile_optional(
                &name,
                "reverse start column",
                settings_reverse.selection.start_column.as_deref(),
            )?,
            end_line: compile_optional(&name, "reverse end line", settings_reverse.selection.end_line.as_deref())?,
            end_column: compile_optional(
                &name,
                "reverse end column",
                settings_reverse.selection.end_column.as_deref(),
            )?,
        };

        let handler = Self {
            definition,
            server,
            url,
            selection,
            query,
            reverse,
            settings,
            git,
        };
        handler.validate()?;
        Ok(handler)
    }

    fn validate(&self) -> Result<(), LinkError> {
        let name = self.name();

        let rendered = self.url.render(&url_probe()).map_err(|e| invalid(name, "url", e))?;
        Url::parse(&rendered).map_err(|e| invalid(name, "url", format!("'{rendered}' is not a URL ({e})")))?;

        self.selection
            .render(&selection_context(&SelectedRange::lines(1, 2)))
            .map_err(|e| invalid(name, "selection", e))?;

        let mut context = TemplateContext::new();
        context.insert_probe_captures(&self.reverse.pattern);
        context.insert(
            "server",
            &server_variables(&StaticServer {
                http: "https://example.com".to_string(),
                ssh: Some("git@example.com".to_string()),
                web: Some("https://example.com".to_string()),
            }),
        );
        let reverse = &self.reverse;
        let templates = [
            ("reverse file", Some(&reverse.file)),
            ("reverse server http", Some(&reverse.http)),
            ("reverse server ssh", Some(&reverse.ssh)),
            ("reverse server web", reverse.web.as_ref()),
            ("reverse start line", Some(&reverse.start_line)),
            ("reverse start column", reverse.start_column.as_ref()),
            ("reverse end line", reverse.end_line.as_ref()),
            ("reverse end column", reverse.end_column.as_ref()),
        ];
        for (what, template) in templates {
            if let Some(template) = template {
                template.render(&context).map_err(|e| invalid(name, what, e))?;
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &HandlerDefinition {
        &self.definition
    }

    /// Descriptions of the handler's current servers.
    pub fn servers(&self) -> Vec<String> {
        self.server.describe()
    }

    /// The server `remote_url` belongs to, if it is one of this handler's.
    pub fn handles_remote(&self, remote_url: &str) -> Option<StaticServer> {
        self.server.match_remote(remote_url)
    }

    /// Creates a link to `file`.
    ///
    /// `remote_url` is the remote the handler was selected for; it decides
    /// the server, the repository path and, for
    /// [`LinkType::DefaultBranch`], the remote whose HEAD is used.
    ///
    /// Dropping the returned future while the ref is being resolved produces
    /// no URL at all.
    ///
    /// # Errors
    ///
    /// - [`LinkError::NoRemoteHead`] - No branch to link to
    /// - [`LinkError::NoTag`] - No tag at HEAD
    /// - [`LinkError::NoMatchingServer`] - `remote_url` is not one of the
    ///   handler's servers
    /// - [`LinkError::FileOutsideRepository`]
    /// - [`LinkError::Git`] - Ref resolution failed
    pub async fn create_url(
        &self,
        repository: &Repository,
        remote_url: &str,
        file: &FileInfo,
        options: &LinkOptions,
    ) -> Result<CreatedUrl, LinkError> {
        let (reference, ref_type) = match &options.target {
            LinkTarget::Preset(link_type) => {
                let reference = self.get_ref(*link_type, repository, remote_url).await?;
                (reference, link_type.ref_type())
            }
            LinkTarget::Ref { reference, ref_type } => (reference.clone(), *ref_type),
        };

        self.render_url(repository, remote_url, file, &reference, ref_type)
    }

    /// Resolves the ref a link of `link_type` to `remote_url` would use.
    ///
    /// The default branch is read from the remote owning `remote_url`,
    /// falling back to `origin`.
    pub async fn get_ref(
        &self,
        link_type: LinkType,
        repository: &Repository,
        remote_url: &str,
    ) -> Result<RefInfo, LinkError> {
        let remote = repository
            .remote_for_url(remote_url)
            .map_or(DEFAULT_REMOTE, |remote| remote.name.as_str());
        let root = &repository.root;
        match link_type {
            LinkType::Branch => self.git.current_branch(root).await?.ok_or_else(|| {
                LinkError::NoRemoteHead("HEAD is detached, so there is no branch to link to".to_string())
            }),
            LinkType::Commit => Ok(self.git.commit(root).await?),
            LinkType::DefaultBranch => self.git.default_branch(root, remote).await?.ok_or_else(|| {
                LinkError::NoRemoteHead(format!(
                    "The remote '{remote}' has no default branch. Run 'git remote set-head {remote} --auto' to set it"
                ))
            }),
            LinkType::Tag => self.git.head_tag(root).await?.ok_or(LinkError::NoTag),
        }
    }

    /// The spelling of `reference` that goes into the link.
    fn ref_text<'a>(&self, reference: &'a RefInfo, ref_type: RefType) -> &'a str {
        match ref_type {
            RefType::Commit if self.settings.use_short_hash() => &reference.abbreviated,
            RefType::Commit => &reference.symbolic,
            RefType::Branch | RefType::Tag => match self.definition.branch_ref {
                BranchRefKind::Abbreviated => &reference.abbreviated,
                BranchRefKind::Symbolic => &reference.symbolic,
            },
        }
    }

    /// Builds the link for an already resolved ref. Never suspends.
    pub fn render_url(
        &self,
        repository: &Repository,
        remote_url: &str,
        file: &FileInfo,
        reference: &RefInfo,
        ref_type: RefType,
    ) -> Result<CreatedUrl, LinkError> {
        let server = self
            .server
            .match_remote(remote_url)
            .ok_or_else(|| LinkError::NoMatchingServer(remote_url.to_string()))?;
        let repository_path = repository_path(remote_url, &server)
            .ok_or_else(|| LinkError::NoMatchingServer(remote_url.to_string()))?;

        let relative = if file.path.is_absolute() {
            file.path
                .strip_prefix(&repository.root)
                .map_err(|_| LinkError::FileOutsideRepository(file.path.clone()))?
        } else {
            file.path.as_path()
        };
        let segments =
            relative_segments(relative).ok_or_else(|| LinkError::FileOutsideRepository(file.path.clone()))?;
        let raw_file = segments.join("/");
        let encoded_file = segments
            .iter()
            .map(|segment| encode_uri_component(segment))
            .collect::<Vec<_>>()
            .join("/");

        let ref_text = self.ref_text(reference, ref_type);
        let context = TemplateContext::new()
            .with("base", server.web_or_http())
            .with("http", &server.http)
            .with("ssh", server.ssh.as_deref().unwrap_or_default())
            .with("web", server.web_or_http())
            .with("repository", &repository_path)
            .with("ref", ref_text)
            .with("encoded_ref", &encode_uri(ref_text))
            .with("ref_type", ref_type.as_str())
            .with("file", &encoded_file)
            .with("raw_file", &raw_file);

        let rendered = self.url.render(&context)?;
        let mut url = Url::parse(&rendered).map_err(|source| LinkError::InvalidUrl {
            handler: self.name().to_string(),
            url: rendered.clone(),
            source,
        })?;

        for rule in self.query.iter().filter(|rule| rule.pattern.is_match(&raw_file)) {
            url.query_pairs_mut().append_pair(&rule.key, &rule.value);
        }

        let selection = match &file.selection {
            Some(range) => {
                let suffix = self.selection.render(&selection_context(range))?;
                merge_selection(&mut url, &suffix);
                Some(suffix)
            }
            None => None,
        };

        debug!("{} created {}", self.name(), url);
        Ok(CreatedUrl {
            url: url.to_string(),
            relative_path: raw_file,
            selection,
            range: file.selection,
        })
    }

    /// Decodes a link produced by this handler's provider.
    ///
    /// Returns `None` when the URL is not on one of the handler's servers or
    /// does not have the handler's shape.
    pub fn get_url_info(&self, url: &str) -> Option<UrlInfo> {
        let server = self.server.match_web(url)?;
        let captures = self.reverse.pattern.captures(url)?;

        let mut context = TemplateContext::new();
        context.insert_captures(&self.reverse.pattern, &captures);
        context.insert("server", &server_variables(&server));

        match self.decode(&context, server) {
            Ok(info) => info,
            Err(e) => {
                warn!("{} failed to decode '{}': {}", self.name(), url, e);
                None
            }
        }
    }

    fn decode(&self, context: &TemplateContext, matched: StaticServer) -> tera::Result<Option<UrlInfo>> {
        let reverse = &self.reverse;

        let file = decode_uri(&reverse.file.render(context)?);
        let file_path = file.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("/");
        if file_path.is_empty() {
            return Ok(None);
        }

        let http = reverse.http.render(context)?;
        let server = StaticServer {
            http: if http.is_empty() { matched.http } else { http },
            ssh: reverse.ssh.render_optional(context)?,
            web: render_optional(reverse.web.as_ref(), context)?,
        };

        let selection = PartialSelectedRange {
            start_line: number(Some(&reverse.start_line), context)?,
            start_column: number(reverse.start_column.as_ref(), context)?,
            end_line: number(reverse.end_line.as_ref(), context)?,
            end_column: number(reverse.end_column.as_ref(), context)?,
        };

        Ok(Some(UrlInfo {
            handler: self.name().to_string(),
            file_path,
            file_may_start_with_branch: reverse.file_may_start_with_branch,
            server,
            selection,
        }))
    }
}

fn render_optional(template: Option<&Template>, context: &TemplateContext) -> tera::Result<Option<String>> {
    match template {
        Some(template) => template.render_optional(context),
        None => Ok(None),
    }
}

/// Renders a selection template to a number. Anything that is not an
/// integer counts as unknown.
fn number(template: Option<&Template>, context: &TemplateContext) -> tera::Result<Option<i64>> {
    Ok(render_optional(template, context)?.and_then(|text| text.parse().ok()))
}

impl fmt::Debug for LinkHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkHandler")
            .field("name", &self.definition.name)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::Remote;
    use crate::links::definition::builtin_definitions;
    use crate::links::server::ServerSpec;
    use async_trait::async_trait;
    use std::path::PathBuf;

    /// In-memory [`Git`] with fixed answers.
    #[derive(Debug, Clone)]
    pub(crate) struct FakeGit {
        pub branch: Option<RefInfo>,
        pub commit: RefInfo,
        pub default_branch: Option<RefInfo>,
        pub tag: Option<RefInfo>,
    }

    impl Default for FakeGit {
        fn default() -> Self {
            Self {
                branch: Some(RefInfo::branch("main")),
                commit: RefInfo::new("abcdef1", "abcdef1234567890abcdef1234567890abcdef12"),
                default_branch: Some(RefInfo::branch("trunk")),
                tag: None,
            }
        }
    }

    #[async_trait]
    impl Git for FakeGit {
        async fn current_branch(&self, _: &Path) -> anyhow::Result<Option<RefInfo>> {
            Ok(self.branch.clone())
        }

        async fn commit(&self, _: &Path) -> anyhow::Result<RefInfo> {
            Ok(self.commit.clone())
        }

        async fn default_branch(&self, _: &Path, remote: &str) -> anyhow::Result<Option<RefInfo>> {
            if remote == "origin" {
                Ok(self.default_branch.clone())
            } else {
                anyhow::bail!("unexpected remote {remote}")
            }
        }

        async fn head_tag(&self, _: &Path) -> anyhow::Result<Option<RefInfo>> {
            Ok(self.tag.clone())
        }
    }

    pub(crate) fn test_config() -> Config {
        toml::from_str(
            r#"
            [[servers.bitbucket_server]]
            http = "https://git.acme.com"
            ssh = "ssh://git@git.acme.com:7999"

            [[servers.gitea]]
            http = "https://gitea.acme.com"
            ssh = "git@gitea.acme.com"

            [[servers.gitiles]]
            http = "https://gerrit.acme.com"
            ssh = "ssh://gerrit.acme.com:29418"
            "#,
        )
        .unwrap()
    }

    pub(crate) fn handler_with(name: &str, config: Config, git: FakeGit) -> LinkHandler {
        let definition = builtin_definitions()
            .unwrap()
            .into_iter()
            .find(|d| d.name == name)
            .unwrap();
        LinkHandler::new(definition, Arc::new(config), Arc::new(git)).unwrap()
    }

    fn handler(name: &str) -> LinkHandler {
        handler_with(name, test_config(), FakeGit::default())
    }

    pub(crate) fn repository(remote: &str) -> Repository {
        Repository {
            root: PathBuf::from("/work/widgets"),
            remotes: vec![Remote {
                name: "origin".to_string(),
                urls: vec![remote.to_string()],
            }],
        }
    }

    fn file(path: &str) -> FileInfo {
        FileInfo::new(PathBuf::from("/work/widgets").join(path))
    }

    fn commit_ref() -> LinkOptions {
        LinkOptions {
            target: LinkTarget::Ref {
                reference: RefInfo::new("abcdef1", "abcdef1"),
                ref_type: RefType::Commit,
            },
        }
    }

    #[tokio::test]
    async fn test_github_branch_link() {
        let remote = "git@github.com:acme/widgets.git";
        let created = handler("GitHub")
            .create_url(&repository(remote), remote, &file("src/index.ts"), &LinkOptions::default())
            .await
            .unwrap();
        assert_eq!(created.url, "https://github.com/acme/widgets/blob/main/src/index.ts");
        assert_eq!(created.relative_path, "src/index.ts");
        assert_eq!(created.selection, None);
    }

    #[tokio::test]
    async fn test_github_line_range() {
        let remote = "git@github.com:acme/widgets.git";
        let created = handler("GitHub")
            .create_url(
                &repository(remote),
                remote,
                &file("src/index.ts").with_selection(SelectedRange::lines(10, 12)),
                &LinkOptions::default(),
            )
            .await
            .unwrap();
        assert!(created.url.ends_with("#L10-L12"), "{}", created.url);
        assert_eq!(created.selection.as_deref(), Some("#L10-L12"));
    }

    #[tokio::test]
    async fn test_bitbucket_server_commit_link() {
        let remote = "https://git.acme.com/scm/proj/repo.git";
        let created = handler("Bitbucket Server")
            .create_url(&repository(remote), remote, &file("src/index.ts"), &commit_ref())
            .await
            .unwrap();
        assert_eq!(
            created.url,
            "https://git.acme.com/projects/PROJ/repos/repo/browse/src/index.ts?at=abcdef1"
        );
    }

    #[tokio::test]
    async fn test_bitbucket_server_ssh_remote_and_symbolic_branch() {
        let remote = "ssh://git@git.acme.com:7999/proj/repo.git";
        let created = handler("Bitbucket Server")
            .create_url(
                &repository(remote),
                remote,
                &file("src/index.ts").with_selection(SelectedRange::lines(3, 3)),
                &LinkOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(
            created.url,
            "https://git.acme.com/projects/PROJ/repos/repo/browse/src/index.ts?at=refs/heads/main#3"
        );
    }

    #[test]
    fn test_github_reverse() {
        let info = handler("GitHub")
            .get_url_info("https://github.com/acme/widgets/blob/main/src/index.ts#L10-L12")
            .unwrap();
        assert_eq!(info.file_path, "src/index.ts");
        assert_eq!(info.selection.start_line, Some(10));
        assert_eq!(info.selection.end_line, Some(12));
        assert_eq!(info.selection.start_column, None);
        assert!(info.file_may_start_with_branch);
        assert_eq!(info.server.http, "https://github.com");
        assert_eq!(info.server.ssh.as_deref(), Some("git@github.com"));
    }

    #[test]
    fn test_other_fragments_decode_without_selection() {
        let cases = [
            ("GitHub", "https://github.com/acme/widgets/blob/main/README.md#installation"),
            ("GitHub", "https://github.com/acme/widgets/blob/main/README.md#L10-notes"),
            ("GitLab", "https://gitlab.com/acme/widgets/-/blob/main/README.md#installation"),
            ("Gitea", "https://gitea.acme.com/acme/widgets/src/branch/main/README.md#installation"),
            ("Bitbucket", "https://bitbucket.org/acme/widgets/src/main/README.md#markdown-header-installation"),
            (
                "Bitbucket Server",
                "https://git.acme.com/projects/PROJ/repos/widgets/browse/README.md?at=main#2-setup",
            ),
            ("Gitiles", "https://gerrit.acme.com/widgets/+/main/README.md#installation"),
        ];
        for (name, url) in cases {
            let info = handler(name)
                .get_url_info(url)
                .unwrap_or_else(|| panic!("{name} did not decode {url}"));
            assert_eq!(info.file_path, "README.md", "{url}");
            assert_eq!(info.selection, PartialSelectedRange::default(), "{url}");
        }
    }

    #[tokio::test]
    async fn test_space_in_path_round_trips() {
        let remote = "git@github.com:acme/widgets.git";
        let github = handler("GitHub");
        let created = github
            .create_url(&repository(remote), remote, &file("docs/my file.ts"), &LinkOptions::default())
            .await
            .unwrap();
        assert_eq!(created.url, "https://github.com/acme/widgets/blob/main/docs/my%20file.ts");
        let info = github.get_url_info(&created.url).unwrap();
        assert_eq!(info.file_path, "docs/my file.ts");
    }

    #[tokio::test]
    async fn test_round_trip_every_handler() {
        let cases = [
            ("GitHub", "git@github.com:acme/widgets.git"),
            ("GitLab", "https://gitlab.com/acme/widgets.git"),
            ("Bitbucket", "git@bitbucket.org:acme/widgets.git"),
            ("Bitbucket Server", "https://git.acme.com/scm/proj/widgets.git"),
            ("Gitea", "git@gitea.acme.com:acme/widgets.git"),
            ("Gitiles", "https://gerrit.acme.com/acme/widgets"),
            ("Azure DevOps", "git@ssh.dev.azure.com:v3/acme/project/widgets"),
        ];
        let range = SelectedRange {
            start_line: 10,
            start_column: 2,
            end_line: 12,
            end_column: 7,
        };

        for (name, remote) in cases {
            let handler = handler(name);
            let created = handler
                .create_url(
                    &repository(remote),
                    remote,
                    &file("src/my file.ts").with_selection(range),
                    &LinkOptions::default(),
                )
                .await
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            let info = handler
                .get_url_info(&created.url)
                .unwrap_or_else(|| panic!("{name} could not decode {}", created.url));

            assert!(
                info.file_path == "src/my file.ts"
                    || (info.file_may_start_with_branch && info.file_path.ends_with("src/my file.ts")),
                "{name}: {}",
                info.file_path
            );
            assert_eq!(info.selection.start_line, Some(10), "{name}");
            for (decoded, expected) in [
                (info.selection.start_column, 2),
                (info.selection.end_line, 12),
                (info.selection.end_column, 7),
            ] {
                assert!(decoded.is_none() || decoded == Some(expected), "{name}: {:?}", info.selection);
            }
        }
    }

    #[tokio::test]
    async fn test_branch_with_slash_is_flagged() {
        let remote = "git@github.com:acme/widgets.git";
        let git = FakeGit {
            branch: Some(RefInfo::branch("feature/login")),
            ..FakeGit::default()
        };
        let github = handler_with("GitHub", test_config(), git);
        let created = github
            .create_url(&repository(remote), remote, &file("src/index.ts"), &LinkOptions::default())
            .await
            .unwrap();
        assert_eq!(
            created.url,
            "https://github.com/acme/widgets/blob/feature/login/src/index.ts"
        );
        let info = github.get_url_info(&created.url).unwrap();
        assert_eq!(info.file_path, "login/src/index.ts");
        assert!(info.file_may_start_with_branch);
    }

    #[tokio::test]
    async fn test_markdown_files_get_query() {
        let remote = "git@github.com:acme/widgets.git";
        let created = handler("GitHub")
            .create_url(
                &repository(remote),
                remote,
                &file("docs/README.md").with_selection(SelectedRange::lines(3, 3)),
                &LinkOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(
            created.url,
            "https://github.com/acme/widgets/blob/main/docs/README.md?plain=1#L3"
        );
    }

    #[tokio::test]
    async fn test_azure_selection_goes_into_query() {
        let remote = "https://acme@dev.azure.com/acme/project/_git/widgets";
        let created = handler("Azure DevOps")
            .create_url(
                &repository(remote),
                remote,
                &file("src/index.ts").with_selection(SelectedRange::lines(4, 5)),
                &LinkOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(
            created.url,
            "https://dev.azure.com/acme/project/_git/widgets?path=/src/index.ts&version=GBmain\
             &line=4&lineEnd=5&lineStartColumn=1&lineEndColumn=1&lineStyle=plain&_a=contents"
        );
    }

    #[tokio::test]
    async fn test_gitea_ref_type_in_path() {
        let remote = "git@gitea.acme.com:acme/widgets.git";
        let gitea = handler("Gitea");
        let repository = repository(remote);
        let commit = gitea
            .create_url(&repository, remote, &file("a.rs"), &LinkOptions::preset(LinkType::Commit))
            .await
            .unwrap();
        assert_eq!(
            commit.url,
            "https://gitea.acme.com/acme/widgets/src/commit/abcdef1234567890abcdef1234567890abcdef12/a.rs"
        );
        let branch = gitea
            .create_url(&repository, remote, &file("a.rs"), &LinkOptions::default())
            .await
            .unwrap();
        assert_eq!(branch.url, "https://gitea.acme.com/acme/widgets/src/branch/main/a.rs");
    }

    #[tokio::test]
    async fn test_short_hash_setting() {
        let mut config = test_config();
        config.links.use_short_hash = true;
        let remote = "git@github.com:acme/widgets.git";
        let github = handler_with("GitHub", config, FakeGit::default());
        let created = github
            .create_url(&repository(remote), remote, &file("a.rs"), &LinkOptions::preset(LinkType::Commit))
            .await
            .unwrap();
        assert_eq!(created.url, "https://github.com/acme/widgets/blob/abcdef1/a.rs");
    }

    #[tokio::test]
    async fn test_default_branch_uses_owning_remote() {
        let remote = "git@github.com:acme/widgets.git";
        let created = handler("GitHub")
            .create_url(
                &repository(remote),
                remote,
                &file("a.rs"),
                &LinkOptions::preset(LinkType::DefaultBranch),
            )
            .await
            .unwrap();
        assert_eq!(created.url, "https://github.com/acme/widgets/blob/trunk/a.rs");
    }

    #[tokio::test]
    async fn test_detached_head_is_no_remote_head() {
        let git = FakeGit {
            branch: None,
            ..FakeGit::default()
        };
        let remote = "git@github.com:acme/widgets.git";
        let err = handler_with("GitHub", test_config(), git)
            .create_url(&repository(remote), remote, &file("a.rs"), &LinkOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NoRemoteHead(_)));
    }

    #[tokio::test]
    async fn test_missing_default_branch_is_no_remote_head() {
        let git = FakeGit {
            default_branch: None,
            ..FakeGit::default()
        };
        let remote = "git@github.com:acme/widgets.git";
        let err = handler_with("GitHub", test_config(), git)
            .get_ref(LinkType::DefaultBranch, &repository(remote), remote)
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NoRemoteHead(_)));
    }

    #[tokio::test]
    async fn test_tag_preset() {
        let remote = "git@github.com:acme/widgets.git";
        let err = handler("GitHub")
            .get_ref(LinkType::Tag, &repository(remote), remote)
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NoTag));

        let git = FakeGit {
            tag: Some(RefInfo::tag("v2.0.0")),
            ..FakeGit::default()
        };
        let created = handler_with("GitHub", test_config(), git)
            .create_url(&repository(remote), remote, &file("a.rs"), &LinkOptions::preset(LinkType::Tag))
            .await
            .unwrap();
        assert_eq!(created.url, "https://github.com/acme/widgets/blob/v2.0.0/a.rs");
    }

    #[tokio::test]
    async fn test_git_failures_propagate() {
        let remote = "git@github.com:acme/widgets.git";
        let mut repository = repository(remote);
        repository.remotes[0].name = "upstream".to_string();
        let err = handler("GitHub")
            .create_url(&repository, remote, &file("a.rs"), &LinkOptions::preset(LinkType::DefaultBranch))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::Git(_)));
    }

    #[test]
    fn test_unmatched_remote_and_outside_file() {
        let github = handler("GitHub");
        let reference = RefInfo::branch("main");
        let remote = "git@gitlab.com:acme/widgets.git";
        let err = github
            .render_url(&repository(remote), remote, &file("a.rs"), &reference, RefType::Branch)
            .unwrap_err();
        assert!(matches!(err, LinkError::NoMatchingServer(_)));

        let remote = "git@github.com:acme/widgets.git";
        let err = github
            .render_url(
                &repository(remote),
                remote,
                &FileInfo::new("/elsewhere/a.rs"),
                &reference,
                RefType::Branch,
            )
            .unwrap_err();
        assert!(matches!(err, LinkError::FileOutsideRepository(_)));

        let err = github
            .render_url(&repository(remote), remote, &FileInfo::new("../a.rs"), &reference, RefType::Branch)
            .unwrap_err();
        assert!(matches!(err, LinkError::FileOutsideRepository(_)));
    }

    #[test]
    fn test_reverse_requires_matching_server() {
        let github = handler("GitHub");
        assert!(github
            .get_url_info("https://gitlab.com/acme/widgets/-/blob/main/src/index.ts")
            .is_none());
        assert!(handler("GitLab")
            .get_url_info("https://github.com/acme/widgets/blob/main/src/index.ts")
            .is_none());
    }

    #[test]
    fn test_private_handler_without_servers_matches_nothing() {
        let gitea = handler_with("Gitea", Config::default(), FakeGit::default());
        assert!(gitea.handles_remote("git@gitea.acme.com:acme/widgets.git").is_none());
        assert!(gitea.servers().is_empty());
    }

    #[test]
    fn test_enterprise_servers_extend_public_ones() {
        let mut config = Config::default();
        config.servers.insert(
            "github_enterprise".to_string(),
            vec![ServerSpec::Static(StaticServer {
                http: "https://github.acme.com".to_string(),
                ssh: Some("git@github.acme.com".to_string()),
                web: None,
            })],
        );
        let github = handler_with("GitHub", config, FakeGit::default());
        assert!(github.handles_remote("git@github.com:acme/widgets.git").is_some());
        assert!(github.handles_remote("git@github.acme.com:acme/widgets.git").is_some());
        assert_eq!(github.servers().len(), 2);
    }

    #[test]
    fn test_unknown_capture_fails_validation() {
        let mut definition = builtin_definitions()
            .unwrap()
            .into_iter()
            .find(|d| d.name == "GitHub")
            .unwrap();
        definition.reverse.selection.end_line = Some("{{ captures.nope }}".to_string());
        let err = LinkHandler::new(definition, Arc::new(Config::default()), Arc::new(FakeGit::default()))
            .unwrap_err();
        assert!(matches!(err, LinkError::InvalidDefinition { .. }), "{err}");
    }

    #[test]
    fn test_relative_url_template_fails_validation() {
        let mut definition = builtin_definitions()
            .unwrap()
            .into_iter()
            .find(|d| d.name == "GitHub")
            .unwrap();
        definition.url = "{{ repository }}/{{ file }}".to_string();
        let err = LinkHandler::new(definition, Arc::new(Config::default()), Arc::new(FakeGit::default()))
            .unwrap_err();
        assert!(matches!(err, LinkError::InvalidDefinition { .. }), "{err}");
    }

    #[test]
    fn test_every_builtin_definition_is_valid() {
        for definition in builtin_definitions().unwrap() {
            let name = definition.name.clone();
            LinkHandler::new(definition, Arc::new(test_config()), Arc::new(FakeGit::default()))
                .unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }
}

//
//  git-weblinks
//  tests/links.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use std::path::Path;
use std::sync::Arc;

use git2::{Repository as GitRepository, Signature};
use git_weblinks::config::Config;
use git_weblinks::context::{find_repository, LocalGit};
use git_weblinks::links::{FileInfo, LinkError, LinkHandlerProvider, LinkOptions, LinkType};
use git_weblinks::locate::locate;
use git_weblinks::selection::SelectedRange;
use tempfile::TempDir;

/// A working copy on `main` with one commit, an `origin` remote and a file.
fn working_copy(remote: &str) -> (TempDir, git2::Oid) {
    let dir = TempDir::new().unwrap();
    let repo = GitRepository::init(dir.path()).unwrap();
    let signature = Signature::now("Test", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let oid = repo
        .commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
        .unwrap();
    repo.reference("refs/heads/main", oid, true, "main").unwrap();
    repo.set_head("refs/heads/main").unwrap();
    repo.remote("origin", remote).unwrap();

    write(dir.path(), "src/app.ts", "import a\nimport b\nimport c\n\nexport {}\n");
    (dir, oid)
}

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn provider() -> LinkHandlerProvider {
    LinkHandlerProvider::new(Arc::new(Config::default()), Arc::new(LocalGit)).unwrap()
}

#[tokio::test]
async fn test_link_and_locate_round_trip() {
    let (dir, _) = working_copy("https://github.com/acme/widgets.git");
    let provider = provider();
    let repository = find_repository(dir.path()).unwrap().unwrap();

    let selected = provider.select(&repository).unwrap();
    assert_eq!(selected.handler.name(), "GitHub");
    assert_eq!(selected.remote_name, "origin");

    let file = FileInfo::new(repository.root.join("src/app.ts")).with_selection(SelectedRange::lines(2, 3));
    let created = selected
        .handler
        .create_url(&repository, selected.remote_url, &file, &LinkOptions::default())
        .await
        .unwrap();
    assert_eq!(created.url, "https://github.com/acme/widgets/blob/main/src/app.ts#L2-L3");
    assert_eq!(created.markdown(), format!("[src/app.ts#L2-L3]({})", created.url));

    let infos = provider.get_url_info(&created.url);
    let located = locate(&infos, &[repository.clone()], &provider).unwrap();
    assert_eq!(located.len(), 1);
    assert_eq!(located[0].relative_path, "src/app.ts");
    let range = located[0].range.unwrap();
    assert_eq!((range.start_line, range.end_line), (2, 3));
}

#[tokio::test]
async fn test_commit_link_uses_full_hash() {
    let (dir, oid) = working_copy("git@gitlab.com:acme/widgets.git");
    let provider = provider();
    let repository = find_repository(dir.path()).unwrap().unwrap();
    let selected = provider.select(&repository).unwrap();

    let created = selected
        .handler
        .create_url(
            &repository,
            selected.remote_url,
            &FileInfo::new(repository.root.join("src/app.ts")),
            &LinkOptions::preset(LinkType::Commit),
        )
        .await
        .unwrap();
    assert_eq!(
        created.url,
        format!("https://gitlab.com/acme/widgets/-/blob/{oid}/src/app.ts")
    );
}

#[tokio::test]
async fn test_default_branch_without_remote_head() {
    let (dir, _) = working_copy("git@bitbucket.org:acme/widgets.git");
    let provider = provider();
    let repository = find_repository(dir.path()).unwrap().unwrap();
    let selected = provider.select(&repository).unwrap();

    let result = selected
        .handler
        .create_url(
            &repository,
            selected.remote_url,
            &FileInfo::new(repository.root.join("src/app.ts")),
            &LinkOptions::preset(LinkType::DefaultBranch),
        )
        .await;
    assert!(matches!(result, Err(LinkError::NoRemoteHead(_))));
}

#[test]
fn test_unsupported_remote_selects_nothing() {
    let (dir, _) = working_copy("https://example.com/acme/widgets.git");
    let repository = find_repository(dir.path()).unwrap().unwrap();
    assert!(provider().select(&repository).is_none());
}

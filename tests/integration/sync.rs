//! Library-level sync tests against a mock GitHub server.

use super::common::{mount_repo, release_json};
use ghmirror::config::{ReleaseFilter, RetentionPolicy};
use ghmirror::core::CancelToken;
use ghmirror::github::GithubClient;
use ghmirror::mirror::{sync_repository, DownloadEngine};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

fn policy(repo: &str, max_count: usize, filter: ReleaseFilter) -> RetentionPolicy {
    RetentionPolicy {
        repo: repo.to_string(),
        max_count,
        filter,
    }
}

fn client(server: &MockServer) -> GithubClient {
    GithubClient::new(server.uri(), Duration::ZERO).unwrap()
}

fn engine() -> DownloadEngine {
    DownloadEngine::new(Duration::ZERO, CancelToken::new()).unwrap()
}

#[tokio::test]
async fn test_full_sync_materializes_selected_releases() {
    let server = MockServer::start().await;
    mount_repo(
        &server,
        "o/r",
        &[
            release_json(&server.uri(), "v3", "2024-03-01T00:00:00Z", false),
            release_json(&server.uri(), "v2", "2024-02-01T00:00:00Z", false),
            release_json(&server.uri(), "v1", "2024-01-01T00:00:00Z", false),
        ],
    )
    .await;

    let temp = TempDir::new().unwrap();
    let outcome = sync_repository(
        &client(&server),
        &engine(),
        temp.path(),
        &policy("o/r", 2, ReleaseFilter::All),
    )
    .await
    .unwrap();

    assert_eq!(outcome.downloaded, 2);
    let repo_dir = temp.path().join("o/r");
    assert!(repo_dir.join("v3/source.tar.gz").exists());
    assert!(repo_dir.join("v3/source.zip").exists());
    assert!(repo_dir.join("v3/README.md").exists());
    assert!(repo_dir.join("v2").is_dir());
    // v1 fell outside the retention window and was never downloaded
    assert!(!repo_dir.join("v1").exists());

    let readme = std::fs::read_to_string(repo_dir.join("v3/README.md")).unwrap();
    assert!(readme.contains("# Release v3"));
    assert!(readme.contains("release notes"));
}

#[tokio::test]
async fn test_stable_only_policy_ignores_prereleases() {
    let server = MockServer::start().await;
    mount_repo(
        &server,
        "o/r",
        &[
            release_json(&server.uri(), "v2-rc1", "2024-03-01T00:00:00Z", true),
            release_json(&server.uri(), "v1", "2024-01-01T00:00:00Z", false),
        ],
    )
    .await;

    let temp = TempDir::new().unwrap();
    let outcome = sync_repository(
        &client(&server),
        &engine(),
        temp.path(),
        &policy("o/r", 5, ReleaseFilter::StableOnly),
    )
    .await
    .unwrap();

    assert_eq!(outcome.downloaded, 1);
    assert!(temp.path().join("o/r/v1").is_dir());
    assert!(!temp.path().join("o/r/v2-rc1").exists());
}

#[tokio::test]
async fn test_slashed_tag_normalized_in_directory_name() {
    let server = MockServer::start().await;
    mount_repo(
        &server,
        "o/r",
        &[release_json(&server.uri(), "release/v1", "2024-01-01T00:00:00Z", false)],
    )
    .await;

    let temp = TempDir::new().unwrap();
    sync_repository(
        &client(&server),
        &engine(),
        temp.path(),
        &policy("o/r", 5, ReleaseFilter::All),
    )
    .await
    .unwrap();

    assert!(temp.path().join("o/r/release_v1").is_dir());
    assert!(!temp.path().join("o/r/release").exists());
}

#[tokio::test]
async fn test_rerun_after_retag_does_not_duplicate_directory() {
    let server = MockServer::start().await;
    mount_repo(
        &server,
        "o/r",
        &[release_json(&server.uri(), "release/v1", "2024-01-01T00:00:00Z", false)],
    )
    .await;

    let temp = TempDir::new().unwrap();
    // A previous pass already mirrored the same tag under its normalized name
    std::fs::create_dir_all(temp.path().join("o/r/release_v1")).unwrap();

    let outcome = sync_repository(
        &client(&server),
        &engine(),
        temp.path(),
        &policy("o/r", 5, ReleaseFilter::All),
    )
    .await
    .unwrap();

    assert_eq!(outcome.downloaded, 0);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.deleted, 0);
}

#[tokio::test]
async fn test_repo_with_zero_releases_is_a_noop() {
    let server = MockServer::start().await;
    mount_repo(&server, "o/empty", &[]).await;

    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("o/empty/old")).unwrap();

    let outcome = sync_repository(
        &client(&server),
        &engine(),
        temp.path(),
        &policy("o/empty", 5, ReleaseFilter::All),
    )
    .await
    .unwrap();

    assert_eq!(outcome.downloaded, 0);
    assert_eq!(outcome.deleted, 0);
    assert!(temp.path().join("o/empty/old").is_dir());
}

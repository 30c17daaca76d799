//! Common utilities for integration tests

use serde_json::json;
use std::process::Command;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn ghmirror_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ghmirror"))
}

/// JSON body for one GitHub release whose source archives are served by
/// the mock server itself.
pub fn release_json(
    server_uri: &str,
    tag: &str,
    created: &str,
    prerelease: bool,
) -> serde_json::Value {
    json!({
        "tag_name": tag,
        "name": format!("Release {}", tag),
        "prerelease": prerelease,
        "created_at": created,
        "published_at": created,
        "html_url": format!("https://github.com/o/r/releases/tag/{}", tag),
        "tarball_url": format!("{}/tarball/{}", server_uri, tag),
        "zipball_url": format!("{}/zipball/{}", server_uri, tag),
        "body": "release notes",
        "assets": [],
    })
}

/// Mount the `releases/latest` and listing endpoints for `repo`, plus the
/// source archives for every listed tag.
pub async fn mount_repo(server: &MockServer, repo: &str, releases: &[serde_json::Value]) {
    let latest = releases
        .iter()
        .find(|r| r["prerelease"] == false)
        .or_else(|| releases.first());

    match latest {
        Some(latest) => {
            Mock::given(method("GET"))
                .and(path(format!("/repos/{}/releases/latest", repo)))
                .respond_with(ResponseTemplate::new(200).set_body_json(latest))
                .mount(server)
                .await;
        }
        None => {
            Mock::given(method("GET"))
                .and(path(format!("/repos/{}/releases/latest", repo)))
                .respond_with(ResponseTemplate::new(404))
                .mount(server)
                .await;
        }
    }

    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/releases", repo)))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(server)
        .await;

    for release in releases {
        let tag = release["tag_name"].as_str().unwrap();
        Mock::given(method("GET"))
            .and(path(format!("/tarball/{}", tag)))
            .respond_with(ResponseTemplate::new(200).set_body_raw("tar", "application/octet-stream"))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/zipball/{}", tag)))
            .respond_with(ResponseTemplate::new(200).set_body_raw("zip", "application/octet-stream"))
            .mount(server)
            .await;
    }
}

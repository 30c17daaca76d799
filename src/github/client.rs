//! GitHub API client implementation.

use crate::core::{MirrorError, MirrorResult, Pacer};
use crate::github::types::{merge_releases, RawRelease, Release};
use crate::github::ReleaseSource;
use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// How many recent releases the listing endpoint is asked for.
const RECENT_WINDOW: usize = 50;

/// Attempts per API request before giving up with `RemoteUnavailable`.
const API_ATTEMPTS: u32 = 3;

/// GitHub API client.
///
/// Owns its own request pacer: GitHub's unauthenticated rate limit is low,
/// so consecutive API calls keep a minimum spacing.
pub struct GithubClient {
    http_client: HttpClient,
    api_base: String,
    pacer: Pacer,
}

impl GithubClient {
    /// Create a client against `api_base` with a minimum interval between
    /// API requests.
    pub fn new(api_base: impl Into<String>, request_interval: Duration) -> MirrorResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("ghmirror"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                MirrorError::RemoteUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            pacer: Pacer::new(request_interval),
        })
    }

    /// Get the latest release, or `None` when the repository has no
    /// releases. GitHub reports 404 on `releases/latest` for a repository
    /// with zero releases; that is a normal signal, not an error.
    async fn get_latest_release(&self, repo: &str) -> MirrorResult<Option<RawRelease>> {
        let url = format!("{}/repos/{}/releases/latest", self.api_base, repo);
        match self.api_get::<RawRelease>(&url).await {
            Ok(release) => Ok(Some(release)),
            Err(ApiError::NotFound) => Ok(None),
            Err(ApiError::Unavailable(msg)) => Err(MirrorError::RemoteUnavailable(msg)),
        }
    }

    /// Get the most recent releases via the paged listing endpoint.
    async fn get_recent_releases(&self, repo: &str) -> MirrorResult<Vec<RawRelease>> {
        let url = format!(
            "{}/repos/{}/releases?per_page={}",
            self.api_base, repo, RECENT_WINDOW
        );
        match self.api_get::<Vec<RawRelease>>(&url).await {
            Ok(releases) => Ok(releases),
            // A vanished repository mid-pass is still a remote failure here
            Err(ApiError::NotFound) => Err(MirrorError::RemoteUnavailable(format!(
                "Repository {} not found",
                repo
            ))),
            Err(ApiError::Unavailable(msg)) => Err(MirrorError::RemoteUnavailable(msg)),
        }
    }

    /// Make a paced API GET request and parse the JSON response, retrying
    /// transient failures.
    async fn api_get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let mut last_error = ApiError::Unavailable(format!("GET {} never attempted", url));

        for attempt in 1..=API_ATTEMPTS {
            self.pacer.wait().await;
            debug!("GET {} (attempt {}/{})", url, attempt, API_ATTEMPTS);

            match self.try_get(url).await {
                Ok(value) => return Ok(value),
                Err(ApiError::NotFound) => return Err(ApiError::NotFound),
                Err(e) => {
                    warn!("GET {} failed on attempt {}/{}: {}", url, attempt, API_ATTEMPTS, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn try_get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Unavailable(format!("GitHub API request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !response.status().is_success() {
            return Err(ApiError::Unavailable(format!(
                "GitHub API error: HTTP {} for {}",
                response.status(),
                url
            )));
        }

        response.json().await.map_err(|e| {
            ApiError::Unavailable(format!("Failed to parse GitHub API response: {}", e))
        })
    }
}

/// Internal API failure classification; `NotFound` is meaningful on the
/// "latest" endpoint and never retried.
#[derive(Debug)]
enum ApiError {
    NotFound,
    Unavailable(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "HTTP 404"),
            ApiError::Unavailable(msg) => write!(f, "{}", msg),
        }
    }
}

#[async_trait]
impl ReleaseSource for GithubClient {
    async fn fetch_releases(&self, repo: &str) -> MirrorResult<Vec<Release>> {
        let Some(latest) = self.get_latest_release(repo).await? else {
            info!("{}: no latest release, repository has zero releases", repo);
            return Ok(Vec::new());
        };

        let listing = self.get_recent_releases(repo).await?;
        let releases = merge_releases(Some(latest), listing);
        debug!("{}: {} release(s) after merge", repo, releases.len());
        Ok(releases)
    }
}

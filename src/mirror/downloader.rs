//! Download engine: materializes one release's assets, source archives and
//! summary file on disk, with retry and cleanup.

use crate::core::{CancelToken, MirrorError, MirrorResult, Pacer};
use crate::github::Release;
use chrono::SecondsFormat;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client as HttpClient;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

pub const SOURCE_TARBALL: &str = "source.tar.gz";
pub const SOURCE_ZIPBALL: &str = "source.zip";
pub const RELEASE_README: &str = "README.md";

/// Attempts per file before giving up with `DownloadFailed`.
const DOWNLOAD_ATTEMPTS: u32 = 3;

/// Downloads release content into one release directory at a time.
///
/// Every step is independently idempotent: files already present (with the
/// expected size, where known) are skipped. Failed or cancelled fetches
/// never leave a partial file at the final path; in-progress data lives in
/// a `.part` file that is renamed into place only on success.
pub struct DownloadEngine {
    http_client: HttpClient,
    pacer: Pacer,
    cancel: CancelToken,
}

impl DownloadEngine {
    /// Create an engine with a minimum interval between file fetches.
    ///
    /// The engine's HTTP client has no total request timeout; archives can
    /// legitimately take minutes. Stalls are bounded by the connect timeout
    /// and per-chunk cancellation checks.
    pub fn new(download_interval: Duration, cancel: CancelToken) -> MirrorResult<Self> {
        let http_client = HttpClient::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                MirrorError::RemoteUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            pacer: Pacer::new(download_interval),
            cancel,
        })
    }

    /// The engine's cancellation token, shared with callers so the
    /// reconciler can observe an interrupt between releases too.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Materialize `release` under `dest`: every asset, both source
    /// archives, and the synthesized `README.md`.
    ///
    /// On failure the directory is left as-is; the caller decides whether
    /// to remove it wholesale so a retry starts clean.
    pub async fn materialize(&self, release: &Release, dest: &Path) -> MirrorResult<()> {
        fs::create_dir_all(dest).await?;

        for asset in &release.assets {
            let path = dest.join(&asset.name);
            if file_matches_size(&path, asset.size).await? {
                debug!("{} already present with expected size, skipping", asset.name);
                continue;
            }
            info!("Downloading {} to {}", asset.name, path.display());
            self.download_file(&asset.download_url, &path, Some(asset.size))
                .await?;
        }

        let tarball = dest.join(SOURCE_TARBALL);
        if !tarball.exists() {
            info!("Downloading source tarball to {}", tarball.display());
            self.download_file(&release.tarball_url, &tarball, None)
                .await?;
        }

        let zipball = dest.join(SOURCE_ZIPBALL);
        if !zipball.exists() {
            info!("Downloading source zipball to {}", zipball.display());
            self.download_file(&release.zipball_url, &zipball, None)
                .await?;
        }

        let readme = dest.join(RELEASE_README);
        if !readme.exists() {
            debug!("Writing release README.md");
            fs::write(&readme, render_readme(release)).await?;
        }

        Ok(())
    }

    /// Download `url` to `dest` with retries. Network failures and short
    /// content are retried; cancellation and local I/O errors are not. The
    /// partial file is deleted before every retry and on every error exit.
    async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        expected_size: Option<u64>,
    ) -> MirrorResult<()> {
        let tmp = partial_path(dest);

        let mut attempt = 0;
        loop {
            attempt += 1;

            let result = match self.cancel.check() {
                Ok(()) => {
                    self.pacer.wait().await;
                    self.try_fetch(url, &tmp, expected_size).await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    fs::rename(&tmp, dest).await?;
                    return Ok(());
                }
                Err(MirrorError::DownloadFailed { .. }) if attempt < DOWNLOAD_ATTEMPTS => {
                    remove_partial(&tmp).await;
                    info!("Attempt {}/{} for {} failed, retrying", attempt, DOWNLOAD_ATTEMPTS, url);
                }
                Err(e) => {
                    remove_partial(&tmp).await;
                    return Err(e);
                }
            }
        }
    }

    /// One fetch attempt: stream the response body into `tmp`, checking the
    /// cancel token between chunks, then verify the byte count when the
    /// expected size is known.
    async fn try_fetch(
        &self,
        url: &str,
        tmp: &Path,
        expected_size: Option<u64>,
    ) -> MirrorResult<()> {
        let mut response = self.http_client.get(url).send().await.map_err(|e| {
            warn!("GET {} failed: {}", url, e);
            MirrorError::DownloadFailed {
                url: url.to_string(),
            }
        })?;

        if !response.status().is_success() {
            warn!("GET {} returned HTTP {}", url, response.status());
            return Err(MirrorError::DownloadFailed {
                url: url.to_string(),
            });
        }

        let total = expected_size.or_else(|| response.content_length());
        let progress = progress_bar(total);

        let mut file = fs::File::create(tmp).await?;
        let mut written: u64 = 0;
        loop {
            self.cancel.check()?;
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                    progress.set_position(written);
                }
                Ok(None) => break,
                Err(e) => {
                    progress.finish_and_clear();
                    warn!("GET {} interrupted mid-body: {}", url, e);
                    return Err(MirrorError::DownloadFailed {
                        url: url.to_string(),
                    });
                }
            }
        }
        file.flush().await?;
        progress.finish_and_clear();

        if let Some(expected) = expected_size {
            if written != expected {
                warn!(
                    "GET {} returned {} bytes, expected {}",
                    url, written, expected
                );
                return Err(MirrorError::DownloadFailed {
                    url: url.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Synthesize the release summary written alongside the downloaded files.
pub fn render_readme(release: &Release) -> String {
    let created = release
        .created_at
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    let published = release
        .published_at
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "unknown".to_string());
    let body = if release.body.is_empty() {
        "No release notes were provided by developers"
    } else {
        release.body.as_str()
    };

    format!(
        "# {}\n\nGithub Release link: {}\n\ncreated_at = {}\n\npublished_at = {}\n\n# Release notes\n{}\n",
        release.name, release.html_url, created, published, body
    )
}

fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!("{}.part", name))
}

async fn remove_partial(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!("Cleaned up {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to clean up {}: {}", path.display(), e),
    }
}

async fn file_matches_size(path: &Path, size: u64) -> MirrorResult<bool> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file() && meta.len() == size),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} {binary_bytes_per_sec}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("[{elapsed_precise}] {spinner} {bytes} {binary_bytes_per_sec}")
                    .unwrap(),
            );
            pb
        }
    }
}

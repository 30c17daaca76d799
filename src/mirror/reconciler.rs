//! Reconciliation: converge one repository's local state to its retention
//! policy's selection of remote releases.

use crate::config::RetentionPolicy;
use crate::core::{MirrorError, MirrorResult};
use crate::github::ReleaseSource;
use crate::mirror::downloader::DownloadEngine;
use crate::mirror::{local, retention};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

/// Outcome of one repository pass. Partial success is expected and must be
/// visible: one failed release does not abort the others, but it does feed
/// the process exit code.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Releases materialized this pass.
    pub downloaded: usize,
    /// Wanted releases that were already present locally.
    pub skipped: usize,
    /// Stale local releases pruned this pass.
    pub deleted: usize,
    /// Tags whose download exhausted retries; their directories were
    /// removed so a later pass starts clean.
    pub failed: Vec<String>,
}

impl SyncOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converge the local mirror of `policy.repo` under `home`.
///
/// Fetch and select wanted releases, diff against local state, download
/// what is missing in the selector's order, then prune what fell out of
/// the retention window. Deletion only happens after every download has
/// been attempted; the retention set is never shrunk before its
/// replacement content is present.
pub async fn sync_repository(
    source: &dyn ReleaseSource,
    engine: &DownloadEngine,
    home: &Path,
    policy: &RetentionPolicy,
) -> MirrorResult<SyncOutcome> {
    let repo = policy.repo.as_str();

    let releases = source.fetch_releases(repo).await?;
    let wanted = retention::select(releases, policy);
    if wanted.is_empty() {
        info!("{}: no releases to sync, skipping", repo);
        return Ok(SyncOutcome::default());
    }

    let local_tags = local::list_local(home, repo)?;

    let mut outcome = SyncOutcome::default();
    for release in &wanted {
        // An interrupt must abort the pass even when nothing is in flight
        engine.cancel_token().check()?;

        if local_tags.contains(&release.tag) {
            outcome.skipped += 1;
            continue;
        }

        info!("{}: downloading release {}", repo, release.tag);
        let dest = local::release_dir(home, repo, &release.tag);
        match engine.materialize(release, &dest).await {
            Ok(()) => outcome.downloaded += 1,
            Err(MirrorError::DownloadFailed { url }) => {
                // One failed release must not abort the rest of the pass
                error!("{}: failed to download {} ({}), removing {}", repo, release.tag, url, dest.display());
                remove_release_dir(&dest).await?;
                outcome.failed.push(release.tag.clone());
            }
            Err(e) => {
                // Interrupt or a local filesystem error: clean up the
                // in-flight directory, then abort the pass
                warn!("{}: aborting pass while downloading {}: {}", repo, release.tag, e);
                remove_release_dir(&dest).await?;
                return Err(e);
            }
        }
    }

    // Never prune after a cancellation request
    engine.cancel_token().check()?;

    let wanted_tags: std::collections::BTreeSet<&str> =
        wanted.iter().map(|r| r.tag.as_str()).collect();
    for tag in local_tags {
        if wanted_tags.contains(tag.as_str()) {
            continue;
        }
        let dir = local::release_dir(home, repo, &tag);
        info!("{}: removing stale release {}", repo, tag);
        fs::remove_dir_all(&dir).await?;
        outcome.deleted += 1;
    }

    info!(
        "{}: done ({} downloaded, {} already present, {} deleted, {} failed)",
        repo,
        outcome.downloaded,
        outcome.skipped,
        outcome.deleted,
        outcome.failed.len()
    );
    Ok(outcome)
}

async fn remove_release_dir(dir: &Path) -> MirrorResult<()> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

//! GitHub integration.
//!
//! This module provides the release source for the mirror:
//! - Fetch the latest release and a recent-release listing
//! - Normalize and deduplicate the records into domain [`Release`] values

use crate::core::MirrorResult;
use async_trait::async_trait;

pub mod client;
pub mod types;

pub use client::GithubClient;
pub use types::{Asset, Release};

/// Source of normalized release records for one repository.
///
/// Implementations must be idempotent and side-effect-free on the
/// filesystem. The reconciler is written against this seam so tests can
/// substitute an in-memory source.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch and normalize the recent releases of `repo` (`owner/name`).
    ///
    /// An absent "latest" release means the repository has zero releases
    /// and yields `Ok(vec![])`. Output order is not guaranteed sorted;
    /// callers sort explicitly before selection.
    async fn fetch_releases(&self, repo: &str) -> MirrorResult<Vec<Release>>;
}

//! Release reconciliation: decide what should exist locally, download what
//! is missing, prune what is stale.

pub mod downloader;
pub mod local;
pub mod reconciler;
pub mod retention;

pub use downloader::DownloadEngine;
pub use reconciler::{sync_repository, SyncOutcome};

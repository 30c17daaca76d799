//! ghmirror — mirror GitHub repository releases to local storage.
//!
//! For each tracked repository the mirror fetches release metadata, selects
//! the subset that should exist locally (by recency and stability class),
//! downloads any missing assets and source archives, writes a release
//! summary file, and prunes local releases that have fallen outside the
//! retention window.

/// Core building blocks: errors, cancellation, pacing.
pub mod core;

pub use crate::core::{CancelToken, MirrorError, MirrorResult, Pacer};

/// Retention policy configuration.
pub mod config;

/// GitHub release listing.
pub mod github;

/// Reconciliation: retention selection, local state, downloads, pruning.
pub mod mirror;

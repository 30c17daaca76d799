//! Retention selection: which of the remote releases should exist locally.

use crate::config::{ReleaseFilter, RetentionPolicy};
use crate::github::Release;

/// Pick the subset of `releases` to keep locally under `policy`.
///
/// Prereleases are dropped for `StableOnly` policies; the rest are ordered
/// by creation time descending (ties broken by tag, descending, for
/// determinism) and truncated to `max_count`. An empty result means
/// "nothing to sync", not an error.
pub fn select(releases: Vec<Release>, policy: &RetentionPolicy) -> Vec<Release> {
    let mut kept: Vec<Release> = releases
        .into_iter()
        .filter(|r| policy.filter == ReleaseFilter::All || !r.prerelease)
        .collect();

    kept.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.tag.cmp(&a.tag))
    });
    kept.truncate(policy.max_count);
    kept
}

//! GitHub API type definitions.
//!
//! The raw wire shapes are validated once at the client boundary and turned
//! into the domain [`Release`]/[`Asset`] values used everywhere downstream.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// GitHub release as returned by the releases endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRelease {
    pub tag_name: String,
    pub name: Option<String>,
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub html_url: String,
    pub tarball_url: String,
    pub zipball_url: String,
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<RawAsset>,
}

/// GitHub release asset as returned by the releases endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
}

/// A named file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Unique within a release; used as the local file name.
    pub name: String,
    pub download_url: String,
    /// Remote-reported byte size; the sole validity check for an existing
    /// local file.
    pub size: u64,
}

/// A validated release record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Normalized tag, unique within one repository's release set. Also the
    /// local directory name.
    pub tag: String,
    pub assets: Vec<Asset>,
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    /// Display name; falls back to the tag when GitHub reports none.
    pub name: String,
    pub html_url: String,
    pub tarball_url: String,
    pub zipball_url: String,
    pub body: String,
}

/// Rewrite `/` to `_` in a tag. GitHub permits tags with slashes, which are
/// ambiguous as filesystem path segments downstream.
pub fn normalize_tag(tag: &str) -> String {
    tag.replace('/', "_")
}

impl From<RawRelease> for Release {
    fn from(raw: RawRelease) -> Self {
        let tag = normalize_tag(&raw.tag_name);
        Release {
            name: raw.name.filter(|n| !n.is_empty()).unwrap_or_else(|| tag.clone()),
            tag,
            assets: raw
                .assets
                .into_iter()
                .map(|a| Asset {
                    name: a.name,
                    download_url: a.browser_download_url,
                    size: a.size,
                })
                .collect(),
            prerelease: raw.prerelease,
            created_at: raw.created_at,
            published_at: raw.published_at,
            html_url: raw.html_url,
            tarball_url: raw.tarball_url,
            zipball_url: raw.zipball_url,
            body: raw.body.unwrap_or_default(),
        }
    }
}

/// Merge the "latest" release with a recent-release listing into one set.
///
/// The latest record stays present even when it falls outside the listing
/// window (it may be older than fifty prereleases). Duplicate normalized
/// tags collapse with the later record in fetch order winning. Output order
/// is not a contract; callers sort explicitly before selection.
pub fn merge_releases(latest: Option<RawRelease>, listing: Vec<RawRelease>) -> Vec<Release> {
    let mut merged: Vec<Release> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for raw in latest.into_iter().chain(listing) {
        let release = Release::from(raw);
        match index.get(&release.tag) {
            Some(&i) => merged[i] = release,
            None => {
                index.insert(release.tag.clone(), merged.len());
                merged.push(release);
            }
        }
    }

    merged
}

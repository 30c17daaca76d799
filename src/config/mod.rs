//! Retention policy configuration: one `{repo}, {count}, {type}` line per
//! mirrored repository, validated before any network activity.

use crate::core::{MirrorError, MirrorResult};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Which stability classes of releases a repository keeps locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseFilter {
    /// Keep stable releases and prereleases alike.
    All,
    /// Keep stable releases only.
    StableOnly,
}

impl FromStr for ReleaseFilter {
    type Err = MirrorError;

    fn from_str(s: &str) -> MirrorResult<Self> {
        match s {
            "all" => Ok(ReleaseFilter::All),
            "stable" => Ok(ReleaseFilter::StableOnly),
            other => Err(MirrorError::Config(format!(
                "Unknown release type `{}`. Use `all` or `stable`",
                other
            ))),
        }
    }
}

/// Per-repository retention policy. Read once from the config file and
/// immutable for the duration of that repository's reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// `owner/name` repository slug.
    pub repo: String,
    /// How many releases to keep locally.
    pub max_count: usize,
    /// Stability filter applied before retention selection.
    pub filter: ReleaseFilter,
}

/// Load retention policies from a line-oriented config file.
///
/// Each line is `{repo}, {count}, {type}` with `type` one of `all` or
/// `stable`. Blank lines and `#` comments are skipped. Any malformed line
/// is rejected with a descriptive error before network activity begins.
pub fn load_policies(path: &Path) -> MirrorResult<Vec<RetentionPolicy>> {
    let content = fs::read_to_string(path).map_err(|e| {
        MirrorError::Config(format!("Failed to read config {}: {}", path.display(), e))
    })?;

    let mut policies = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        policies.push(parse_line(line).map_err(|e| {
            MirrorError::Config(format!("{} line {}: {}", path.display(), lineno + 1, e))
        })?);
    }

    Ok(policies)
}

fn parse_line(line: &str) -> Result<RetentionPolicy, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(format!(
            "Expected `repo, count, type`, got {} field(s)",
            fields.len()
        ));
    }

    let repo = fields[0].trim_matches('/').to_string();
    if repo.is_empty() {
        return Err("Empty repository name".to_string());
    }

    let max_count: usize = fields[1]
        .parse()
        .map_err(|_| format!("Release count must be a number, `{}` given", fields[1]))?;
    if max_count == 0 {
        return Err(format!(
            "Release count for repo {} must be positive, `{}` given",
            repo, fields[1]
        ));
    }

    let filter = fields[2].parse().map_err(|e: MirrorError| e.to_string())?;

    Ok(RetentionPolicy {
        repo,
        max_count,
        filter,
    })
}

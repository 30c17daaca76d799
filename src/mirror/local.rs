//! Local state inspection: what already exists on disk for a repository.

use crate::core::MirrorResult;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path of the directory holding one repository's mirrored releases.
pub fn repo_dir(home: &Path, repo: &str) -> PathBuf {
    home.join(repo)
}

/// Path of one release's local directory.
pub fn release_dir(home: &Path, repo: &str, tag: &str) -> PathBuf {
    repo_dir(home, repo).join(tag)
}

/// List the release tags present locally for `repo`, creating the
/// repository directory if absent (a missing directory and "no local
/// releases" are equivalent states).
///
/// Presence is defined by the immediate subdirectory alone; contents are
/// never inspected, so an interrupted download that escaped cleanup still
/// counts as present. Dot-entries are skipped.
pub fn list_local(home: &Path, repo: &str) -> MirrorResult<BTreeSet<String>> {
    let dir = repo_dir(home, repo);
    fs::create_dir_all(&dir)?;

    let mut tags = BTreeSet::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        tags.insert(name);
    }

    debug!("{}: {} local release(s)", repo, tags.len());
    Ok(tags)
}

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::Config;
use crate::repo::RepoIndex;

/// Reserved hint that resolves to the tool's own demo content instead of the
/// scanned index (see `codelink demo`).
pub const DEMO_HINT: &str = "codelink";

/// Score used when a hint bears no resemblance to a root at all.
const NO_MATCH: usize = 1000;

/// Find a repository root containing `rel_path`.
///
/// An explicit root always wins when it contains the path. Otherwise the
/// index candidates are tried in order, reordered by name closeness when a
/// hint is given; the first root whose `root/rel_path` exists on disk is
/// returned. A folder-name mismatch against the hint is accepted best-effort
/// with a warning.
pub fn resolve(
    index: &mut RepoIndex,
    rel_path: &str,
    hint: Option<&str>,
    explicit_root: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(root) = explicit_root {
        if root.join(rel_path).exists() {
            return Some(root.to_path_buf());
        }
        // An explicit root that does not pan out falls back to autodetection.
    }

    if hint == Some(DEMO_HINT) {
        let dir = Config::dir().ok()?;
        return dir.join(rel_path).exists().then_some(dir);
    }

    let mut candidates = index.get().to_vec();
    if let Some(hint) = hint {
        // Stable sort: shortest-path-first order survives among equal scores.
        candidates.sort_by_key(|root| name_distance(root, hint));
    }

    for root in candidates {
        if root.join(rel_path).exists() {
            if let Some(hint) = hint {
                if !folder_name(&root).eq_ignore_ascii_case(hint) {
                    warn!("repo name {} does not match {}", hint, root.display());
                }
            }
            return Some(root);
        }
    }
    None
}

/// Closeness of a root to the requested project name. 0 is an exact folder
/// match; substring matches rank by length difference; a hint buried
/// somewhere in the full path ranks behind any folder match.
fn name_distance(root: &Path, hint: &str) -> usize {
    let folder = folder_name(root);
    if hint == folder {
        return 0;
    }
    let folder = folder.to_lowercase();
    let hint = hint.to_lowercase();
    if folder.contains(&hint) || hint.contains(&folder) {
        return 1 + folder.len().abs_diff(hint.len());
    }
    let full = root.to_string_lossy().to_lowercase();
    if full.contains(&hint) {
        return 1 + full.len();
    }
    NO_MATCH
}

fn folder_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

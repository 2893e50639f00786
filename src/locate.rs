use std::path::{Component, Path, PathBuf};

use crate::shell;

/// Find the first installed executable among `candidates`.
///
/// A candidate containing a path separator is treated as a concrete location:
/// `~` expands to the home directory, a single `*` per segment expands
/// against the directory entries (newest match first), and bundle paths under
/// `/Applications` are tried under `~/Applications` first. A bare name is
/// resolved against the augmented search path. Absence is an expected
/// outcome, not an error.
pub fn locate(candidates: &[String]) -> Option<PathBuf> {
    for candidate in candidates {
        if candidate.contains('/') {
            for path in expand_candidate(candidate) {
                if is_executable(&path) {
                    return Some(path);
                }
            }
        } else if let Ok(path) = which::which_in(
            candidate,
            Some(shell::augmented_path()),
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
        ) {
            return Some(path);
        }
    }
    None
}

/// All concrete paths a path-like candidate may denote, user-local variants
/// first.
fn expand_candidate(candidate: &str) -> Vec<PathBuf> {
    let mut patterns = Vec::new();
    let home = dirs::home_dir();

    if let Some(rest) = candidate.strip_prefix("~/") {
        if let Some(home) = &home {
            patterns.push(home.join(rest));
        }
    } else {
        if let (Some(rest), Some(home)) = (candidate.strip_prefix("/Applications/"), &home) {
            patterns.push(home.join("Applications").join(rest));
        }
        patterns.push(PathBuf::from(candidate));
    }

    patterns.iter().flat_map(|p| expand_wildcards(p)).collect()
}

/// Expand `*` wildcards segment by segment, e.g.
/// `/Applications/PyCharm*.app/Contents/MacOS/pycharm`. Matches within a
/// segment are ordered descending so the newest version wins.
fn expand_wildcards(pattern: &Path) -> Vec<PathBuf> {
    let mut bases = vec![PathBuf::new()];
    for component in pattern.components() {
        let segment = match component {
            Component::Normal(s) => s.to_string_lossy().into_owned(),
            other => {
                for base in &mut bases {
                    base.push(other.as_os_str());
                }
                continue;
            }
        };

        if !segment.contains('*') {
            for base in &mut bases {
                base.push(&segment);
            }
            continue;
        }

        let mut expanded = Vec::new();
        for base in &bases {
            let Ok(entries) = std::fs::read_dir(base) else { continue };
            let mut names: Vec<String> = entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| wildcard_match(&segment, name))
                .collect();
            names.sort();
            names.reverse();
            for name in names {
                expanded.push(base.join(name));
            }
        }
        bases = expanded;
        if bases.is_empty() {
            break;
        }
    }
    bases
}

/// Match `name` against a pattern holding at most one `*`.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => pattern == name,
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

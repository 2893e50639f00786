mod resolver;

pub use resolver::{resolve, DEMO_HINT};

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Cache of known repository roots under a scan root (typically the home
/// directory). Owned by the caller and passed into each resolution, so tests
/// can point it at a fixture tree.
pub struct RepoIndex {
    scan_root: PathBuf,
    roots: Option<Vec<PathBuf>>,
    fresh: bool,
}

impl RepoIndex {
    pub fn new(scan_root: impl Into<PathBuf>) -> Self {
        Self {
            scan_root: scan_root.into(),
            roots: None,
            fresh: false,
        }
    }

    /// Build an index from a pre-seeded root list (e.g. persisted
    /// configuration). A seeded cache is not considered fresh, so a failed
    /// resolution still triggers one rescan.
    pub fn seeded(scan_root: impl Into<PathBuf>, roots: Vec<PathBuf>) -> Self {
        Self {
            scan_root: scan_root.into(),
            roots: Some(roots),
            fresh: false,
        }
    }

    /// The cached roots, scanning on first use.
    pub fn get(&mut self) -> &[PathBuf] {
        if self.roots.is_none() {
            self.refresh();
        }
        self.roots.as_deref().unwrap_or(&[])
    }

    /// Rescan and replace the cache wholesale; callers never observe a
    /// partially built list.
    pub fn refresh(&mut self) {
        let roots = scan(&self.scan_root);
        debug!("indexed {} repositories under {}", roots.len(), self.scan_root.display());
        self.roots = Some(roots);
        self.fresh = true;
    }

    /// Whether the cache was built by a scan in this process. Seeded or
    /// never-built caches report false.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }
}

/// Walk `scan_root` and collect every directory with a VCS metadata directory
/// as a direct child. Hidden directories are pruned entirely; matched roots
/// are still descended so nested repositories are found too. The result is
/// sorted shortest-path-first: shorter paths are more likely the intended
/// top-level project when several roots contain the same file.
fn scan(scan_root: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    let walker = WalkDir::new(scan_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        // Unreadable directories are skipped, not fatal.
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if dir.join(".git").exists() || dir.join(".hg").exists() {
            debug!("repository {}", dir.display());
            roots.push(dir.to_path_buf());
        }
    }

    roots.sort_by_key(|p| p.as_os_str().len());
    roots
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn mkrepo(base: &Path, rel: &str) -> PathBuf {
        let dir = base.join(rel);
        fs::create_dir_all(dir.join(".git")).unwrap();
        dir
    }

    #[test]
    fn test_scan_finds_repos() {
        let tmp = tempfile::tempdir().unwrap();
        let a = mkrepo(tmp.path(), "work/alpha");
        let b = mkrepo(tmp.path(), "beta");
        fs::create_dir_all(tmp.path().join("plain/dir")).unwrap();

        let mut index = RepoIndex::new(tmp.path());
        let roots = index.get().to_vec();
        assert!(roots.contains(&a));
        assert!(roots.contains(&b));
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_scan_skips_hidden_directories() {
        let tmp = tempfile::tempdir().unwrap();
        mkrepo(tmp.path(), ".cache/secret");

        let mut index = RepoIndex::new(tmp.path());
        assert!(index.get().is_empty());
    }

    #[test]
    fn test_scan_finds_nested_repos() {
        let tmp = tempfile::tempdir().unwrap();
        let outer = mkrepo(tmp.path(), "outer");
        let inner = mkrepo(tmp.path(), "outer/vendor/inner");

        let mut index = RepoIndex::new(tmp.path());
        let roots = index.get().to_vec();
        assert!(roots.contains(&outer));
        assert!(roots.contains(&inner));
    }

    #[test]
    fn test_scan_sorts_shortest_first() {
        let tmp = tempfile::tempdir().unwrap();
        mkrepo(tmp.path(), "deep/nested/project");
        mkrepo(tmp.path(), "top");

        let mut index = RepoIndex::new(tmp.path());
        let roots = index.get();
        assert!(roots[0].ends_with("top"));
    }

    #[test]
    fn test_seeded_index_is_not_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = mkrepo(tmp.path(), "proj");

        let index = RepoIndex::seeded(tmp.path(), vec![repo.clone()]);
        assert!(!index.is_fresh());

        let mut index = index;
        assert_eq!(index.get(), [repo]);
        // get() on a seeded cache must not rescan.
        assert!(!index.is_fresh());
    }

    #[test]
    fn test_refresh_picks_up_new_repos() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = RepoIndex::new(tmp.path());
        assert!(index.get().is_empty());
        assert!(index.is_fresh());

        let repo = mkrepo(tmp.path(), "late");
        index.refresh();
        assert_eq!(index.get(), [repo]);
    }

    #[test]
    #[cfg(unix)]
    fn test_scan_tolerates_unreadable_directories() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let repo = mkrepo(tmp.path(), "readable");
        let locked = tmp.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let mut index = RepoIndex::new(tmp.path());
        let roots = index.get().to_vec();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(roots, [repo]);
    }

    #[test]
    fn test_mercurial_marker() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("hgproj/.hg")).unwrap();

        let mut index = RepoIndex::new(tmp.path());
        assert_eq!(index.get().len(), 1);
    }
}

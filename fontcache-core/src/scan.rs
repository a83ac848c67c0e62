//! Font directory scanning (made by FontLab https://www.fontlab.com/)

use std::path::Path;
use std::time::SystemTime;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Recursion limit below each root; bounds loops through mounts.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Whether a walk should report font files or only compute timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Visit nothing, just find the newest modification time.
    TimestampsOnly,
    /// Hand every candidate font file to the visitor.
    Full,
}

/// Depth-first walker over a font directory tree.
///
/// Entries whose name starts with `.` are skipped together with their
/// subtrees. Symlinks are never followed, so a symlinked directory is
/// neither recursed into nor offered as a font.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    max_depth: usize,
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Walk `root`, returning the newest modification time seen anywhere in
    /// the tree (the root included). In [`ScanMode::Full`] every regular file
    /// with a font extension is passed to `visit`.
    ///
    /// Unreadable directories and entries are skipped, never fatal.
    pub fn scan<F>(&self, root: &Path, mode: ScanMode, mut visit: F) -> Option<SystemTime>
    where
        F: FnMut(&Path),
    {
        let mut newest: Option<SystemTime> = None;
        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(root = %root.display(), "skipping unreadable entry: {err}");
                    continue;
                }
            };

            if let Some(mtime) = entry.metadata().ok().and_then(|m| m.modified().ok()) {
                newest = newest.max(Some(mtime));
            }

            if mode == ScanMode::Full && entry.file_type().is_file() && is_font(entry.path()) {
                visit(entry.path());
            }
        }

        newest
    }

    /// Timestamp-only walk used for cache validation.
    pub fn newest_mtime(&self, root: &Path) -> Option<SystemTime> {
        self.scan(root, ScanMode::TimestampsOnly, |_| {})
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().first() == Some(&b'.')
}

/// Extensions are matched case-sensitively, as platform font directories use them.
pub fn is_font(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext,
        None => return false,
    };

    matches!(ext, "otc" | "otf" | "ttc" | "ttf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn collect(root: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        DirectoryScanner::new().scan(root, ScanMode::Full, |p| found.push(p.to_path_buf()));
        found.sort();
        found
    }

    #[test]
    fn recognises_font_extensions() {
        assert!(is_font("/A/B/font.ttf".as_ref()));
        assert!(is_font("/A/B/font.otc".as_ref()));
        assert!(!is_font("/A/B/font.OTF".as_ref()));
        assert!(!is_font("/A/B/font.woff2".as_ref()));
        assert!(!is_font("/A/B/font".as_ref()));
    }

    #[test]
    fn discovers_nested_fonts() {
        let tmp = tempdir().expect("tempdir");
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).expect("mkdir");
        let font_path = nested.join("sample.ttf");
        fs::write(&font_path, b"").expect("touch font");

        assert_eq!(collect(tmp.path()), vec![font_path]);
    }

    #[test]
    fn skips_hidden_files_and_directories() {
        let tmp = tempdir().expect("tempdir");
        let hidden_dir = tmp.path().join(".private");
        fs::create_dir_all(&hidden_dir).expect("mkdir");
        fs::write(hidden_dir.join("inside.ttf"), b"").expect("touch");
        fs::write(tmp.path().join(".dotted.otf"), b"").expect("touch");
        fs::write(tmp.path().join("visible.otf"), b"").expect("touch");

        assert_eq!(collect(tmp.path()), vec![tmp.path().join("visible.otf")]);
    }

    #[test]
    fn respects_depth_limit() {
        let tmp = tempdir().expect("tempdir");
        let deep = tmp.path().join("1/2/3");
        fs::create_dir_all(&deep).expect("mkdir");
        fs::write(deep.join("deep.ttf"), b"").expect("touch");
        fs::write(tmp.path().join("1/shallow.ttf"), b"").expect("touch");

        let mut found = Vec::new();
        DirectoryScanner::new()
            .max_depth(2)
            .scan(tmp.path(), ScanMode::Full, |p| found.push(p.to_path_buf()));

        assert_eq!(found, vec![tmp.path().join("1/shallow.ttf")]);
    }

    #[test]
    fn timestamp_mode_visits_nothing() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("a.ttf"), b"").expect("touch");

        let mut visited = 0;
        let newest =
            DirectoryScanner::new().scan(tmp.path(), ScanMode::TimestampsOnly, |_| visited += 1);

        assert_eq!(visited, 0);
        assert!(newest.is_some());
    }

    #[test]
    fn newest_mtime_tracks_latest_file() {
        let tmp = tempdir().expect("tempdir");
        let old = tmp.path().join("old.ttf");
        let new = tmp.path().join("new.ttf");
        fs::write(&old, b"").expect("touch");
        fs::write(&new, b"").expect("touch");

        let base = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        let later = base + std::time::Duration::from_secs(3600);
        let set = |path: &Path, when: SystemTime| {
            fs::File::options()
                .write(true)
                .open(path)
                .and_then(|f| f.set_modified(when))
                .expect("set mtime");
        };
        set(&old, base);
        set(&new, later);
        fs::File::open(tmp.path())
            .and_then(|f| f.set_modified(base))
            .ok();

        let newest = DirectoryScanner::new().newest_mtime(tmp.path());
        assert_eq!(newest, Some(later));
    }

    #[test]
    fn missing_root_yields_nothing() {
        let newest = DirectoryScanner::new().newest_mtime(Path::new("/nonexistent/fontcache"));
        assert_eq!(newest, None);
    }

    #[cfg(unix)]
    #[test]
    fn does_not_follow_symlinked_directories() {
        use std::os::unix::fs::symlink;

        let tmp = tempdir().expect("tempdir");
        let outside = tempdir().expect("tempdir");
        fs::write(outside.path().join("linked.otf"), b"").expect("touch font");
        symlink(outside.path(), tmp.path().join("link")).expect("symlink");

        assert!(collect(tmp.path()).is_empty());
    }
}

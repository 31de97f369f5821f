//! Recursive walk over a routes directory.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::error::ScanError;
use super::naming::{EntryKind, NamingDecision, NamingFilter};

/// One included file or directory found under the routes root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    absolute_path: PathBuf,
    relative_segments: Vec<String>,
    is_directory: bool,
}

impl RouteEntry {
    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    /// Names from the routes root down to and including this entry.
    pub fn relative_segments(&self) -> &[String] {
        &self.relative_segments
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// The entry's key in a [`Manifest`](super::Manifest): its relative
    /// segments joined with `/`, e.g. `user/index.rs`.
    pub fn manifest_key(&self) -> String {
        self.relative_segments.join("/")
    }

    pub fn name(&self) -> &str {
        self.relative_segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Walks a routes root and yields the entries the [`NamingFilter`] includes.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    filter: NamingFilter,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, filter: NamingFilter) -> Self {
        Self {
            root: root.into(),
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a fresh walk reflecting the filesystem as it is now.
    ///
    /// The walk is depth-first and pre-order, visiting the entries of each
    /// directory sorted by file name. Excluded directories are not entered.
    /// Symbolic links are followed. The first unreadable entry ends the walk
    /// with a [`ScanError`].
    pub fn scan(&self) -> Scan {
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        Scan {
            root: self.root.clone(),
            filter: self.filter.clone(),
            walker,
            failed: false,
        }
    }
}

/// Lazy iterator returned by [`Scanner::scan`].
pub struct Scan {
    root: PathBuf,
    filter: NamingFilter,
    walker: walkdir::IntoIter,
    failed: bool,
}

impl Iterator for Scan {
    type Item = Result<RouteEntry, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(ScanError::new(&self.root, err)));
                }
            };

            let is_directory = entry.file_type().is_dir();
            let kind = if is_directory {
                EntryKind::Directory
            } else {
                EntryKind::File
            };

            let decision = match entry.file_name().to_str() {
                Some(name) => self.filter.decide(name, kind),
                None => NamingDecision::Excluded(super::naming::Exclusion::NonUtf8),
            };

            if let NamingDecision::Excluded(reason) = decision {
                debug!(path = %entry.path().display(), ?reason, "skipping route entry");
                if is_directory {
                    self.walker.skip_current_dir();
                }
                continue;
            }

            let Some(relative_segments) = relative_segments(&self.root, entry.path()) else {
                continue;
            };

            return Some(Ok(RouteEntry {
                absolute_path: absolute(entry.path()),
                relative_segments,
                is_directory,
            }));
        }
    }
}

fn relative_segments(root: &Path, path: &Path) -> Option<Vec<String>> {
    path.strip_prefix(root)
        .ok()?
        .components()
        .map(|component| component.as_os_str().to_str().map(str::to_string))
        .collect()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn scan_keys(root: &Path) -> Vec<(String, bool)> {
        Scanner::new(root, NamingFilter::new())
            .scan()
            .map(|entry| {
                let entry = entry.unwrap();
                (entry.manifest_key(), entry.is_directory())
            })
            .collect()
    }

    #[test]
    fn test_scan_is_sorted_and_depth_first() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "user/index.rs");
        touch(dir.path(), "user/me.rs");
        touch(dir.path(), "index.rs");
        touch(dir.path(), "admin.rs");

        assert_eq!(
            scan_keys(dir.path()),
            vec![
                ("admin.rs".to_string(), false),
                ("index.rs".to_string(), false),
                ("user".to_string(), true),
                ("user/index.rs".to_string(), false),
                ("user/me.rs".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_scan_applies_naming_filter() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "user/user.controller.rs");
        touch(dir.path(), "user/_draft.rs");
        touch(dir.path(), "user/notes.md");
        touch(dir.path(), "user/user_router1.rs");

        assert_eq!(
            scan_keys(dir.path()),
            vec![
                ("user".to_string(), true),
                ("user/user_router1.rs".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_scan_skips_private_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "_shared/helpers.rs");
        touch(dir.path(), "@generated/index.rs");
        touch(dir.path(), "health.rs");

        assert_eq!(scan_keys(dir.path()), vec![("health.rs".to_string(), false)]);
    }

    #[test]
    fn test_entries_carry_absolute_paths() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "user/index.rs");

        let entries: Vec<RouteEntry> = Scanner::new(dir.path(), NamingFilter::new())
            .scan()
            .collect::<Result<_, _>>()
            .unwrap();

        let file = &entries[1];
        assert!(file.absolute_path().is_absolute());
        assert!(file.absolute_path().ends_with("user/index.rs"));
        assert_eq!(file.relative_segments(), ["user", "index.rs"]);
        assert_eq!(file.name(), "index.rs");
    }

    #[test]
    fn test_scan_is_restartable_by_rescanning() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.rs");
        let scanner = Scanner::new(dir.path(), NamingFilter::new());

        assert_eq!(scanner.scan().count(), 1);
        touch(dir.path(), "b.rs");
        assert_eq!(scanner.scan().count(), 2);
    }

    #[test]
    fn test_missing_root_is_a_scan_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("routes");

        let mut scan = Scanner::new(&missing, NamingFilter::new()).scan();
        let err = scan.next().unwrap().unwrap_err();
        assert_eq!(err.path(), missing.as_path());
        assert!(scan.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_link_is_a_scan_error() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.rs");
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("orders")).unwrap();

        let results: Vec<_> = Scanner::new(dir.path(), NamingFilter::new()).scan().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(err.path().ends_with("orders"));
    }
}

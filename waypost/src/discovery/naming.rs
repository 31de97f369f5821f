//! File naming conventions for route modules.
//!
//! A route directory mixes mountable route modules with the supporting code
//! they use (controllers, services, DTOs and so on). The [`NamingFilter`]
//! tells them apart by name alone, so it never touches the filesystem.

use std::path::Path;

/// Leading characters that mark a file or directory as private.
pub const EXCLUDED_PREFIXES: [char; 2] = ['_', '@'];

/// Stem suffixes of supporting modules that are never mounted.
pub const EXCLUDED_SUFFIXES: [&str; 7] = [
    ".controller",
    ".service",
    ".spec",
    ".dto",
    ".middleware",
    ".error",
    ".decorator",
];

/// Source extensions recognized when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 1] = ["rs"];

/// Whether a scanned entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// The rule that excluded an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Name starts with `_` or `@`.
    Prefix(char),
    /// File stem ends with a supporting-module suffix such as `.controller`.
    Suffix(&'static str),
    /// File does not carry a recognized source extension.
    Extension,
    /// Name is not valid UTF-8 and cannot become a URL segment.
    NonUtf8,
}

/// Outcome of applying the [`NamingFilter`] to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingDecision {
    Included,
    Excluded(Exclusion),
}

impl NamingDecision {
    pub fn is_included(self) -> bool {
        matches!(self, NamingDecision::Included)
    }
}

/// Decides which directory entries are route modules.
///
/// Directories are only subject to the prefix rule; files additionally need a
/// recognized extension and must not end in a supporting-module suffix.
///
/// # Examples
///
/// ```
/// use waypost::discovery::{EntryKind, NamingFilter};
///
/// let filter = NamingFilter::new();
/// assert!(filter.includes("user_router1.rs", EntryKind::File));
/// assert!(!filter.includes("user.controller.rs", EntryKind::File));
/// assert!(!filter.includes("_draft.rs", EntryKind::File));
/// assert!(filter.includes("user", EntryKind::Directory));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingFilter {
    extensions: Vec<String>,
}

impl NamingFilter {
    /// Creates a filter recognizing `.rs` route modules.
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS)
    }

    /// Creates a filter recognizing the given extensions (without the dot).
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(Into::into)
                .map(|ext: String| ext.trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Returns the recognized extensions.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Applies every rule to `name`.
    pub fn decide(&self, name: &str, kind: EntryKind) -> NamingDecision {
        if let Some(prefix) = name.chars().next().filter(|c| EXCLUDED_PREFIXES.contains(c)) {
            return NamingDecision::Excluded(Exclusion::Prefix(prefix));
        }

        if kind == EntryKind::Directory {
            return NamingDecision::Included;
        }

        let path = Path::new(name);
        let recognized = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext));
        if !recognized {
            return NamingDecision::Excluded(Exclusion::Extension);
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
        match EXCLUDED_SUFFIXES
            .iter()
            .copied()
            .find(|suffix| stem.ends_with(*suffix))
        {
            Some(suffix) => NamingDecision::Excluded(Exclusion::Suffix(suffix)),
            None => NamingDecision::Included,
        }
    }

    /// Shorthand for `decide(name, kind).is_included()`.
    pub fn includes(&self, name: &str, kind: EntryKind) -> bool {
        self.decide(name, kind).is_included()
    }
}

impl Default for NamingFilter {
    fn default() -> Self {
        Self::new()
    }
}

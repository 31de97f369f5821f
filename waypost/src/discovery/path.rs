//! Mount path derivation.

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Stems that mount at their parent directory's path.
pub const DEFAULT_INDEX_NAMES: [&str; 2] = ["index", "mod"];

/// The URL segments at which a router is mounted.
///
/// An empty path is the root mount. Displays as a URL pattern: `/` for the
/// root, `/user/profile` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MountPath(Vec<String>);

impl MountPath {
    /// The root mount path, `[]`.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the path as a router prefix, e.g. `/user/profile`.
    pub fn to_pattern(&self) -> String {
        if self.0.is_empty() {
            return "/".to_string();
        }
        self.0.iter().fold(String::new(), |mut pattern, segment| {
            pattern.push('/');
            pattern.push_str(segment);
            pattern
        })
    }
}

impl fmt::Display for MountPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pattern())
    }
}

/// Maps a route module's position under the routes root to its [`MountPath`].
///
/// # Examples
///
/// ```
/// use waypost::discovery::PathDeriver;
///
/// let deriver = PathDeriver::new();
/// assert!(deriver.derive(&["index.rs"]).is_root());
/// assert_eq!(deriver.derive(&["user", "index.rs"]).to_pattern(), "/user");
/// assert_eq!(
///     deriver.derive(&["user", "user_router1.rs"]).to_pattern(),
///     "/user/user_router1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDeriver {
    index_names: Vec<String>,
}

impl PathDeriver {
    /// Creates a deriver treating `index` and `mod` files as directory indexes.
    pub fn new() -> Self {
        Self::with_index_names(DEFAULT_INDEX_NAMES)
    }

    pub fn with_index_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index_names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    /// Derives the mount path of a file from its segments relative to the
    /// routes root.
    ///
    /// The final segment loses its extension and is dropped entirely when
    /// its stem is an index name. Directory segments are kept verbatim.
    pub fn derive<S: AsRef<str>>(&self, relative_segments: &[S]) -> MountPath {
        let Some((file, dirs)) = relative_segments.split_last() else {
            return MountPath::root();
        };

        let mut segments: Vec<String> = dirs.iter().map(|s| s.as_ref().to_string()).collect();

        let file = file.as_ref();
        let stem = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file);

        if !self.is_index(stem) {
            segments.push(stem.to_string());
        }

        MountPath(segments)
    }

    fn is_index(&self, stem: &str) -> bool {
        self.index_names.iter().any(|name| name == stem)
    }
}

impl Default for PathDeriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_index_is_root() {
        let deriver = PathDeriver::new();
        let path = deriver.derive(&["index.rs"]);
        assert!(path.is_root());
        assert_eq!(path.to_pattern(), "/");
    }

    #[test]
    fn test_nested_index_mounts_at_directory() {
        let deriver = PathDeriver::new();
        assert_eq!(
            deriver.derive(&["user", "index.rs"]),
            MountPath::from_segments(["user"])
        );
    }

    #[test]
    fn test_plain_file_contributes_stem() {
        let deriver = PathDeriver::new();
        assert_eq!(
            deriver.derive(&["user", "user_router1.rs"]),
            MountPath::from_segments(["user", "user_router1"])
        );
    }

    #[test]
    fn test_mod_file_is_an_index() {
        let deriver = PathDeriver::new();
        assert_eq!(
            deriver.derive(&["admin", "mod.rs"]),
            MountPath::from_segments(["admin"])
        );
    }

    #[test]
    fn test_custom_index_names() {
        let deriver = PathDeriver::with_index_names(["index"]);
        assert_eq!(
            deriver.derive(&["admin", "mod.rs"]),
            MountPath::from_segments(["admin", "mod"])
        );
    }

    #[test]
    fn test_only_final_extension_is_dropped() {
        let deriver = PathDeriver::new();
        assert_eq!(
            deriver.derive(&["api", "v1.2", "report.v2.rs"]),
            MountPath::from_segments(["api", "v1.2", "report.v2"])
        );
    }

    #[test]
    fn test_case_is_preserved() {
        let deriver = PathDeriver::new();
        assert_eq!(
            deriver.derive(&["Users", "GetAll.rs"]).to_pattern(),
            "/Users/GetAll"
        );
    }

    #[test]
    fn test_empty_segments_are_root() {
        let deriver = PathDeriver::new();
        let empty: [&str; 0] = [];
        assert!(deriver.derive(&empty).is_root());
    }

    #[test]
    fn test_display_matches_pattern() {
        let path = MountPath::from_segments(["product", "order"]);
        assert_eq!(path.to_string(), "/product/order");
        assert_eq!(MountPath::root().to_string(), "/");
    }

    #[test]
    fn test_serializes_as_segment_list() {
        let path = MountPath::from_segments(["user", "me"]);
        assert_eq!(serde_json::to_string(&path).unwrap(), r#"["user","me"]"#);
    }
}

//! Errors that abort a composition pass.
//!
//! Every variant is fatal: a pass either returns a complete router or one of
//! these, never a partially mounted tree.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::path::MountPath;

/// A directory or entry under the routes root could not be read.
#[derive(Debug, Error)]
#[error("cannot scan route directory `{}`: {source}", .path.display())]
pub struct ScanError {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
}

impl ScanError {
    pub(crate) fn new(root: &Path, source: walkdir::Error) -> Self {
        let path = source
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        Self { path, source }
    }

    /// The path that could not be read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Why a route module produced no usable router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    /// Nothing is registered in the manifest under the module's source key.
    Unregistered,
    /// The module's export is some value other than a router.
    NotRoutable,
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailure::Unregistered => f.write_str("no export is registered for it"),
            LoadFailure::NotRoutable => f.write_str("its export is not a router"),
        }
    }
}

/// An included route module could not be resolved to a router.
#[derive(Debug, Error)]
#[error("cannot load route module `{}`: {reason}", .path.display())]
pub struct LoadError {
    path: PathBuf,
    reason: LoadFailure,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, reason: LoadFailure) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    /// Absolute path of the offending module.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn reason(&self) -> LoadFailure {
        self.reason
    }
}

/// Two route modules derive the same mount path.
#[derive(Debug, Error)]
#[error(
    "mount path `{path}` is claimed by both `{}` and `{}`",
    .first.display(),
    .second.display()
)]
pub struct CollisionError {
    path: MountPath,
    first: PathBuf,
    second: PathBuf,
}

impl CollisionError {
    pub(crate) fn new(path: MountPath, first: PathBuf, second: PathBuf) -> Self {
        Self {
            path,
            first,
            second,
        }
    }

    pub fn path(&self) -> &MountPath {
        &self.path
    }

    /// The module that claimed the path first, in scan order.
    pub fn first(&self) -> &Path {
        &self.first
    }

    /// The module that tried to claim it again.
    pub fn second(&self) -> &Path {
        &self.second
    }
}

/// Any failure of a composition pass.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Collision(#[from] CollisionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::new("/srv/routes/user.rs", LoadFailure::NotRoutable);
        assert_eq!(
            err.to_string(),
            "cannot load route module `/srv/routes/user.rs`: its export is not a router"
        );
        assert_eq!(err.reason(), LoadFailure::NotRoutable);
    }

    #[test]
    fn test_unregistered_display() {
        let err = LoadError::new("/srv/routes/admin.rs", LoadFailure::Unregistered);
        assert!(err.to_string().contains("no export is registered"));
    }

    #[test]
    fn test_collision_error_names_both_sources() {
        let err = CollisionError::new(
            MountPath::from_segments(["product", "order"]),
            PathBuf::from("/srv/routes/product/order"),
            PathBuf::from("/srv/routes/product/order.rs"),
        );
        let message = err.to_string();
        assert!(message.contains("/product/order"));
        assert!(message.contains("/srv/routes/product/order`"));
        assert!(message.contains("/srv/routes/product/order.rs"));
    }

    #[test]
    fn test_discovery_error_is_transparent() {
        let err: DiscoveryError =
            LoadError::new("/srv/routes/user.rs", LoadFailure::Unregistered).into();
        assert!(matches!(err, DiscoveryError::Load(_)));
        assert!(err.to_string().starts_with("cannot load route module"));
    }
}

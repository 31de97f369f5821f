//! Convention-based router discovery.
//!
//! A composition pass walks a routes directory, keeps the files that follow
//! the route module naming convention, derives a mount path from each file's
//! position and mounts its router there:
//!
//! ```text
//! routes/
//! ├── index.rs              → /
//! ├── health.rs             → /health
//! ├── _draft.rs             (private, skipped)
//! └── user/
//!     ├── index.rs          → /user
//!     ├── me.rs             → /user/me
//!     └── user.service.rs   (supporting code, skipped)
//! ```
//!
//! Directories whose names start with `_` or `@` are private too and are
//! never entered, so nothing below them is mounted.
//!
//! Each pass either produces a complete [`Router`] or fails with a
//! [`DiscoveryError`]. A failed pass never publishes a partial tree.
//!
//! ```ignore
//! use waypost::discovery::{Discovery, Manifest};
//!
//! let manifest = Manifest::collected();
//! let router = Discovery::new("src/routes").compose(&manifest)?.into_router();
//! ```

pub mod codegen;
mod compose;
mod error;
mod loader;
mod naming;
mod path;
pub mod reload;
mod scanner;

pub use compose::{Composer, Mount, MountNode, MountTree};
pub use error::{CollisionError, DiscoveryError, LoadError, LoadFailure, ScanError};
pub use loader::{ExportValue, LoadedModule, Manifest, ManifestLoader, ModuleLoader, RouteModule};
pub use naming::{DEFAULT_EXTENSIONS, EntryKind, Exclusion, NamingDecision, NamingFilter};
pub use path::{DEFAULT_INDEX_NAMES, MountPath, PathDeriver};
pub use reload::{Generation, Reloader, RouterHandle};
pub use scanner::{RouteEntry, Scan, Scanner};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::router::Router;

/// A route module found by [`Discovery::plan`], with the path it would mount at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMount {
    pub path: MountPath,
    pub entry: RouteEntry,
}

/// Configuration of a composition pass over one routes directory.
#[derive(Debug, Clone)]
pub struct Discovery {
    root: PathBuf,
    filter: NamingFilter,
    deriver: PathDeriver,
}

impl Discovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: NamingFilter::new(),
            deriver: PathDeriver::new(),
        }
    }

    pub fn filter(mut self, filter: NamingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn deriver(mut self, deriver: PathDeriver) -> Self {
        self.deriver = deriver;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scanner(&self) -> Scanner {
        Scanner::new(&self.root, self.filter.clone())
    }

    /// Scans and derives mount paths without loading any module.
    ///
    /// Fails on the same scan errors and collisions a full pass would.
    pub fn plan(&self) -> Result<Vec<PlannedMount>, DiscoveryError> {
        let mut claimed: HashMap<MountPath, PathBuf> = HashMap::new();
        let mut planned = Vec::new();

        for entry in self.scanner().scan() {
            let entry = entry?;
            if entry.is_directory() {
                continue;
            }

            let path = self.deriver.derive(entry.relative_segments());
            if let Some(first) = claimed.get(&path) {
                return Err(CollisionError::new(
                    path,
                    first.clone(),
                    entry.absolute_path().to_path_buf(),
                )
                .into());
            }

            claimed.insert(path.clone(), entry.absolute_path().to_path_buf());
            planned.push(PlannedMount { path, entry });
        }

        Ok(planned)
    }

    /// Runs a full composition pass, resolving modules through `manifest`.
    pub fn compose(&self, manifest: &Manifest) -> Result<MountTree, DiscoveryError> {
        self.compose_with(&mut ManifestLoader::new(manifest))
    }

    /// Runs a full composition pass with a custom loader.
    pub fn compose_with<L: ModuleLoader>(&self, loader: &mut L) -> Result<MountTree, DiscoveryError> {
        let started = Instant::now();
        let mut composer = Composer::new();

        for entry in self.scanner().scan() {
            let entry = entry?;
            if entry.is_directory() {
                continue;
            }

            let path = self.deriver.derive(entry.relative_segments());
            if let Some(first) = composer.claimed_by(&path) {
                return Err(CollisionError::new(
                    path,
                    first.to_path_buf(),
                    entry.absolute_path().to_path_buf(),
                )
                .into());
            }

            let module = loader.load(&entry)?;
            debug!(path = %path, source = %entry.manifest_key(), "mounting route module");
            composer.attach(path, module)?;
        }

        let tree = composer.finish();
        info!(
            root = %self.root.display(),
            mounts = tree.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "route discovery complete"
        );
        Ok(tree)
    }
}

/// Composes every route module under `root` into one router.
pub fn discover(root: impl Into<PathBuf>, manifest: &Manifest) -> Result<Router, DiscoveryError> {
    Ok(Discovery::new(root).compose(manifest)?.into_router())
}

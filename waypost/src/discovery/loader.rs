//! Resolving route modules to routers.
//!
//! Rust cannot load source files at runtime, so route modules are resolved
//! through a [`Manifest`]: a static registry from a module's source key
//! (`user/index.rs`) to the function that builds its export. Manifests are
//! assembled by hand, generated at build time with
//! [`codegen`](super::codegen), or collected from every
//! [`route_module!`](crate::route_module) in the binary.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{LoadError, LoadFailure};
use super::scanner::RouteEntry;
use crate::router::Router;

/// A type-erased route module export.
pub type ExportValue = Box<dyn Any + Send>;

type ExportFn = Arc<dyn Fn() -> ExportValue + Send + Sync>;

/// A route module registered at link time with [`route_module!`](crate::route_module).
pub struct RouteModule {
    source: &'static str,
    export: fn() -> ExportValue,
}

impl RouteModule {
    pub const fn new(source: &'static str, export: fn() -> ExportValue) -> Self {
        Self { source, export }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }
}

inventory::collect!(RouteModule);

/// Registers a route module's export so [`Manifest::collected`] can find it.
///
/// The first argument is the module's path relative to the routes root, the
/// second a function returning its router.
///
/// ```ignore
/// use waypost::prelude::*;
///
/// fn router() -> Router {
///     Router::new().get("/", |_, _, _| async { "users" })
/// }
///
/// waypost::route_module!("user/index.rs", router);
/// ```
#[macro_export]
macro_rules! route_module {
    ($source:expr, $export:expr) => {
        const _: () = {
            fn __waypost_export() -> $crate::discovery::ExportValue {
                ::std::boxed::Box::new(($export)())
            }

            $crate::inventory::submit! {
                $crate::discovery::RouteModule::new($source, __waypost_export)
            }
        };
    };
}

/// Static registry of route module exports keyed by source path.
#[derive(Clone, Default)]
pub struct Manifest {
    exports: BTreeMap<String, ExportFn>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every module registered with [`route_module!`](crate::route_module).
    pub fn collected() -> Self {
        let mut manifest = Self::new();
        for module in inventory::iter::<RouteModule> {
            let export = module.export;
            manifest.insert(module.source, Arc::new(export));
        }
        manifest
    }

    /// Registers the export of the module at `source`.
    ///
    /// `source` is relative to the routes root and uses `/` separators.
    /// Registering the same source twice replaces the earlier export.
    pub fn register<F, T>(&mut self, source: &str, export: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Any + Send,
    {
        self.insert(source, Arc::new(move || Box::new(export()) as ExportValue));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F, T>(mut self, source: &str, export: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Any + Send,
    {
        self.register(source, export);
        self
    }

    fn insert(&mut self, source: &str, export: ExportFn) {
        let key = source.trim_start_matches("./").replace('\\', "/");
        self.exports.insert(key, export);
    }

    pub fn contains(&self, source: &str) -> bool {
        self.exports.contains_key(source)
    }

    /// Registered source keys in sorted order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    fn export(&self, source: &str) -> Option<&ExportFn> {
        self.exports.get(source)
    }
}

impl fmt::Debug for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manifest")
            .field("sources", &self.exports.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A route module resolved to its router.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    source_path: PathBuf,
    router: Router,
}

impl LoadedModule {
    pub fn new(source_path: impl Into<PathBuf>, router: Router) -> Self {
        Self {
            source_path: source_path.into(),
            router,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Resolves included route entries to routers.
pub trait ModuleLoader {
    fn load(&mut self, entry: &RouteEntry) -> Result<LoadedModule, LoadError>;
}

/// [`ModuleLoader`] backed by a [`Manifest`].
///
/// Loads are cached by absolute path, so one loader never runs a module's
/// export twice. Use a fresh loader for every composition pass.
pub struct ManifestLoader<'m> {
    manifest: &'m Manifest,
    cache: HashMap<PathBuf, Router>,
}

impl<'m> ManifestLoader<'m> {
    pub fn new(manifest: &'m Manifest) -> Self {
        Self {
            manifest,
            cache: HashMap::new(),
        }
    }
}

impl ModuleLoader for ManifestLoader<'_> {
    fn load(&mut self, entry: &RouteEntry) -> Result<LoadedModule, LoadError> {
        let path = entry.absolute_path();
        if let Some(router) = self.cache.get(path) {
            return Ok(LoadedModule::new(path, router.clone()));
        }

        let export = self
            .manifest
            .export(&entry.manifest_key())
            .ok_or_else(|| LoadError::new(path, LoadFailure::Unregistered))?;

        let router = export()
            .downcast::<Router>()
            .map(|router| *router)
            .map_err(|_| LoadError::new(path, LoadFailure::NotRoutable))?;

        self.cache.insert(path.to_path_buf(), router.clone());
        Ok(LoadedModule::new(path, router))
    }
}

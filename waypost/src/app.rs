//! The application builder.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use tracing::info;

use crate::config::DiscoveryConfig;
use crate::discovery::{Discovery, DiscoveryError, Manifest, Reloader, RouterHandle};
use crate::middleware::{Middleware, MiddlewareStack};
use crate::observability::TracingConfig;
use crate::router::Router;
use crate::server::{Pipeline, serve};
use crate::state::AppState;

const DEFAULT_RELOAD_DEBOUNCE: Duration = Duration::from_millis(200);

struct Discovered {
    discovery: Discovery,
    manifest: Arc<Manifest>,
    router: Router,
}

/// Builds and serves a Waypost application.
///
/// Routes registered with [`Waypost::router`] match before discovered
/// routes.
///
/// ```ignore
/// use waypost::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> std::io::Result<()> {
///     let app = Waypost::new()
///         .with_tracing(TracingConfig::new())
///         .middleware(RequestLogMiddleware::new())
///         .discover(Discovery::new("src/routes"), Manifest::collected())
///         .unwrap_or_else(|e| panic!("route discovery failed: {e}"));
///
///     app.listen("127.0.0.1:3000").await
/// }
/// ```
pub struct Waypost {
    pub(crate) router: Router,
    pub(crate) state: AppState,
    pub(crate) middlewares: MiddlewareStack,
    tracing: Option<TracingConfig>,
    discovered: Option<Discovered>,
    hot_reload: Option<Duration>,
}

pub(crate) struct AppParts {
    pub(crate) pipeline: Pipeline,
    pub(crate) handle: RouterHandle,
    pub(crate) reloader: Option<Reloader>,
    pub(crate) hot_reload: Option<Duration>,
}

impl Waypost {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            state: AppState::new(),
            middlewares: MiddlewareStack::new(),
            tracing: None,
            discovered: None,
            hot_reload: None,
        }
    }

    /// Sets the hand-registered routes.
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn state<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.state = self.state.with(value);
        self
    }

    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middlewares.add(middleware);
        self
    }

    /// Installs a tracing subscriber when the app starts listening.
    pub fn with_tracing(mut self, config: TracingConfig) -> Self {
        self.tracing = Some(config);
        self
    }

    /// Runs a composition pass now and mounts its routes.
    ///
    /// Fails with the pass's error, so a misnamed or colliding route module
    /// stops startup instead of serving a partial tree.
    pub fn discover(mut self, discovery: Discovery, manifest: Manifest) -> Result<Self, DiscoveryError> {
        let router = discovery.compose(&manifest)?.into_router();
        self.discovered = Some(Discovered {
            discovery,
            manifest: Arc::new(manifest),
            router,
        });
        Ok(self)
    }

    /// Like [`Waypost::discover`], with the pass and hot reload taken from
    /// `config`.
    pub fn discover_with_config(
        self,
        config: &DiscoveryConfig,
        manifest: Manifest,
    ) -> Result<Self, DiscoveryError> {
        let app = self.discover(config.discovery(), manifest)?;
        Ok(if config.hot_reload {
            app.hot_reload(DEFAULT_RELOAD_DEBOUNCE)
        } else {
            app
        })
    }

    /// Rescans the routes directory after changes settle for `debounce`.
    ///
    /// Has no effect unless routes were discovered.
    pub fn hot_reload(mut self, debounce: Duration) -> Self {
        self.hot_reload = Some(debounce);
        self
    }

    /// Lists every `(method, pattern)` pair in matching order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.served_router().routes()
    }

    fn served_router(&self) -> Router {
        match &self.discovered {
            Some(discovered) => self.router.clone().mount("/", discovered.router.clone()),
            None => self.router.clone(),
        }
    }

    pub(crate) fn into_parts(self) -> AppParts {
        let handle = RouterHandle::new(self.served_router());
        let reloader = self.discovered.map(|discovered| {
            Reloader::new(
                discovered.discovery,
                discovered.manifest,
                self.router,
                handle.clone(),
            )
        });

        AppParts {
            pipeline: Pipeline::new(handle.clone(), self.state, self.middlewares),
            handle,
            reloader,
            hot_reload: self.hot_reload,
        }
    }

    /// Serves the app on `addr` until SIGTERM or Ctrl-C.
    pub async fn listen(mut self, addr: &str) -> std::io::Result<()> {
        let addr: SocketAddr = addr.parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid address '{}': {}", addr, e),
            )
        })?;

        if let Some(tracing) = self.tracing.take() {
            tracing.init();
        }

        let parts = self.into_parts();
        let _watcher = match (parts.reloader, parts.hot_reload) {
            (Some(reloader), Some(debounce)) => {
                info!(debounce_ms = debounce.as_millis() as u64, "hot reload enabled");
                Some(reloader.watch(debounce).map_err(std::io::Error::other)?)
            }
            _ => None,
        };

        serve(addr, parts.pipeline).await
    }
}

impl Default for Waypost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{TimeoutMiddleware, TraceIdMiddleware};
    use http::StatusCode;
    use std::fs;
    use tempfile::TempDir;

    fn patterns(app: &Waypost) -> Vec<String> {
        app.routes().into_iter().map(|(_, p)| p).collect()
    }

    #[test]
    fn test_waypost_new() {
        let app = Waypost::new();
        assert!(app.middlewares.is_empty());
        assert!(app.routes().is_empty());
    }

    #[test]
    fn test_waypost_with_state_and_middleware() {
        let app = Waypost::new()
            .state(42u32)
            .middleware(TraceIdMiddleware::new())
            .middleware(TimeoutMiddleware::new(Duration::from_secs(10)));

        assert_eq!(app.state.get::<u32>(), Some(&42));
        assert_eq!(app.middlewares.len(), 2);
    }

    #[test]
    fn test_discover_mounts_after_hand_registered_routes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("user")).unwrap();
        fs::write(dir.path().join("user/index.rs"), "").unwrap();

        let manifest = Manifest::new().with("user/index.rs", || {
            Router::new().get("/:id", |_, _, _| async { StatusCode::OK })
        });

        let app = Waypost::new()
            .router(Router::new().get("/health", |_, _, _| async { StatusCode::OK }))
            .discover(Discovery::new(dir.path()), manifest)
            .unwrap();

        assert_eq!(patterns(&app), vec!["/health", "/user/:id"]);
    }

    #[test]
    fn test_discover_fails_fast() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("orphan.rs"), "").unwrap();

        let result = Waypost::new().discover(Discovery::new(dir.path()), Manifest::new());
        assert!(matches!(result, Err(DiscoveryError::Load(_))));
    }

    #[test]
    fn test_discover_with_config_enables_hot_reload() {
        let dir = TempDir::new().unwrap();
        let config = DiscoveryConfig {
            routes_dir: dir.path().to_path_buf(),
            hot_reload: true,
            ..DiscoveryConfig::default()
        };

        let app = Waypost::new()
            .discover_with_config(&config, Manifest::new())
            .unwrap();
        assert_eq!(app.hot_reload, Some(DEFAULT_RELOAD_DEBOUNCE));

        let parts = app.into_parts();
        assert!(parts.reloader.is_some());
        assert_eq!(parts.handle.load().id(), 0);
    }

    #[tokio::test]
    async fn test_listen_rejects_invalid_address() {
        let err = Waypost::new().listen("not an address").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}

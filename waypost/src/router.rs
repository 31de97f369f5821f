//! HTTP routing for Waypost applications.
//!
//! The [`Router`] type collects route definitions and matches incoming
//! requests to the appropriate handlers. Routers compose: any router can be
//! mounted under a path prefix of another, which is how discovered route
//! modules are assembled into one routing table.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{Method, Request, Response};
use hyper::body::Incoming;

use crate::context::RequestContext;
use crate::error::{Error, scope_trace_id};
use crate::extract::{PathParams, extract_path_params};
use crate::response::{BoxBody, IntoResponse};
use crate::state::AppState;

type BoxFuture = Pin<Box<dyn Future<Output = Response<BoxBody>> + Send>>;
type HandlerFn =
    Arc<dyn Fn(Request<Incoming>, PathParams, Arc<AppState>) -> BoxFuture + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Route {
    pub(crate) pattern: String,
    handler: HandlerFn,
}

/// The HTTP router for matching requests to handlers.
///
/// Routes are matched in the order they are added. Use path parameters
/// with the `:param` syntax.
///
/// # Examples
///
/// ```
/// use waypost::prelude::*;
///
/// let users = Router::new()
///     .get("/me", |_, _, _| async { "Me" })
///     .get("/:id", |_, _, _| async { "User" });
///
/// let router = Router::new()
///     .get("/", |_, _, _| async { "Hello!" })
///     .mount("/users", users);
/// ```
#[derive(Clone, Default)]
pub struct Router {
    pub(crate) routes: Vec<(Method, Route)>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes())
            .finish()
    }
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Adds a route with the given HTTP method and pattern.
    pub fn route<F, Fut, Out>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        let handler: HandlerFn = Arc::new(
            move |req: Request<Incoming>, params: PathParams, state: Arc<AppState>| {
                let handler = handler.clone();
                Box::pin(async move {
                    let output = handler(req, params, state).await;
                    output.into_response()
                }) as BoxFuture
            },
        );

        let route = Route {
            pattern: pattern.to_string(),
            handler,
        };

        self.routes.push((method, route));
        self
    }

    /// Adds a GET route.
    pub fn get<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    /// Adds a POST route.
    pub fn post<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    /// Adds a PUT route.
    pub fn put<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::PUT, pattern, handler)
    }

    /// Adds a PATCH route.
    pub fn patch<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::PATCH, pattern, handler)
    }

    /// Adds a DELETE route.
    pub fn delete<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Mounts every route of `router` under `prefix`, after the routes
    /// already registered here.
    ///
    /// A child route at `/` answers at the prefix itself; `/:id` under
    /// `/users` becomes `/users/:id`. Mounting at `/` merges the routers.
    pub fn mount(mut self, prefix: &str, router: Router) -> Self {
        for (method, route) in router.routes {
            let pattern = join_pattern(prefix, &route.pattern);
            self.routes.push((
                method,
                Route {
                    pattern,
                    handler: route.handler,
                },
            ));
        }
        self
    }

    /// Lists the registered `(method, pattern)` pairs in matching order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.routes
            .iter()
            .map(|(method, route)| (method.clone(), route.pattern.clone()))
            .collect()
    }

    /// Handles an incoming request by matching it to a route.
    ///
    /// Error bodies produced while handling, including the 404 for an
    /// unmatched request, carry `ctx`'s trace ID.
    pub async fn handle(
        &self,
        req: Request<Incoming>,
        state: &Arc<AppState>,
        ctx: &RequestContext,
    ) -> Response<BoxBody> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        for (route_method, route) in &self.routes {
            if *route_method != method {
                continue;
            }

            if let Some(params) = extract_path_params(&route.pattern, &path) {
                let handled = (route.handler)(req, params, state.clone());
                return scope_trace_id(ctx.trace_id.clone(), handled).await;
            }
        }

        Error::not_found(format!("no route for {method} {path}"))
            .with_trace_id(ctx.trace_id.clone())
            .into_response()
    }
}

fn join_pattern(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let pattern = pattern.trim_start_matches('/');

    match (prefix.is_empty(), pattern.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{pattern}"),
        (false, true) if prefix.starts_with('/') => prefix.to_string(),
        (false, true) => format!("/{prefix}"),
        (false, false) if prefix.starts_with('/') => format!("{prefix}/{pattern}"),
        (false, false) => format!("/{prefix}/{pattern}"),
    }
}

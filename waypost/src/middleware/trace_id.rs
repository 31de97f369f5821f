use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::{Request, Response};

use crate::context::RequestContext;
use crate::response::BoxBody;

use super::{BoxFuture, Middleware, Next};

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Echoes the request's trace ID in the `x-trace-id` response header.
///
/// An incoming `x-trace-id` header is honored: it replaces the generated ID
/// for the rest of the chain and is exposed to handlers as a
/// [`RequestContext`] request extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceIdMiddleware;

impl TraceIdMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TraceIdMiddleware {
    fn handle<'a>(
        &'a self,
        mut req: Request<Incoming>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            let incoming = req
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|id| RequestContext {
                    trace_id: id.to_string(),
                    ..ctx.clone()
                });

            let ctx = incoming.as_ref().unwrap_or(ctx);
            req.extensions_mut().insert(ctx.clone());
            let trace_id = ctx.trace_id.clone();

            let mut response = next.with_context(ctx).run(req).await;

            if let Ok(value) = HeaderValue::from_str(&trace_id) {
                response.headers_mut().insert(TRACE_ID_HEADER, value);
            }

            response
        })
    }
}

use std::time::Duration;

use hyper::body::Incoming;
use hyper::{Request, Response};
use tracing::warn;

use crate::context::RequestContext;
use crate::error::Error;
use crate::response::{BoxBody, IntoResponse};

use super::{BoxFuture, Middleware, Next};

/// Fails requests that take longer than `duration` with 504.
#[derive(Debug, Clone)]
pub struct TimeoutMiddleware {
    pub(crate) duration: Duration,
}

impl TimeoutMiddleware {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Default for TimeoutMiddleware {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Middleware for TimeoutMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request<Incoming>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            match tokio::time::timeout(self.duration, next.run(req)).await {
                Ok(response) => response,
                Err(_) => {
                    warn!(trace_id = %ctx.trace_id, timeout_ms = self.duration.as_millis() as u64, "request timed out");
                    Error::timeout("request timed out")
                        .with_trace_id(ctx.trace_id.clone())
                        .into_response()
                }
            }
        })
    }
}

use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::{Request, Response};

use crate::context::RequestContext;
use crate::response::BoxBody;

use super::{BoxFuture, Middleware, Next};

pub const GENERATION_HEADER: &str = "x-routing-generation";

/// Reports the routing generation that served the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationHeaderMiddleware;

impl GenerationHeaderMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for GenerationHeaderMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request<Incoming>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert(GENERATION_HEADER, HeaderValue::from(ctx.generation));
            response
        })
    }
}

//! HTTP server and graceful shutdown.
//!
//! Every request loads the routing generation that is current when it
//! arrives and is dispatched with that generation to completion, so a
//! rescan never changes routing under an in-flight request.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::context::RequestContext;
use crate::discovery::RouterHandle;
use crate::middleware::MiddlewareStack;
use crate::response::BoxBody;
use crate::state::AppState;

/// Everything needed to answer a request, shared by all connections.
#[derive(Clone)]
pub(crate) struct Pipeline {
    handle: RouterHandle,
    state: Arc<AppState>,
    middlewares: Arc<MiddlewareStack>,
}

impl Pipeline {
    pub(crate) fn new(handle: RouterHandle, state: AppState, middlewares: MiddlewareStack) -> Self {
        Self {
            handle,
            state: Arc::new(state),
            middlewares: Arc::new(middlewares),
        }
    }

    pub(crate) async fn dispatch(&self, mut req: Request<Incoming>) -> Response<BoxBody> {
        let generation = self.handle.load();
        let ctx = RequestContext::new(generation.id());
        req.extensions_mut().insert(ctx.clone());

        self.middlewares
            .execute(req, generation.router(), &self.state, &ctx)
            .await
    }
}

/// How long in-flight connections get to finish after a shutdown signal.
pub(crate) const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Accepts connections on `listener` until `shutdown` resolves, then asks
/// every open connection to close and waits up to `grace` for them.
///
/// Idle keep-alive connections close at once; connections still answering
/// a request finish it first. Connections left after `grace` are dropped.
pub(crate) async fn serve_with_shutdown<F>(
    listener: TcpListener,
    pipeline: Pipeline,
    shutdown: F,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let builder = ConnBuilder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut tasks = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!(error = %e, "accept error");
                        continue;
                    }
                };

                let pipeline = pipeline.clone();
                let io = TokioIo::new(stream);

                let svc = service_fn(move |req| {
                    let pipeline = pipeline.clone();
                    async move { Ok::<_, Infallible>(pipeline.dispatch(req).await) }
                });
                let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());

                tasks.spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer = %peer, error = %e, "connection error");
                    }
                });
            }

            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);

    if tokio::time::timeout(grace, graceful.shutdown()).await.is_err() {
        warn!(
            grace_ms = grace.as_millis() as u64,
            remaining = tasks.len(),
            "connections still open after grace period, dropping them"
        );
        tasks.abort_all();
    }
    while tasks.join_next().await.is_some() {}

    info!("server stopped");
    Ok(())
}

/// Binds `addr` and serves until SIGTERM or Ctrl-C.
pub(crate) async fn serve(addr: SocketAddr, pipeline: Pipeline) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "waypost listening");
    serve_with_shutdown(listener, pipeline, shutdown_signal(), SHUTDOWN_GRACE).await
}

/// Resolves on the first shutdown signal the process receives.
///
/// A signal handler that cannot be installed never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
}

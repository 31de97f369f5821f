//! Waypost is an HTTP framework that builds its routing table from a
//! directory of route modules.
//!
//! Each file under the routes directory that follows the naming convention
//! exports a [`Router`](router::Router); its position in the tree decides
//! where it is mounted. See [`discovery`] for the rules.

pub mod app;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod observability;
pub mod response;
pub mod router;
pub mod server;
pub mod state;
pub mod testing;

#[doc(hidden)]
pub use inventory;

pub mod prelude {
    pub use crate::app::Waypost;
    pub use crate::config::{DiscoveryConfig, load_dotenv};
    pub use crate::context::RequestContext;
    pub use crate::discovery::{Discovery, DiscoveryError, Manifest, discover};
    pub use crate::error::{Error, Result};
    pub use crate::extract::{PathParams, param};
    pub use crate::middleware::{
        Middleware, Next, RequestLogMiddleware, TimeoutMiddleware, TraceIdMiddleware,
    };
    pub use crate::observability::TracingConfig;
    pub use crate::response::{IntoResponse, Json};
    pub use crate::route_module;
    pub use crate::router::Router;
    pub use crate::state::AppState;

    pub use http::{Method, StatusCode};
}

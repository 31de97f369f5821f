//! Logging setup for Waypost applications.

mod tracing;

pub use self::tracing::TracingConfig;

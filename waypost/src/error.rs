//! Standardized HTTP errors for Waypost handlers.
//!
//! Handler errors convert to responses with a structured JSON body that
//! carries the request's trace ID.
//!
//! ```rust
//! use waypost::error::{Error, IntoApiError};
//!
//! enum OrderError {
//!     NotFound(u64),
//!     AlreadyShipped,
//! }
//!
//! impl IntoApiError for OrderError {
//!     fn into_api_error(self) -> Error {
//!         match self {
//!             OrderError::NotFound(id) => Error::not_found(format!("order {} not found", id)),
//!             OrderError::AlreadyShipped => Error::conflict("order has already been shipped"),
//!         }
//!     }
//! }
//! ```

use std::fmt;
use std::future::Future;

use http::StatusCode;
use serde::Serialize;

use crate::response::{BoxBody, IntoResponse, with_body};

tokio::task_local! {
    static REQUEST_TRACE_ID: String;
}

/// Runs `fut` with `trace_id` as the trace ID of errors that don't set one.
pub(crate) async fn scope_trace_id<F: Future>(trace_id: String, fut: F) -> F::Output {
    REQUEST_TRACE_ID.scope(trace_id, fut).await
}

/// The JSON structure returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    /// Unique identifier for request tracing.
    pub trace_id: String,
}

/// Detailed error information in the response body.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// The error type returned from handlers and middleware.
///
/// # Examples
///
/// ```
/// use waypost::error::Error;
///
/// let err = Error::bad_request("invalid order id")
///     .with_details(serde_json::json!({"param": "order_id"}));
/// assert_eq!(err.status, 400);
/// ```
#[derive(Debug)]
pub struct Error {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub trace_id: Option<String>,
}

impl Error {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
            trace_id: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Creates a 400 Bad Request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "BAD_REQUEST", message)
    }

    /// Creates a 404 Not Found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "NOT_FOUND", message)
    }

    /// Creates a 409 Conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(409, "CONFLICT", message)
    }

    /// Creates a 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, "INTERNAL_ERROR", message)
    }

    /// Creates a 504 Gateway Timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(504, "TIMEOUT", message)
    }

    /// Converts this error to an ErrorResponse with the given trace ID.
    pub fn to_response(&self, trace_id: String) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.code.clone(),
                message: self.message.clone(),
                details: self.details.clone(),
            },
            trace_id,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

/// Converts domain errors into [`Error`] so handlers can use `?` on them.
pub trait IntoApiError {
    fn into_api_error(self) -> Error;
}

impl<T: IntoApiError> From<T> for Error {
    fn from(err: T) -> Self {
        err.into_api_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> http::Response<BoxBody> {
        let trace_id = self
            .trace_id
            .clone()
            .or_else(|| REQUEST_TRACE_ID.try_with(Clone::clone).ok())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let body = serde_json::to_vec(&self.to_response(trace_id)).unwrap_or_default();
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        with_body(status, Some("application/json"), body)
    }
}

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

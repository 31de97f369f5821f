//! Testing utilities for Waypost applications.
//!
//! [`TestClient`] serves an app on a random local port through the same
//! request pipeline the real server uses.

mod client;

pub use client::{TestClient, TestRequestBuilder, TestResponse};

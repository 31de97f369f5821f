//! Per-request context.

use std::time::{Duration, Instant};

/// Context created for every request before middleware runs.
///
/// `generation` is the id of the routing table the request is dispatched
/// with. It is fixed when the request arrives and does not change if routes
/// are republished while the request is in flight.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    pub generation: u64,
    pub start_time: Instant,
}

impl RequestContext {
    pub fn new(generation: u64) -> Self {
        Self::with_trace_id(uuid::Uuid::new_v4().to_string(), generation)
    }

    pub fn with_trace_id(trace_id: impl Into<String>, generation: u64) -> Self {
        Self {
            trace_id: trace_id.into(),
            generation,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_generates_uuid() {
        let ctx = RequestContext::new(3);
        assert_eq!(ctx.trace_id.len(), 36);
        assert_eq!(ctx.trace_id.chars().filter(|c| *c == '-').count(), 4);
        assert_eq!(ctx.generation, 3);
    }

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(RequestContext::new(0).trace_id, RequestContext::new(0).trace_id);
    }

    #[test]
    fn test_with_trace_id() {
        let ctx = RequestContext::with_trace_id("custom-trace-123", 1);
        assert_eq!(ctx.trace_id, "custom-trace-123");
        assert_eq!(ctx.generation, 1);
    }

    #[test]
    fn test_elapsed_increases() {
        let ctx = RequestContext::default();
        let first = ctx.elapsed();
        thread::sleep(Duration::from_millis(10));
        assert!(ctx.elapsed() > first);
    }
}

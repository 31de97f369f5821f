//! Publishing routing generations and rescanning on change.
//!
//! A published router is never mutated. A rescan runs a brand-new
//! composition pass and swaps the whole routing table at once, so a request
//! keeps the generation it started with even if a rescan lands mid-flight.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tracing::{error, info, warn};

use super::{Discovery, DiscoveryError, Manifest};
use crate::router::Router;

/// One published, immutable routing table.
pub struct Generation {
    id: u64,
    router: Router,
}

impl Generation {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Shared handle to the current routing generation.
///
/// Cloning the handle is cheap; every clone observes the same publications.
#[derive(Clone)]
pub struct RouterHandle {
    current: Arc<ArcSwap<Generation>>,
}

impl RouterHandle {
    /// Publishes `router` as generation 0.
    pub fn new(router: Router) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(Generation { id: 0, router })),
        }
    }

    /// The generation requests should be routed with right now.
    pub fn load(&self) -> Arc<Generation> {
        self.current.load_full()
    }

    /// Publishes `router` as the next generation and returns its id.
    pub fn publish(&self, router: Router) -> u64 {
        let previous = self.current.rcu(|current| Generation {
            id: current.id + 1,
            router: router.clone(),
        });
        previous.id + 1
    }
}

/// Re-runs discovery and publishes the result through a [`RouterHandle`].
///
/// Each published router is `base` with the freshly composed routes mounted
/// after it.
#[derive(Clone)]
pub struct Reloader {
    discovery: Discovery,
    manifest: Arc<Manifest>,
    base: Router,
    handle: RouterHandle,
}

impl Reloader {
    /// Wraps an already published handle.
    pub fn new(discovery: Discovery, manifest: Arc<Manifest>, base: Router, handle: RouterHandle) -> Self {
        Self {
            discovery,
            manifest,
            base,
            handle,
        }
    }

    pub fn handle(&self) -> &RouterHandle {
        &self.handle
    }

    /// Runs a fresh composition pass and publishes it on success.
    ///
    /// On failure the previously published generation stays in place.
    pub fn rescan(&self) -> Result<u64, DiscoveryError> {
        let tree = self.discovery.compose(&self.manifest)?;
        let router = self.base.clone().mount("/", tree.into_router());
        let id = self.handle.publish(router);
        info!(generation = id, "published routing generation");
        Ok(id)
    }

    /// Watches the routes root and rescans after each burst of changes.
    ///
    /// Watching stops when the returned debouncer is dropped.
    pub fn watch(self, debounce: Duration) -> notify_debouncer_mini::notify::Result<Debouncer<RecommendedWatcher>> {
        let root = self.discovery.root().to_path_buf();

        let mut debouncer = new_debouncer(debounce, move |res: DebounceEventResult| match res {
            Ok(events) if events.is_empty() => {}
            Ok(_) => {
                if let Err(e) = self.rescan() {
                    warn!(error = %e, "rescan failed, keeping current routing generation");
                }
            }
            Err(e) => error!(error = ?e, "route watcher error"),
        })?;

        debouncer.watcher().watch(&root, RecursiveMode::Recursive)?;
        info!(root = %root.display(), "watching routes for changes");
        Ok(debouncer)
    }
}

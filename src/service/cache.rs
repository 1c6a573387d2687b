// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL cache for effective configurations and the template snapshot.
//!
//! One [`moka`] cache holds two kinds of entries: one per literal domain (its
//! effective configuration) and a single slot for the current snapshot of
//! template identifiers. Expiry is checked on every read, so a logically
//! expired entry is never served even if it is still physically resident.
//! Physical removal happens during moka's own maintenance and in a periodic
//! sweep (see [`ConfigCache::spawn_sweeper`]).

use crate::domain::{Document, DomainId};
use crate::service::template_registry::Template;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Logical lifetime of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Interval between physical cleanup sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum CacheKey {
    Domain(DomainId),
    Templates,
}

#[derive(Clone, Debug)]
enum CacheValue {
    Config(Arc<Document>),
    Templates(Arc<Vec<Template>>),
}

/// Concurrent TTL cache shared by the service and the template registry.
///
/// Cloning is cheap; clones share the same storage.
#[derive(Clone)]
pub struct ConfigCache {
    inner: Cache<CacheKey, CacheValue>,
    ttl: Duration,
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("ttl", &self.ttl)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl ConfigCache {
    /// Creates a cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().time_to_live(ttl).build(),
            ttl,
        }
    }

    /// Returns the logical lifetime of entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached effective configuration for a literal domain.
    pub async fn get_config(&self, domain: &DomainId) -> Option<Document> {
        match self.inner.get(&CacheKey::Domain(domain.clone())).await {
            Some(CacheValue::Config(doc)) => Some(doc.as_ref().clone()),
            _ => None,
        }
    }

    /// Caches the effective configuration for a literal domain.
    pub async fn insert_config(&self, domain: DomainId, config: Document) {
        self.inner
            .insert(CacheKey::Domain(domain), CacheValue::Config(Arc::new(config)))
            .await;
    }

    /// Drops the cached entry for one domain.
    pub async fn invalidate_config(&self, domain: &DomainId) {
        self.inner.invalidate(&CacheKey::Domain(domain.clone())).await;
    }

    /// Returns the cached template snapshot.
    pub async fn get_templates(&self) -> Option<Arc<Vec<Template>>> {
        match self.inner.get(&CacheKey::Templates).await {
            Some(CacheValue::Templates(templates)) => Some(templates),
            _ => None,
        }
    }

    /// Caches a template snapshot.
    pub async fn insert_templates(&self, templates: Arc<Vec<Template>>) {
        self.inner
            .insert(CacheKey::Templates, CacheValue::Templates(templates))
            .await;
    }

    /// Drops every entry, including the template snapshot.
    ///
    /// Entries become unreadable immediately; their memory is reclaimed during
    /// the next maintenance run.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Returns the approximate number of resident entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Performs pending maintenance now, physically evicting expired and
    /// invalidated entries.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Starts a background task that sweeps the cache every `interval`.
    ///
    /// Returns `None` when called outside a tokio runtime or with a zero
    /// interval. The task stops when the returned handle is dropped.
    pub fn spawn_sweeper(&self, interval: Duration) -> Option<SweeperHandle> {
        if interval.is_zero() {
            tracing::warn!("Cache sweep interval is zero; physical cleanup is left to the cache");
            return None;
        }
        let runtime = tokio::runtime::Handle::try_current().ok()?;

        let cache = self.inner.clone();
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.run_pending_tasks().await;
                tracing::debug!(entries = cache.entry_count(), "Swept configuration cache");
            }
        });

        Some(SweeperHandle(task))
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Handle to the periodic sweep task; aborts the task on drop.
#[derive(Debug)]
pub struct SweeperHandle(JoinHandle<()>);

impl SweeperHandle {
    /// Returns `true` once the sweep task has stopped.
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache-fronted configuration service.
//!
//! [`CachedConfigService`] serves effective configurations of literal domains
//! from a TTL cache and recomputes them through the [`Resolver`] on a miss.
//! Writes go straight to the store and invalidate what they may have changed:
//! the written domain's entry for a literal write, everything for a template
//! write.

use crate::domain::{ConfigError, Deadline, Document, DomainConfigService, DomainId, Result};
use crate::ports::ConfigStore;
use crate::service::cache::{ConfigCache, SweeperHandle, DEFAULT_CLEANUP_INTERVAL, DEFAULT_TTL};
use crate::service::resolver::Resolver;
use crate::service::template_registry::TemplateRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Configuration service with a TTL cache in front of a [`ConfigStore`].
///
/// # Examples
///
/// ```rust
/// use hsconfig::prelude::*;
/// use hsconfig::adapters::MemoryStore;
/// use hsconfig::service::CachedConfigService;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<()> {
/// let service = CachedConfigService::builder()
///     .with_store(MemoryStore::new())
///     .build()?;
///
/// let template = DomainId::from("*.example.com");
/// let record = Document::from_value(json!({"theme": "dark", "lang": "en"}))?;
/// service.set_config(&template, Some(record), Deadline::none()).await?;
///
/// let domain = DomainId::from("a.example.com");
/// let record = Document::from_value(json!({"theme": "custom"}))?;
/// let effective = service.set_config(&domain, Some(record), Deadline::none()).await?;
/// assert_eq!(effective.get("theme"), Some(&json!("custom")));
/// assert_eq!(effective.get("lang"), Some(&json!("en")));
/// # Ok(())
/// # }
/// ```
pub struct CachedConfigService {
    store: Arc<dyn ConfigStore>,
    cache: ConfigCache,
    resolver: Resolver,
    request_timeout: Option<Duration>,
    _sweeper: Option<SweeperHandle>,
}

impl CachedConfigService {
    /// Creates a service over `store` with default cache settings.
    ///
    /// Outside a tokio runtime no sweep task is started; expired entries are
    /// still never served.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self::assemble(store, DEFAULT_TTL, Some(DEFAULT_CLEANUP_INTERVAL), None)
    }

    /// Creates a new service builder.
    pub fn builder() -> ConfigServiceBuilder {
        ConfigServiceBuilder::new()
    }

    fn assemble(
        store: Arc<dyn ConfigStore>,
        ttl: Duration,
        cleanup_interval: Option<Duration>,
        request_timeout: Option<Duration>,
    ) -> Self {
        let cache = ConfigCache::new(ttl);
        let registry = TemplateRegistry::new(Arc::clone(&store), cache.clone());
        let resolver = Resolver::new(Arc::clone(&store), registry);
        let sweeper = cleanup_interval.and_then(|interval| cache.spawn_sweeper(interval));

        Self {
            store,
            cache,
            resolver,
            request_timeout,
            _sweeper: sweeper,
        }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    /// Returns the cache.
    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    /// Returns a deadline derived from the configured request timeout.
    ///
    /// Callers that have no deadline of their own can pass this to every
    /// service method.
    pub fn default_deadline(&self) -> Deadline {
        Deadline::from_timeout(self.request_timeout)
    }

    /// Returns the number of resident cache entries after running pending
    /// maintenance.
    pub async fn cached_entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    async fn write_record(
        &self,
        domain: &DomainId,
        record: Option<&Document>,
        deadline: Deadline,
    ) -> Result<()> {
        match record {
            Some(record) => {
                deadline
                    .run(
                        "upsert_record",
                        domain.as_str(),
                        self.store.upsert_record(domain, record, deadline),
                    )
                    .await
            }
            None => {
                deadline
                    .run(
                        "delete_record",
                        domain.as_str(),
                        self.store.delete_record(domain, deadline),
                    )
                    .await
            }
        }
    }
}

impl std::fmt::Debug for CachedConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedConfigService")
            .field("store", &self.store.name())
            .field("cache", &self.cache)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DomainConfigService for CachedConfigService {
    async fn get_effective_config(
        &self,
        domain: &DomainId,
        deadline: Deadline,
    ) -> Result<Document> {
        if domain.is_template() {
            return self.resolver.resolve(domain, deadline).await;
        }

        if let Some(config) = self.cache.get_config(domain).await {
            tracing::trace!("Cache hit for domain '{}'", domain);
            return Ok(config);
        }

        tracing::debug!("Cache miss for domain '{}'", domain);
        let config = self.resolver.resolve(domain, deadline).await?;
        self.cache.insert_config(domain.clone(), config.clone()).await;
        Ok(config)
    }

    async fn set_config(
        &self,
        domain: &DomainId,
        record: Option<Document>,
        deadline: Deadline,
    ) -> Result<Document> {
        if let Err(e) = self.write_record(domain, record.as_ref(), deadline).await {
            tracing::warn!("Failed to write config for domain '{}': {}", domain, e);
            return Err(e);
        }

        self.cache.invalidate_config(domain).await;
        if domain.is_template() {
            tracing::info!("Template '{}' changed; flushing configuration cache", domain);
            self.cache.invalidate_all();
        } else {
            tracing::info!("Config for domain '{}' changed", domain);
        }

        self.get_effective_config(domain, deadline).await
    }

    async fn list_templates(&self, deadline: Deadline) -> Result<Vec<DomainId>> {
        Ok(self
            .resolver
            .registry()
            .templates(deadline)
            .await?
            .iter()
            .map(|template| template.id().clone())
            .collect())
    }
}

/// Builder for constructing a [`CachedConfigService`].
///
/// # Examples
///
/// ```rust
/// use hsconfig::adapters::MemoryStore;
/// use hsconfig::service::ConfigServiceBuilder;
/// use std::time::Duration;
///
/// # fn main() -> hsconfig::domain::Result<()> {
/// let service = ConfigServiceBuilder::new()
///     .with_store(MemoryStore::new())
///     .with_ttl(Duration::from_secs(60))
///     .without_sweeper()
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigServiceBuilder {
    store: Option<Arc<dyn ConfigStore>>,
    ttl: Duration,
    cleanup_interval: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl ConfigServiceBuilder {
    /// Creates a new builder with default cache settings.
    pub fn new() -> Self {
        Self {
            store: None,
            ttl: DEFAULT_TTL,
            cleanup_interval: Some(DEFAULT_CLEANUP_INTERVAL),
            request_timeout: None,
        }
    }

    /// Sets the backing store.
    pub fn with_store(self, store: impl ConfigStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Sets a backing store that is shared with other owners.
    pub fn with_shared_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets how long effective configurations stay cached.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the interval of the background cache sweep.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Disables the background cache sweep.
    pub fn without_sweeper(mut self) -> Self {
        self.cleanup_interval = None;
        self
    }

    /// Sets the timeout used by [`CachedConfigService::default_deadline`].
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Applies cache and timeout values from loaded settings.
    pub fn with_settings(mut self, settings: &crate::settings::EngineSettings) -> Self {
        self.ttl = settings.cache.ttl();
        self.cleanup_interval = Some(settings.cache.cleanup_interval());
        self.request_timeout = settings.request_timeout();
        self
    }

    /// Builds the service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SettingsError`] if no store was configured.
    pub fn build(self) -> Result<CachedConfigService> {
        let store = self.store.ok_or_else(|| ConfigError::SettingsError {
            message: "No configuration store was provided".to_string(),
            source: None,
        })?;

        tracing::debug!(
            "Building configuration service over store '{}' (ttl {:?})",
            store.name(),
            self.ttl
        );
        Ok(CachedConfigService::assemble(
            store,
            self.ttl,
            self.cleanup_interval,
            self.request_timeout,
        ))
    }
}

impl Default for ConfigServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis store adapter.
//!
//! This module provides a [`ConfigStore`] that keeps configuration documents in
//! Redis as JSON text.

use crate::domain::{ConfigError, Deadline, Document, DomainId, Result};
use crate::ports::ConfigStore;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

/// Storage layout for Redis records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedisStorageMode {
    /// Store each record as a separate Redis string key with a prefix.
    /// Example: `hsconfig:a.example.com`, `hsconfig:*.example.com`
    StringKeys,
    /// Store all records as fields of a single Redis hash.
    /// Example: `HGET hsconfig:configs a.example.com`
    Hash,
}

/// Configuration store adapter for Redis.
///
/// # Examples
///
/// ```rust,no_run
/// use hsconfig::adapters::{RedisStorageMode, RedisStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // One key per domain under a prefix
/// let store = RedisStore::new("redis://localhost:6379", "hsconfig:", RedisStorageMode::StringKeys).await?;
///
/// // Or every domain as a field of one hash
/// let store = RedisStore::new("redis://localhost:6379", "hsconfig:configs", RedisStorageMode::Hash).await?;
/// # Ok(())
/// # }
/// ```
pub struct RedisStore {
    /// Shared multiplexed connection, cloned per call
    conn: MultiplexedConnection,
    /// Key prefix or hash key name
    namespace: String,
    /// Storage layout
    storage_mode: RedisStorageMode,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("namespace", &self.namespace)
            .field("storage_mode", &self.storage_mode)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Validates the namespace; Redis pattern characters would corrupt SCAN
    /// patterns built from it.
    fn validate_namespace(namespace: &str) -> Result<()> {
        if namespace.contains(['*', '?', '[', ']', '\\']) {
            return Err(ConfigError::StoreError {
                backend: "redis".to_string(),
                message: "Namespace contains invalid characters (* ? [ ] \\)".to_string(),
                source: None,
            });
        }
        Ok(())
    }

    /// Connects to Redis.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., `"redis://localhost:6379"`)
    /// * `namespace` - Key prefix (for StringKeys mode) or hash key name (for Hash mode)
    /// * `storage_mode` - Whether to use string keys or hash storage
    pub async fn new(url: &str, namespace: &str, storage_mode: RedisStorageMode) -> Result<Self> {
        Self::validate_namespace(namespace)?;

        let client = Client::open(url)
            .map_err(|e| ConfigError::store("redis", format!("Failed to create Redis client: {}", e), e))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ConfigError::store("redis", format!("Failed to connect to Redis: {}", e), e))?;

        Ok(Self {
            conn,
            namespace: namespace.to_string(),
            storage_mode,
        })
    }

    fn key_for(&self, domain: &DomainId) -> String {
        string_key(&self.namespace, domain)
    }

    fn decode(domain: &DomainId, text: &str) -> Result<Document> {
        Document::from_json_str(text).map_err(|e| ConfigError::StoreError {
            backend: "redis".to_string(),
            message: format!("Record for '{}' is not a JSON object", domain),
            source: Some(Box::new(e)),
        })
    }

    /// Collects every string key holding a template record.
    async fn scan_template_keys(&self) -> Result<Vec<DomainId>> {
        let mut conn = self.conn.clone();
        let pattern = template_scan_pattern(&self.namespace);
        let mut cursor: u64 = 0;
        let mut domains = Vec::new();

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| ConfigError::store("redis", format!("Failed to scan keys from Redis: {}", e), e))?;

            domains.extend(keys.into_iter().filter_map(|key| {
                key.strip_prefix(&self.namespace)
                    .map(DomainId::from)
            }));
            cursor = new_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(domains)
    }
}

/// Key of a record in string-keys mode.
fn string_key(namespace: &str, domain: &DomainId) -> String {
    format!("{}{}", namespace, domain)
}

/// SCAN pattern selecting template keys under `namespace`.
fn template_scan_pattern(namespace: &str) -> String {
    // `\*` matches a literal star in Redis glob patterns.
    format!("{}*\\**", namespace)
}

#[async_trait]
impl ConfigStore for RedisStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get_record(&self, domain: &DomainId, _deadline: Deadline) -> Result<Option<Document>> {
        let mut conn = self.conn.clone();
        let text: Option<String> = match self.storage_mode {
            RedisStorageMode::StringKeys => conn.get::<_, Option<String>>(self.key_for(domain)).await,
            RedisStorageMode::Hash => {
                conn.hget::<_, _, Option<String>>(&self.namespace, domain.as_str())
                    .await
            }
        }
        .map_err(|e| ConfigError::store("redis", format!("Failed to fetch record from Redis: {}", e), e))?;

        text.map(|text| Self::decode(domain, &text)).transpose()
    }

    async fn upsert_record(
        &self,
        domain: &DomainId,
        record: &Document,
        _deadline: Deadline,
    ) -> Result<()> {
        let text = record.to_json_string()?;
        let mut conn = self.conn.clone();
        match self.storage_mode {
            RedisStorageMode::StringKeys => conn.set::<_, _, ()>(self.key_for(domain), text).await,
            RedisStorageMode::Hash => {
                conn.hset::<_, _, _, ()>(&self.namespace, domain.as_str(), text)
                    .await
            }
        }
        .map_err(|e| ConfigError::store("redis", format!("Failed to store record in Redis: {}", e), e))
    }

    async fn delete_record(&self, domain: &DomainId, _deadline: Deadline) -> Result<()> {
        let mut conn = self.conn.clone();
        match self.storage_mode {
            RedisStorageMode::StringKeys => conn.del::<_, ()>(self.key_for(domain)).await,
            RedisStorageMode::Hash => conn.hdel::<_, _, ()>(&self.namespace, domain.as_str()).await,
        }
        .map_err(|e| ConfigError::store("redis", format!("Failed to delete record from Redis: {}", e), e))
    }

    async fn list_wildcard_domains(&self, _deadline: Deadline) -> Result<Vec<DomainId>> {
        match self.storage_mode {
            RedisStorageMode::StringKeys => self.scan_template_keys().await,
            RedisStorageMode::Hash => {
                let mut conn = self.conn.clone();
                let fields: Vec<String> = conn
                    .hkeys(&self.namespace)
                    .await
                    .map_err(|e| ConfigError::store("redis", format!("Failed to list hash fields from Redis: {}", e), e))?;
                Ok(fields
                    .into_iter()
                    .map(DomainId::from)
                    .filter(DomainId::is_template)
                    .collect())
            }
        }
    }
}

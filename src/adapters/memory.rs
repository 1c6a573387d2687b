// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store adapter.
//!
//! Useful for embedding and tests; nothing survives the process.

use crate::domain::{ConfigError, Deadline, Document, DomainId, Result};
use crate::ports::ConfigStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// A [`ConfigStore`] that keeps every record in process memory.
///
/// Records are kept in identifier order, so [`list_wildcard_domains`] returns
/// templates in a stable order.
///
/// [`list_wildcard_domains`]: ConfigStore::list_wildcard_domains
///
/// # Examples
///
/// ```rust
/// use hsconfig::adapters::MemoryStore;
/// use hsconfig::domain::Document;
///
/// let store = MemoryStore::new()
///     .with_record("*.example.com", Document::from_json_str(r#"{"theme": "dark"}"#).unwrap());
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<DomainId, Document>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    pub fn from_records(records: BTreeMap<DomainId, Document>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Adds a record, builder style.
    pub fn with_record(self, domain: impl Into<DomainId>, record: Document) -> Self {
        self.put(domain, record);
        self
    }

    /// Stores a record without going through the async port.
    pub fn put(&self, domain: impl Into<DomainId>, record: Document) {
        if let Ok(mut records) = self.records.write() {
            records.insert(domain.into(), record);
        }
    }

    /// Returns a copy of every stored record.
    pub fn snapshot(&self) -> BTreeMap<DomainId, Document> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> ConfigError {
        ConfigError::StoreError {
            backend: "memory".to_string(),
            message: "record map lock poisoned".to_string(),
            source: None,
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_record(&self, domain: &DomainId, _deadline: Deadline) -> Result<Option<Document>> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.get(domain).cloned())
    }

    async fn upsert_record(
        &self,
        domain: &DomainId,
        record: &Document,
        _deadline: Deadline,
    ) -> Result<()> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        records.insert(domain.clone(), record.clone());
        Ok(())
    }

    async fn delete_record(&self, domain: &DomainId, _deadline: Deadline) -> Result<()> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        records.remove(domain);
        Ok(())
    }

    async fn list_wildcard_domains(&self, _deadline: Deadline) -> Result<Vec<DomainId>> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records
            .keys()
            .filter(|domain| domain.is_template())
            .cloned()
            .collect())
    }
}

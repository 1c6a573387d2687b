// SPDX-License-Identifier: MIT OR Apache-2.0

//! etcd store adapter.
//!
//! Keeps each configuration document under `<prefix><domain>` as JSON text.

use crate::domain::{ConfigError, Deadline, Document, DomainId, Result};
use crate::ports::ConfigStore;
use async_trait::async_trait;
use etcd_client::{Client, GetOptions};

/// Configuration store adapter for etcd.
///
/// # Examples
///
/// ```rust,no_run
/// use hsconfig::adapters::EtcdStore;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = EtcdStore::new(vec!["localhost:2379"], Some("hsconfig/")).await?;
/// # Ok(())
/// # }
/// ```
pub struct EtcdStore {
    /// etcd client; cheap to clone, cloned per call
    client: Client,
    /// Key prefix for namespacing
    prefix: String,
}

impl std::fmt::Debug for EtcdStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtcdStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl EtcdStore {
    /// Connects to an etcd cluster.
    ///
    /// # Arguments
    ///
    /// * `endpoints` - List of etcd endpoints (e.g., `["localhost:2379"]`)
    /// * `prefix` - Optional key prefix for namespacing (e.g., `"hsconfig/"`)
    pub async fn new<S: AsRef<str>>(endpoints: Vec<S>, prefix: Option<&str>) -> Result<Self> {
        let endpoints: Vec<String> = endpoints.iter().map(|s| s.as_ref().to_string()).collect();

        let client = Client::connect(&endpoints, None)
            .await
            .map_err(|e| ConfigError::store("etcd", format!("Failed to connect to etcd: {}", e), e))?;

        Ok(Self {
            client,
            prefix: prefix.unwrap_or("").to_string(),
        })
    }

    fn key_for(&self, domain: &DomainId) -> String {
        format!("{}{}", self.prefix, domain)
    }
}

#[async_trait]
impl ConfigStore for EtcdStore {
    fn name(&self) -> &str {
        "etcd"
    }

    async fn get_record(&self, domain: &DomainId, _deadline: Deadline) -> Result<Option<Document>> {
        let mut client = self.client.clone();
        let response = client
            .get(self.key_for(domain), None)
            .await
            .map_err(|e| ConfigError::store("etcd", format!("Failed to fetch record from etcd: {}", e), e))?;

        let Some(kv) = response.kvs().first() else {
            return Ok(None);
        };

        let text = kv
            .value_str()
            .map_err(|e| ConfigError::store("etcd", "Record is not valid UTF-8", e))?;

        Document::from_json_str(text)
            .map(Some)
            .map_err(|e| ConfigError::StoreError {
                backend: "etcd".to_string(),
                message: format!("Record for '{}' is not a JSON object", domain),
                source: Some(Box::new(e)),
            })
    }

    async fn upsert_record(
        &self,
        domain: &DomainId,
        record: &Document,
        _deadline: Deadline,
    ) -> Result<()> {
        let text = record.to_json_string()?;
        let mut client = self.client.clone();
        client
            .put(self.key_for(domain), text, None)
            .await
            .map_err(|e| ConfigError::store("etcd", format!("Failed to store record in etcd: {}", e), e))?;
        Ok(())
    }

    async fn delete_record(&self, domain: &DomainId, _deadline: Deadline) -> Result<()> {
        let mut client = self.client.clone();
        client
            .delete(self.key_for(domain), None)
            .await
            .map_err(|e| ConfigError::store("etcd", format!("Failed to delete record from etcd: {}", e), e))?;
        Ok(())
    }

    async fn list_wildcard_domains(&self, _deadline: Deadline) -> Result<Vec<DomainId>> {
        let mut client = self.client.clone();
        let options = GetOptions::new().with_prefix().with_keys_only();
        let response = client
            .get(self.prefix.as_str(), Some(options))
            .await
            .map_err(|e| ConfigError::store("etcd", format!("Failed to list keys from etcd: {}", e), e))?;

        Ok(response
            .kvs()
            .iter()
            .filter_map(|kv| kv.key_str().ok())
            .filter_map(|key| key.strip_prefix(self.prefix.as_str()))
            .map(DomainId::from)
            .filter(DomainId::is_template)
            .collect())
    }
}

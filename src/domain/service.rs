// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain configuration service trait definition.
//!
//! [`DomainConfigService`] is the interface callers use to read and write
//! per-domain configuration. The crate's implementation is
//! [`CachedConfigService`](crate::service::CachedConfigService).

use crate::domain::{Deadline, Document, DomainId, Result};
use async_trait::async_trait;
use serde_json::Value;

/// The main configuration service trait.
///
/// Reads of literal domains return the *effective* configuration: matching
/// templates merged by weight, with the domain's own record on top. Reads of
/// template domains return the template's stored record as-is.
///
/// Every method accepts a [`Deadline`] that bounds each store call it issues.
#[async_trait]
pub trait DomainConfigService: Send + Sync {
    /// Returns the effective configuration for `domain`.
    ///
    /// A domain with no record and no matching templates yields an empty
    /// document, not an error.
    async fn get_effective_config(&self, domain: &DomainId, deadline: Deadline)
        -> Result<Document>;

    /// Stores `record` for `domain` (or deletes it when `None`) and returns the
    /// freshly recomputed effective configuration.
    async fn set_config(
        &self,
        domain: &DomainId,
        record: Option<Document>,
        deadline: Deadline,
    ) -> Result<Document>;

    /// Deletes the record for `domain` and returns what remains effective.
    async fn delete_config(&self, domain: &DomainId, deadline: Deadline) -> Result<Document> {
        self.set_config(domain, None, deadline).await
    }

    /// Returns the value at a `/`-separated key path within the effective
    /// configuration of `domain`.
    async fn get_config_value(
        &self,
        domain: &DomainId,
        key_path: &str,
        deadline: Deadline,
    ) -> Result<Value> {
        self.get_effective_config(domain, deadline)
            .await?
            .lookup_path(key_path)
    }

    /// Writes a single value at a `/`-separated key path.
    ///
    /// The value is overlaid onto the current effective configuration of
    /// `domain` and the combined document is stored as the domain's record.
    async fn set_config_value(
        &self,
        domain: &DomainId,
        key_path: &str,
        value: Value,
        deadline: Deadline,
    ) -> Result<Document> {
        let patch = Document::from_key_path(key_path, value)?;
        let mut current = self.get_effective_config(domain, deadline).await?;
        current.overwrite_from(&patch);
        self.set_config(domain, Some(current), deadline).await
    }

    /// Returns the identifiers of every template domain.
    async fn list_templates(&self, deadline: Deadline) -> Result<Vec<DomainId>>;
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent store trait definition.
//!
//! [`ConfigStore`] is the port through which the engine reaches the system of
//! record for literal and template documents. Adapters for concrete backends
//! live in [`crate::adapters`].

use crate::domain::{Deadline, Document, DomainId, Result};
use async_trait::async_trait;

/// A trait for persistent configuration stores.
///
/// Implementations must be `Send + Sync`; a single store is shared by every
/// concurrent caller of the service.
///
/// # Not-found
///
/// An absent record is reported as `Ok(None)` by [`get_record`](Self::get_record)
/// and is never an error. Deleting an absent record succeeds.
///
/// # Deadlines
///
/// Every call receives the caller's [`Deadline`]. The service already bounds
/// each call with it; adapters may additionally use it to size driver-level
/// timeouts.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use hsconfig::domain::{Deadline, Document, DomainId, Result};
/// use hsconfig::ports::ConfigStore;
///
/// struct EmptyStore;
///
/// #[async_trait]
/// impl ConfigStore for EmptyStore {
///     fn name(&self) -> &str {
///         "empty"
///     }
///
///     async fn get_record(&self, _domain: &DomainId, _deadline: Deadline) -> Result<Option<Document>> {
///         Ok(None)
///     }
///
///     async fn upsert_record(&self, _domain: &DomainId, _record: &Document, _deadline: Deadline) -> Result<()> {
///         Ok(())
///     }
///
///     async fn delete_record(&self, _domain: &DomainId, _deadline: Deadline) -> Result<()> {
///         Ok(())
///     }
///
///     async fn list_wildcard_domains(&self, _deadline: Deadline) -> Result<Vec<DomainId>> {
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns the name of this store, used in logs and error messages.
    fn name(&self) -> &str;

    /// Reads the record stored under `domain`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Document))` - The record exists
    /// * `Ok(None)` - No record is stored under `domain`
    /// * `Err(ConfigError)` - The store failed
    async fn get_record(&self, domain: &DomainId, deadline: Deadline) -> Result<Option<Document>>;

    /// Inserts or replaces the record stored under `domain`.
    async fn upsert_record(
        &self,
        domain: &DomainId,
        record: &Document,
        deadline: Deadline,
    ) -> Result<()>;

    /// Removes the record stored under `domain`, if any.
    async fn delete_record(&self, domain: &DomainId, deadline: Deadline) -> Result<()>;

    /// Returns a point-in-time snapshot of every stored identifier that
    /// contains the wildcard.
    async fn list_wildcard_domains(&self, deadline: Deadline) -> Result<Vec<DomainId>>;
}

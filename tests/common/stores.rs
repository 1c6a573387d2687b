// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store wrappers for observing and disturbing the service under test.

use async_trait::async_trait;
use hsconfig::domain::{ConfigError, Deadline, Document, DomainId, Result};
use hsconfig::ports::ConfigStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts the calls that reach the wrapped store.
pub struct CountingStore {
    inner: Arc<dyn ConfigStore>,
    gets: AtomicUsize,
    lists: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: impl ConfigStore + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            gets: AtomicUsize::new(0),
            lists: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Total number of store reads.
    pub fn reads(&self) -> usize {
        self.gets() + self.lists()
    }
}

#[async_trait]
impl ConfigStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    async fn get_record(&self, domain: &DomainId, deadline: Deadline) -> Result<Option<Document>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_record(domain, deadline).await
    }

    async fn upsert_record(
        &self,
        domain: &DomainId,
        record: &Document,
        deadline: Deadline,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert_record(domain, record, deadline).await
    }

    async fn delete_record(&self, domain: &DomainId, deadline: Deadline) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_record(domain, deadline).await
    }

    async fn list_wildcard_domains(&self, deadline: Deadline) -> Result<Vec<DomainId>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_wildcard_domains(deadline).await
    }
}

/// Fails every call while switched on.
pub struct FailingStore {
    inner: Arc<dyn ConfigStore>,
    failing: AtomicBool,
}

impl FailingStore {
    pub fn new(inner: impl ConfigStore + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConfigError::StoreError {
                backend: "failing".to_string(),
                message: "connection refused".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get_record(&self, domain: &DomainId, deadline: Deadline) -> Result<Option<Document>> {
        self.check()?;
        self.inner.get_record(domain, deadline).await
    }

    async fn upsert_record(
        &self,
        domain: &DomainId,
        record: &Document,
        deadline: Deadline,
    ) -> Result<()> {
        self.check()?;
        self.inner.upsert_record(domain, record, deadline).await
    }

    async fn delete_record(&self, domain: &DomainId, deadline: Deadline) -> Result<()> {
        self.check()?;
        self.inner.delete_record(domain, deadline).await
    }

    async fn list_wildcard_domains(&self, deadline: Deadline) -> Result<Vec<DomainId>> {
        self.check()?;
        self.inner.list_wildcard_domains(deadline).await
    }
}

/// Delays every call by a fixed amount.
pub struct SlowStore {
    inner: Arc<dyn ConfigStore>,
    delay: Duration,
}

impl SlowStore {
    pub fn new(inner: impl ConfigStore + 'static, delay: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            delay,
        }
    }
}

#[async_trait]
impl ConfigStore for SlowStore {
    fn name(&self) -> &str {
        "slow"
    }

    async fn get_record(&self, domain: &DomainId, deadline: Deadline) -> Result<Option<Document>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_record(domain, deadline).await
    }

    async fn upsert_record(
        &self,
        domain: &DomainId,
        record: &Document,
        deadline: Deadline,
    ) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.upsert_record(domain, record, deadline).await
    }

    async fn delete_record(&self, domain: &DomainId, deadline: Deadline) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete_record(domain, deadline).await
    }

    async fn list_wildcard_domains(&self, deadline: Deadline) -> Result<Vec<DomainId>> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_wildcard_domains(deadline).await
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-supplied deadlines threaded through store calls.

use crate::domain::errors::{ConfigError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// An optional point in time after which in-flight store calls are abandoned.
///
/// `Deadline` is `Copy`, so one value can be handed to every store call an
/// operation issues, including the recursive ones made while expanding
/// templates.
///
/// # Examples
///
/// ```
/// use hsconfig::domain::Deadline;
/// use std::time::Duration;
///
/// let unbounded = Deadline::none();
/// assert!(!unbounded.is_expired());
///
/// let bounded = Deadline::after(Duration::from_secs(5));
/// assert!(bounded.instant().is_some());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Deadline(None)
    }

    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Deadline(Some(Instant::now() + timeout))
    }

    /// A deadline at a fixed instant.
    pub fn at(instant: Instant) -> Self {
        Deadline(Some(instant))
    }

    /// A deadline `timeout` from now, or none when no timeout is given.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map(Self::after).unwrap_or_default()
    }

    /// Returns the instant this deadline expires at, if bounded.
    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    /// Returns `true` if the deadline has already passed.
    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Runs `fut` to completion unless the deadline passes first.
    ///
    /// `operation` and `domain` only label the resulting
    /// [`ConfigError::DeadlineExceeded`].
    pub async fn run<T, F>(&self, operation: &str, domain: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.0 {
            None => fut.await,
            Some(at) => tokio::time::timeout_at(at, fut).await.map_err(|_| {
                ConfigError::DeadlineExceeded {
                    operation: operation.to_string(),
                    domain: domain.to_string(),
                }
            })?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unbounded_deadline_runs_to_completion() {
        let result = Deadline::none()
            .run("get_record", "a.example.com", async { Ok(7) })
            .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_passed_deadline_aborts() {
        let deadline = Deadline::after(Duration::from_millis(10));
        let result: Result<()> = deadline
            .run("get_record", "a.example.com", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        match result {
            Err(ConfigError::DeadlineExceeded { operation, domain }) => {
                assert_eq!(operation, "get_record");
                assert_eq!(domain, "a.example.com");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inner_errors_pass_through() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let result: Result<()> = deadline
            .run("delete_record", "a.example.com", async {
                Err(ConfigError::StoreError {
                    backend: "memory".to_string(),
                    message: "boom".to_string(),
                    source: None,
                })
            })
            .await;
        assert!(result.unwrap_err().is_store_error());
    }

    #[tokio::test]
    async fn test_expiry_check() {
        assert!(!Deadline::none().is_expired());
        assert!(!Deadline::from_timeout(None).is_expired());
        let past = Deadline::at(Instant::now() - Duration::from_millis(1));
        assert!(past.is_expired());
    }
}

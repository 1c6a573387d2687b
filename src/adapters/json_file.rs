// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file store adapter.
//!
//! Persists every record in one JSON object (`{"<domain>": {...}, ...}`) on disk.
//! Intended for single-process deployments and the CLI, where a database would
//! be overkill.

use crate::domain::{ConfigError, Deadline, Document, DomainId, Result};
use crate::ports::ConfigStore;
use async_trait::async_trait;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

/// Maximum accepted size of the backing file (64MB).
const MAX_STORE_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Default file name used inside the platform data directory.
const DEFAULT_FILE_NAME: &str = "configs.json";

/// A [`ConfigStore`] backed by a single JSON file.
///
/// All records are held in memory; every write rewrites the file through a
/// temporary sibling and an atomic rename.
///
/// # Examples
///
/// ```rust,no_run
/// use hsconfig::adapters::JsonFileStore;
///
/// # #[tokio::main]
/// # async fn main() -> hsconfig::domain::Result<()> {
/// let store = JsonFileStore::open("/var/lib/hsconfig/configs.json").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<BTreeMap<DomainId, Document>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating an empty file if it does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let records = match fs::metadata(&path).await {
            Ok(metadata) => {
                if metadata.len() > MAX_STORE_FILE_SIZE {
                    return Err(ConfigError::StoreError {
                        backend: "json-file".to_string(),
                        message: format!(
                            "Store file '{}' exceeds maximum size of {} bytes",
                            path.display(),
                            MAX_STORE_FILE_SIZE
                        ),
                        source: None,
                    });
                }
                Self::read_records(&path).await?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Creating empty configuration store at {}", path.display());
                let empty = BTreeMap::new();
                Self::write_records(&path, &empty).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Opens the store in the platform data directory for the application.
    pub async fn open_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::open(Self::default_path(app_name, qualifier)?).await
    }

    /// Returns the default store path for the application.
    pub fn default_path(app_name: &str, qualifier: &str) -> Result<PathBuf> {
        let dirs = ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| {
            ConfigError::StoreError {
                backend: "json-file".to_string(),
                message: "Could not determine a data directory for this platform".to_string(),
                source: None,
            }
        })?;
        Ok(dirs.data_dir().join(DEFAULT_FILE_NAME))
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(path: &Path) -> Result<BTreeMap<DomainId, Document>> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| ConfigError::store("json-file", "Failed to read store file", e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ConfigError::store("json-file", "Store file is not a JSON object of documents", e))
    }

    async fn write_records(path: &Path, records: &BTreeMap<DomainId, Document>) -> Result<()> {
        let data = serde_json::to_vec_pretty(records)
            .map_err(|e| ConfigError::store("json-file", "Failed to serialize records", e))?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, data)
            .await
            .map_err(|e| ConfigError::store("json-file", "Failed to write store file", e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| ConfigError::store("json-file", "Failed to replace store file", e))
    }
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn get_record(&self, domain: &DomainId, _deadline: Deadline) -> Result<Option<Document>> {
        Ok(self.records.read().await.get(domain).cloned())
    }

    async fn upsert_record(
        &self,
        domain: &DomainId,
        record: &Document,
        _deadline: Deadline,
    ) -> Result<()> {
        let mut records = self.records.write().await;
        let previous = records.insert(domain.clone(), record.clone());
        if let Err(e) = Self::write_records(&self.path, &records).await {
            // Keep memory and disk in step when the write fails.
            match previous {
                Some(previous) => records.insert(domain.clone(), previous),
                None => records.remove(domain),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete_record(&self, domain: &DomainId, _deadline: Deadline) -> Result<()> {
        let mut records = self.records.write().await;
        let Some(previous) = records.remove(domain) else {
            return Ok(());
        };
        if let Err(e) = Self::write_records(&self.path, &records).await {
            records.insert(domain.clone(), previous);
            return Err(e);
        }
        Ok(())
    }

    async fn list_wildcard_domains(&self, _deadline: Deadline) -> Result<Vec<DomainId>> {
        Ok(self
            .records
            .read()
            .await
            .keys()
            .filter(|domain| domain.is_template())
            .cloned()
            .collect())
    }
}

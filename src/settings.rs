// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings of the engine itself.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults ([`EngineSettings::default`]);
//! 2. a YAML file (feature `yaml`);
//! 3. environment variables prefixed with `HSCONFIG_` (feature `env`).
//!
//! # Example file
//!
//! ```yaml
//! cache:
//!   ttl_secs: 3600
//!   cleanup_interval_secs: 7200
//! request_timeout_ms: 2000
//! store:
//!   backend: json_file
//!   path: /var/lib/hsconfig/configs.json
//! ```

use crate::adapters::{JsonFileStore, MemoryStore};
use crate::domain::{ConfigError, Result};
use crate::ports::ConfigStore;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Application name used for platform directories.
pub const APP_NAME: &str = "hsconfig";

/// Qualifier used for platform directories.
pub const APP_QUALIFIER: &str = "today.hs";

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "HSCONFIG_";

#[cfg(feature = "yaml")]
const MAX_SETTINGS_FILE_SIZE: u64 = 1024 * 1024;

#[cfg(feature = "yaml")]
const SETTINGS_FILE_NAME: &str = "hsconfig.yaml";

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_REDIS_NAMESPACE: &str = "hsconfig:";
const DEFAULT_ETCD_ENDPOINT: &str = "localhost:2379";
const DEFAULT_ETCD_PREFIX: &str = "hsconfig/";
const DEFAULT_POSTGRES_URL: &str = "postgres://localhost/hsconfig";
const DEFAULT_POSTGRES_TABLE: &str = "configs";

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Cache behaviour.
    pub cache: CacheSettings,
    /// Per-request timeout in milliseconds; unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    /// Persistent store backend.
    pub store: StoreSettings,
}

/// Cache lifetimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Seconds an effective configuration stays cached.
    pub ttl_secs: u64,
    /// Seconds between physical cache sweeps.
    pub cleanup_interval_secs: u64,
}

impl CacheSettings {
    /// Returns the TTL as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Returns the sweep interval as a duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 60 * 60,
            cleanup_interval_secs: 2 * 60 * 60,
        }
    }
}

/// Which persistent store to use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreSettings {
    /// Process-local store; contents are lost on exit.
    #[default]
    Memory,
    /// A single JSON file.
    JsonFile {
        /// Location of the file.
        path: PathBuf,
    },
    /// Redis (feature `redis`).
    Redis {
        /// Connection URL.
        url: String,
        /// Key prefix, or hash key name when `hash` is set.
        namespace: String,
        /// Store every record as a field of one hash.
        #[serde(default)]
        hash: bool,
    },
    /// etcd (feature `etcd`).
    Etcd {
        /// Cluster endpoints.
        endpoints: Vec<String>,
        /// Key prefix.
        #[serde(default)]
        prefix: Option<String>,
    },
    /// PostgreSQL (feature `postgres`).
    Postgres {
        /// Connection URL.
        url: String,
        /// Table holding one row per domain.
        #[serde(default = "default_postgres_table")]
        table: String,
    },
}

fn default_postgres_table() -> String {
    DEFAULT_POSTGRES_TABLE.to_string()
}

impl StoreSettings {
    /// Returns the default settings for the backend called `kind`.
    pub fn for_backend(kind: &str) -> Result<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "json_file" | "json-file" => Ok(Self::JsonFile {
                path: JsonFileStore::default_path(APP_NAME, APP_QUALIFIER)?,
            }),
            "redis" => Ok(Self::Redis {
                url: DEFAULT_REDIS_URL.to_string(),
                namespace: DEFAULT_REDIS_NAMESPACE.to_string(),
                hash: false,
            }),
            "etcd" => Ok(Self::Etcd {
                endpoints: vec![DEFAULT_ETCD_ENDPOINT.to_string()],
                prefix: Some(DEFAULT_ETCD_PREFIX.to_string()),
            }),
            "postgres" | "postgresql" => Ok(Self::Postgres {
                url: DEFAULT_POSTGRES_URL.to_string(),
                table: default_postgres_table(),
            }),
            other => Err(ConfigError::SettingsError {
                message: format!("Unknown store backend '{}'", other),
                source: None,
            }),
        }
    }

    /// Connects to the configured store.
    pub async fn open(&self) -> Result<Arc<dyn ConfigStore>> {
        match self {
            Self::Memory => Ok(Arc::new(MemoryStore::new())),
            Self::JsonFile { path } => Ok(Arc::new(JsonFileStore::open(path).await?)),
            #[cfg(feature = "redis")]
            Self::Redis {
                url,
                namespace,
                hash,
            } => {
                use crate::adapters::{RedisStorageMode, RedisStore};
                let mode = if *hash {
                    RedisStorageMode::Hash
                } else {
                    RedisStorageMode::StringKeys
                };
                Ok(Arc::new(RedisStore::new(url, namespace, mode).await?))
            }
            #[cfg(feature = "etcd")]
            Self::Etcd { endpoints, prefix } => Ok(Arc::new(
                crate::adapters::EtcdStore::new(endpoints.clone(), prefix.as_deref()).await?,
            )),
            #[cfg(feature = "postgres")]
            Self::Postgres { url, table } => Ok(Arc::new(
                crate::adapters::PostgresStore::new(url, table).await?,
            )),
            #[allow(unreachable_patterns)]
            other => Err(ConfigError::SettingsError {
                message: format!(
                    "Store backend '{}' is not enabled in this build",
                    other.backend_name()
                ),
                source: None,
            }),
        }
    }

    /// Returns the backend name as written in settings files.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::JsonFile { .. } => "json_file",
            Self::Redis { .. } => "redis",
            Self::Etcd { .. } => "etcd",
            Self::Postgres { .. } => "postgres",
        }
    }
}

impl EngineSettings {
    /// Returns the request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Returns the directory that holds the settings file on this platform.
    pub fn config_dir() -> Result<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, "", APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::SettingsError {
                message: "Failed to determine project directories".to_string(),
                source: None,
            })
    }

    /// Loads settings: defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        #[cfg(feature = "yaml")]
        let settings = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        #[cfg(not(feature = "yaml"))]
        let settings = {
            if let Some(path) = path {
                tracing::warn!(
                    "Ignoring settings file {} (built without YAML support)",
                    path.display()
                );
            }
            Self::default()
        };

        #[cfg(feature = "env")]
        let settings = {
            let mut settings = settings;
            settings.apply_env_overrides()?;
            settings
        };

        Ok(settings)
    }

    /// Applies `HSCONFIG_*` variables from the process environment.
    #[cfg(feature = "env")]
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(std::env::vars())
    }

    /// Applies overrides from `(name, value)` pairs.
    ///
    /// Recognised names (after the `HSCONFIG_` prefix): `CACHE_TTL_SECS`,
    /// `CACHE_CLEANUP_INTERVAL_SECS`, `REQUEST_TIMEOUT_MS`, `STORE` (backend
    /// name), `STORE_PATH`, `STORE_URL`, `STORE_NAMESPACE`, `STORE_HASH`,
    /// `STORE_ENDPOINTS` (comma separated), `STORE_PREFIX` and `STORE_TABLE`.
    /// Store fields only apply to the backend they belong to.
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: std::collections::HashMap<String, String> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .map(|name| (name.to_string(), value))
            })
            .collect();
        if vars.is_empty() {
            return Ok(());
        }
        tracing::debug!("Applying {} settings overrides from the environment", vars.len());

        if let Some(value) = vars.get("CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_number("CACHE_TTL_SECS", value)?;
        }
        if let Some(value) = vars.get("CACHE_CLEANUP_INTERVAL_SECS") {
            self.cache.cleanup_interval_secs = parse_number("CACHE_CLEANUP_INTERVAL_SECS", value)?;
        }
        if let Some(value) = vars.get("REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = match value.trim() {
                "" => None,
                value => Some(parse_number("REQUEST_TIMEOUT_MS", value)?),
            };
        }
        if let Some(kind) = vars.get("STORE") {
            if kind.trim() != self.store.backend_name() {
                self.store = StoreSettings::for_backend(kind)?;
            }
        }

        match &mut self.store {
            StoreSettings::Memory => {}
            StoreSettings::JsonFile { path } => {
                if let Some(value) = vars.get("STORE_PATH") {
                    *path = PathBuf::from(value);
                }
            }
            StoreSettings::Redis {
                url,
                namespace,
                hash,
            } => {
                if let Some(value) = vars.get("STORE_URL") {
                    *url = value.clone();
                }
                if let Some(value) = vars.get("STORE_NAMESPACE") {
                    *namespace = value.clone();
                }
                if let Some(value) = vars.get("STORE_HASH") {
                    *hash = parse_bool("STORE_HASH", value)?;
                }
            }
            StoreSettings::Etcd { endpoints, prefix } => {
                if let Some(value) = vars.get("STORE_ENDPOINTS") {
                    *endpoints = value
                        .split(',')
                        .map(str::trim)
                        .filter(|endpoint| !endpoint.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                if let Some(value) = vars.get("STORE_PREFIX") {
                    *prefix = Some(value.clone()).filter(|p| !p.is_empty());
                }
            }
            StoreSettings::Postgres { url, table } => {
                if let Some(value) = vars.get("STORE_URL") {
                    *url = value.clone();
                }
                if let Some(value) = vars.get("STORE_TABLE") {
                    *table = value.clone();
                }
            }
        }

        Ok(())
    }
}

#[cfg(feature = "yaml")]
impl EngineSettings {
    /// Returns the default settings file path on this platform.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE_NAME))
    }

    /// Parses settings from YAML text; missing fields take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ConfigError::SettingsError {
            message: format!("Failed to parse settings YAML: {}", e),
            source: Some(Box::new(e)),
        })
    }

    /// Renders settings as YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SettingsError {
            message: format!("Failed to render settings YAML: {}", e),
            source: Some(Box::new(e)),
        })
    }

    /// Reads settings from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| ConfigError::SettingsError {
            message: format!("Failed to read settings file {}", path.display()),
            source: Some(Box::new(e)),
        })?;
        if metadata.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(ConfigError::SettingsError {
                message: format!(
                    "Settings file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_SETTINGS_FILE_SIZE
                ),
                source: None,
            });
        }

        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Settings written to a fresh settings file: the defaults, but with
    /// records kept in a JSON file under the platform data directory so they
    /// outlive the process.
    pub fn initial() -> Result<Self> {
        Ok(Self {
            store: StoreSettings::for_backend("json_file")?,
            ..Self::default()
        })
    }

    /// Loads settings from `path`, writing [`EngineSettings::initial`] there
    /// first if the file does not exist. Environment overrides apply on top.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            tracing::info!("Writing default settings to {}", path.display());
            std::fs::write(path, Self::initial()?.to_yaml_string()?)?;
        }
        Self::load(Some(path))
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::SettingsError {
            message: format!("{}{} must be a whole number, got '{}'", ENV_PREFIX, name, value),
            source: Some(Box::new(e)),
        })
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::SettingsError {
            message: format!("{}{} must be a boolean, got '{}'", ENV_PREFIX, name, value),
            source: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(settings.cache.cleanup_interval(), Duration::from_secs(7200));
        assert_eq!(settings.request_timeout(), None);
        assert_eq!(settings.store, StoreSettings::Memory);
    }

    #[test]
    fn test_overrides_cache_and_timeout() {
        let mut settings = EngineSettings::default();
        settings
            .apply_overrides(vars(&[
                ("HSCONFIG_CACHE_TTL_SECS", "60"),
                ("HSCONFIG_REQUEST_TIMEOUT_MS", "250"),
                ("UNRELATED", "x"),
            ]))
            .unwrap();
        assert_eq!(settings.cache.ttl_secs, 60);
        assert_eq!(settings.cache.cleanup_interval_secs, 7200);
        assert_eq!(settings.request_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_override_switches_backend() {
        let mut settings = EngineSettings::default();
        settings
            .apply_overrides(vars(&[
                ("HSCONFIG_STORE", "redis"),
                ("HSCONFIG_STORE_URL", "redis://cache:6379"),
                ("HSCONFIG_STORE_HASH", "true"),
                ("HSCONFIG_STORE_PATH", "/ignored.json"),
            ]))
            .unwrap();
        assert_eq!(
            settings.store,
            StoreSettings::Redis {
                url: "redis://cache:6379".to_string(),
                namespace: "hsconfig:".to_string(),
                hash: true,
            }
        );
    }

    #[test]
    fn test_override_etcd_endpoints() {
        let mut settings = EngineSettings {
            store: StoreSettings::Etcd {
                endpoints: vec![],
                prefix: None,
            },
            ..Default::default()
        };
        settings
            .apply_overrides(vars(&[("HSCONFIG_STORE_ENDPOINTS", "a:2379, b:2379,")]))
            .unwrap();
        assert_eq!(
            settings.store,
            StoreSettings::Etcd {
                endpoints: vec!["a:2379".to_string(), "b:2379".to_string()],
                prefix: None,
            }
        );
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let mut settings = EngineSettings::default();
        let err = settings
            .apply_overrides(vars(&[("HSCONFIG_CACHE_TTL_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::SettingsError { .. }));

        let err = settings
            .apply_overrides(vars(&[("HSCONFIG_STORE", "mongodb")]))
            .unwrap_err();
        assert!(err.to_string().contains("mongodb"));
    }

    #[test]
    fn test_override_postgres_backend() {
        let mut settings = EngineSettings::default();
        settings
            .apply_overrides(vars(&[
                ("HSCONFIG_STORE", "postgres"),
                ("HSCONFIG_STORE_URL", "postgres://db/hs"),
                ("HSCONFIG_STORE_TABLE", "domain_configs"),
            ]))
            .unwrap();
        assert_eq!(
            settings.store,
            StoreSettings::Postgres {
                url: "postgres://db/hs".to_string(),
                table: "domain_configs".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = StoreSettings::Memory.open().await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[cfg(feature = "yaml")]
    mod yaml {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let settings = EngineSettings::from_yaml_str(
                "cache:\n  ttl_secs: 5\nstore:\n  backend: json_file\n  path: /tmp/configs.json\n",
            )
            .unwrap();
            assert_eq!(settings.cache.ttl_secs, 5);
            assert_eq!(settings.cache.cleanup_interval_secs, 7200);
            assert_eq!(
                settings.store,
                StoreSettings::JsonFile {
                    path: PathBuf::from("/tmp/configs.json")
                }
            );
        }

        #[test]
        fn test_malformed_yaml_is_a_settings_error() {
            let err = EngineSettings::from_yaml_str("store: [1, 2").unwrap_err();
            assert!(matches!(err, ConfigError::SettingsError { .. }));
        }

        #[test]
        fn test_load_or_init_writes_a_persistent_store() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("nested").join("hsconfig.yaml");

            let settings = EngineSettings::load_or_init(&path).unwrap();
            assert!(path.exists());
            assert_eq!(settings.cache, CacheSettings::default());

            let written = std::fs::read_to_string(&path).unwrap();
            let written = EngineSettings::from_yaml_str(&written).unwrap();
            assert_eq!(written, EngineSettings::initial().unwrap());
            assert_eq!(
                written.store,
                StoreSettings::JsonFile {
                    path: JsonFileStore::default_path(APP_NAME, APP_QUALIFIER).unwrap()
                }
            );
        }

        #[test]
        fn test_postgres_table_defaults() {
            let settings = EngineSettings::from_yaml_str(
                "store:\n  backend: postgres\n  url: postgres://db/hs\n",
            )
            .unwrap();
            assert_eq!(
                settings.store,
                StoreSettings::Postgres {
                    url: "postgres://db/hs".to_string(),
                    table: "configs".to_string(),
                }
            );
        }

        #[test]
        fn test_load_or_init_reads_existing_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("hsconfig.yaml");
            std::fs::write(&path, "request_timeout_ms: 1500\n").unwrap();

            let settings = EngineSettings::load_or_init(&path).unwrap();
            assert_eq!(settings.request_timeout_ms, Some(1500));
        }
    }
}

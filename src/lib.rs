// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-domain configuration resolution with weighted wildcard templates.
//!
//! Every domain (for example `a.example.com`) may own a JSON object of client
//! settings. Template domains contain `*` (for example `*.example.com`) and
//! supply defaults to every domain they match. The *effective* configuration
//! of a literal domain is its own record layered over all matching templates,
//! heavier templates (by their `"hstoday.weight"` key) taking precedence over
//! lighter ones. Effective configurations are cached with a TTL and
//! invalidated on every write.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: identifiers, documents and merges, wildcard matching,
//!   deadlines, errors, and the [`DomainConfigService`](domain::DomainConfigService) contract
//! - **Ports**: the [`ConfigStore`](ports::ConfigStore) trait every backend implements
//! - **Adapters**: in-memory, JSON file, Redis, etcd and PostgreSQL stores
//! - **Service**: resolution, template registry and the cache-fronted
//!   [`CachedConfigService`](service::CachedConfigService)
//!
//! # Feature Flags
//!
//! - `yaml`: Load engine settings from YAML files (default)
//! - `env`: Override engine settings from `HSCONFIG_*` variables (default)
//! - `cli`: Build the `hsconfig` command-line tool (default)
//! - `etcd`: Enable the etcd store
//! - `redis`: Enable the Redis store
//! - `postgres`: Enable the PostgreSQL store
//! - `remote`: Enable all remote stores (etcd + redis + postgres)
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use hsconfig::prelude::*;
//! use hsconfig::adapters::MemoryStore;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let service = CachedConfigService::builder()
//!     .with_store(MemoryStore::new())
//!     .build()?;
//!
//! let catch_all = Document::from_value(json!({"hstoday.weight": 1, "theme": "light", "lang": "en"}))?;
//! let example = Document::from_value(json!({"hstoday.weight": 10, "theme": "dark"}))?;
//! service.set_config(&DomainId::from("*"), Some(catch_all), Deadline::none()).await?;
//! service.set_config(&DomainId::from("*.example.com"), Some(example), Deadline::none()).await?;
//!
//! let effective = service
//!     .get_effective_config(&DomainId::from("a.example.com"), Deadline::none())
//!     .await?;
//! assert_eq!(effective.get("theme"), Some(&json!("dark")));
//! assert_eq!(effective.get("lang"), Some(&json!("en")));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod settings;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        ConfigError, Deadline, Document, DomainConfigService, DomainId, Result, WEIGHT_KEY,
    };
    pub use crate::ports::ConfigStore;
    pub use crate::service::{CachedConfigService, ConfigServiceBuilder};
    pub use crate::settings::EngineSettings;
}

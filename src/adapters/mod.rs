// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing persistent store implementations.
//!
//! Each adapter implements the [`ConfigStore`](crate::ports::ConfigStore) port
//! for one backend. The in-memory and JSON file stores are always available;
//! remote backends are behind feature flags.

#[cfg(feature = "etcd")]
pub mod etcd;
pub mod json_file;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "redis")]
pub mod redis;

// Re-export adapters based on feature flags
#[cfg(feature = "etcd")]
pub use etcd::EtcdStore;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
#[cfg(feature = "redis")]
pub use redis::{RedisStorageMode, RedisStore};

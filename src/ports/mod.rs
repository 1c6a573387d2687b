// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! The engine depends on the outside world only through the traits defined
//! here. Implementations live in the adapters layer.

pub mod store;

// Re-export commonly used types
pub use store::ConfigStore;

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and logic.
//!
//! Everything here is independent of storage and caching: identifiers,
//! documents and their merges, wildcard matching, deadlines, errors, and the
//! service contract callers program against.

pub mod deadline;
pub mod document;
pub mod domain_id;
pub mod errors;
pub mod glob;
pub mod merge;
pub mod service;

// Re-export commonly used types
pub use deadline::Deadline;
pub use document::{Document, WEIGHT_KEY};
pub use domain_id::DomainId;
pub use errors::{ConfigError, Result};
pub use service::DomainConfigService;

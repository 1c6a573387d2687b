// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the configuration service implementation.
//!
//! [`CachedConfigService`] implements
//! [`DomainConfigService`](crate::domain::DomainConfigService) on top of any
//! [`ConfigStore`](crate::ports::ConfigStore). Resolution, template listing
//! and caching live in their own modules so each can be used on its own.

pub mod cache;
pub mod cached_service;
pub mod resolver;
pub mod template_registry;

// Re-export commonly used types
pub use cache::{ConfigCache, SweeperHandle};
pub use cached_service::{CachedConfigService, ConfigServiceBuilder};
pub use resolver::Resolver;
pub use template_registry::{Template, TemplateRegistry};

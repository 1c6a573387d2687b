// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached registry of template domains.

use crate::domain::glob::Pattern;
use crate::domain::{Deadline, DomainId, Result};
use crate::ports::ConfigStore;
use crate::service::cache::ConfigCache;
use std::sync::Arc;

/// A template domain together with its compiled pattern.
#[derive(Clone, Debug)]
pub struct Template {
    id: DomainId,
    pattern: Pattern,
}

impl Template {
    /// Compiles the template identified by `id`.
    pub fn new(id: DomainId) -> Self {
        let pattern = Pattern::new(id.as_str());
        Self { id, pattern }
    }

    /// Returns the template's identifier.
    pub fn id(&self) -> &DomainId {
        &self.id
    }

    /// Returns `true` if `domain` falls under this template.
    pub fn applies_to(&self, domain: &DomainId) -> bool {
        self.pattern.matches(domain.as_str())
    }
}

/// Lists template domains, keeping the result in the shared cache.
///
/// The snapshot lives in the same cache as effective configurations, so it
/// expires with the same TTL and is dropped by a full flush.
#[derive(Clone)]
pub struct TemplateRegistry {
    store: Arc<dyn ConfigStore>,
    cache: ConfigCache,
}

impl TemplateRegistry {
    /// Creates a registry over `store`, caching in `cache`.
    pub fn new(store: Arc<dyn ConfigStore>, cache: ConfigCache) -> Self {
        Self { store, cache }
    }

    /// Returns every template domain.
    pub async fn templates(&self, deadline: Deadline) -> Result<Arc<Vec<Template>>> {
        if let Some(templates) = self.cache.get_templates().await {
            tracing::trace!("Template list served from cache");
            return Ok(templates);
        }

        tracing::debug!("Loading template list from store '{}'", self.store.name());
        let ids = deadline
            .run(
                "list_wildcard_domains",
                "*",
                self.store.list_wildcard_domains(deadline),
            )
            .await?;

        let templates: Arc<Vec<Template>> = Arc::new(
            ids.into_iter()
                .filter(DomainId::is_template)
                .map(Template::new)
                .collect(),
        );
        self.cache.insert_templates(Arc::clone(&templates)).await;
        Ok(templates)
    }

    /// Returns the templates that apply to `domain`.
    pub async fn matching(&self, domain: &DomainId, deadline: Deadline) -> Result<Vec<Template>> {
        Ok(self
            .templates(deadline)
            .await?
            .iter()
            .filter(|template| template.applies_to(domain))
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("store", &self.store.name())
            .finish_non_exhaustive()
    }
}

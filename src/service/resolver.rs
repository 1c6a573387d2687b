// SPDX-License-Identifier: MIT OR Apache-2.0

//! Effective configuration resolution.
//!
//! The effective configuration of a literal domain is built in three steps:
//!
//! 1. Every template whose pattern matches the domain contributes its own
//!    stored record, minus the [`WEIGHT_KEY`](crate::domain::WEIGHT_KEY).
//! 2. The contributions are folded in ascending order of weight: each heavier
//!    template keeps its values and fills its gaps from the lighter ones.
//! 3. The domain's own record goes on top, filling its gaps from the fold.
//!
//! Templates are never expanded through other templates, so patterns that
//! match each other (`*` and `**`, say) cannot send resolution round in
//! circles.

use crate::domain::{Deadline, Document, DomainId, Result};
use crate::ports::ConfigStore;
use crate::service::template_registry::TemplateRegistry;
use std::sync::Arc;

/// Computes effective configurations straight from the store.
///
/// The resolver caches nothing itself apart from the template list held by
/// its [`TemplateRegistry`].
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn ConfigStore>,
    registry: TemplateRegistry,
}

impl Resolver {
    /// Creates a resolver reading from `store`.
    pub fn new(store: Arc<dyn ConfigStore>, registry: TemplateRegistry) -> Self {
        Self { store, registry }
    }

    /// Returns the template registry.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Reads the stored record for `domain` under `deadline`.
    pub async fn read_record(
        &self,
        domain: &DomainId,
        deadline: Deadline,
    ) -> Result<Option<Document>> {
        deadline
            .run(
                "get_record",
                domain.as_str(),
                self.store.get_record(domain, deadline),
            )
            .await
    }

    /// Resolves the effective configuration of `domain`.
    ///
    /// Template domains resolve to their stored record without any merging.
    pub async fn resolve(&self, domain: &DomainId, deadline: Deadline) -> Result<Document> {
        if domain.is_template() {
            return Ok(self.read_record(domain, deadline).await?.unwrap_or_default());
        }

        tracing::debug!("Calculating the complete config for domain '{}'", domain);

        let mut layers: Vec<(f64, Document)> = Vec::new();
        for template in self.registry.matching(domain, deadline).await? {
            let record = self
                .read_record(template.id(), deadline)
                .await?
                .unwrap_or_default();
            if record.has_invalid_weight() {
                tracing::warn!(
                    "Template '{}' has a non-numeric weight; treating it as 0",
                    template.id()
                );
            }
            let weight = record.weight();
            tracing::trace!(
                "Template '{}' applies to '{}' with weight {}",
                template.id(),
                domain,
                weight
            );
            layers.push((weight, record.without_weight()));
        }

        // Stable, so equal weights keep registry order.
        layers.sort_by(|a, b| a.0.total_cmp(&b.0));
        let merged = layers
            .into_iter()
            .fold(Document::new(), |lighter, (_, mut heavier)| {
                heavier.fill_missing_from(&lighter);
                heavier
            });

        let mut effective = self.read_record(domain, deadline).await?.unwrap_or_default();
        effective.fill_missing_from(&merged);
        Ok(effective)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &self.store.name())
            .field("registry", &self.registry)
            .finish()
    }
}

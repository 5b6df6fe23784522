//! Ticker symbol resolution

use crate::error::AgentError;
use crate::graph::GraphStore;
use crate::keynodes::Keynodes;
use crate::models::{EdgeKind, ElementId};
use crate::Result;
use std::sync::Arc;

/// Maps a resolved entity to its external ticker symbol.
pub struct TickerResolver {
    store: Arc<dyn GraphStore>,
    keynodes: Keynodes,
}

impl TickerResolver {
    pub fn new(store: Arc<dyn GraphStore>, keynodes: Keynodes) -> Self {
        Self { store, keynodes }
    }

    /// Return the first locale-tagged ticker literal for `entity`.
    ///
    /// No qualifying candidate is a data-coverage gap (`NoTickerKnown`),
    /// which callers must keep distinct from connectivity failures.
    pub async fn resolve_ticker(&self, entity: ElementId) -> Result<String> {
        let candidates = self
            .store
            .relation_links(entity, self.keynodes.nrel_company_cipher)
            .await?;

        for (_, link) in candidates {
            if self
                .store
                .edge_exists(EdgeKind::Membership, self.keynodes.lang, link)
                .await?
            {
                return self.store.literal_content(link).await?.ok_or_else(|| {
                    AgentError::Resolution(format!("ticker link {} has no content", link))
                });
            }
        }

        Err(AgentError::NoTickerKnown(format!(
            "no ticker for entity {} in knowledge base",
            entity
        )))
    }
}

//! Entity resolution
//!
//! Locates the subject entity of a message and its localized display name
//! via the typed graph queries.

use crate::graph::GraphStore;
use crate::keynodes::Keynodes;
use crate::models::{EdgeKind, ElementId};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod ticker;
pub use ticker::TickerResolver;

/// Resolves the subject entity of an incoming message.
pub struct EntityResolver {
    store: Arc<dyn GraphStore>,
    keynodes: Keynodes,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn GraphStore>, keynodes: Keynodes) -> Self {
        Self { store, keynodes }
    }

    /// Find the entity attached to `message` under the entity role.
    ///
    /// Zero candidates resolve to `None` (unknown-entity path). More than
    /// one candidate is ambiguous and also resolves to `None`: answering
    /// about an arbitrary first match could describe the wrong company.
    pub async fn resolve(&self, message: ElementId) -> Result<Option<ElementId>> {
        let candidates = self
            .store
            .role_targets(message, self.keynodes.rrel_entity)
            .await?;

        match candidates.as_slice() {
            [] => {
                debug!(%message, "No entity attached to message");
                Ok(None)
            }
            [entity] => Ok(Some(*entity)),
            many => {
                warn!(
                    %message,
                    candidates = many.len(),
                    "Ambiguous entity role match, treating as unresolved"
                );
                Ok(None)
            }
        }
    }

    /// Find the display-name literal for `entity`, preferring one tagged
    /// with the target locale and falling back to the first name literal
    /// with no locale filter.
    pub async fn localized_name(&self, entity: ElementId) -> Result<Option<ElementId>> {
        let candidates = self
            .store
            .relation_links(entity, self.keynodes.nrel_main_idtf)
            .await?;

        for (_, link) in &candidates {
            if self
                .store
                .edge_exists(EdgeKind::Membership, self.keynodes.lang, *link)
                .await?
            {
                return Ok(Some(*link));
            }
        }

        Ok(candidates.first().map(|(_, link)| *link))
    }
}

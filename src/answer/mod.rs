//! Answer writing
//!
//! Commits the new answer (or the canned "unknown entity" fallback) into
//! the graph and retracts any previous answer for the same entity.
//! Invalidation must always run before a commit: a commit first would leave
//! two concurrent price facts for the entity.

use crate::graph::GraphStore;
use crate::keynodes::Keynodes;
use crate::models::{EdgeKind, ElementId};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

pub struct AnswerWriter {
    store: Arc<dyn GraphStore>,
    keynodes: Keynodes,
}

impl AnswerWriter {
    pub fn new(store: Arc<dyn GraphStore>, keynodes: Keynodes) -> Self {
        Self { store, keynodes }
    }

    /// Clear the rendered-answer set and, when the entity is known, delete
    /// every existing price fact edge for it.
    ///
    /// Runs even when the entity is unresolved: a stale answer must never
    /// leak into a new "unknown" response. Idempotent; repeated calls
    /// converge to "no price fact, no stale answer".
    pub async fn invalidate(&self, entity: Option<ElementId>) -> Result<()> {
        self.store.clear_set(self.keynodes.answer_phrase).await?;

        let Some(entity) = entity else {
            return Ok(());
        };

        let stale = self
            .store
            .relation_links(entity, self.keynodes.nrel_price)
            .await?;
        for (_, link) in &stale {
            self.store
                .delete_edges(entity, *link, EdgeKind::Common)
                .await?;
        }

        if !stale.is_empty() {
            debug!(%entity, removed = stale.len(), "Stale price facts invalidated");
        }
        Ok(())
    }

    /// Attach the canned "unknown entity" literal to the answer phrase and
    /// to the action's answer slot.
    pub async fn commit_unknown(&self, action: ElementId) -> Result<ElementId> {
        let link = self.keynodes.unknown_entity_text;
        self.store
            .create_edge(EdgeKind::Membership, self.keynodes.answer_phrase, link)
            .await?;
        self.attach_answer(action, link).await?;
        Ok(link)
    }

    /// Create the price literal, the fact edge `entity → literal` tagged
    /// with the price relation, and attach the literal as the action answer.
    pub async fn commit_price(
        &self,
        action: ElementId,
        entity: ElementId,
        price: f64,
    ) -> Result<ElementId> {
        let link = self.store.create_literal(&price.to_string()).await?;
        let fact = self
            .store
            .create_edge(EdgeKind::Common, entity, link)
            .await?;
        self.store
            .create_edge(EdgeKind::Membership, self.keynodes.nrel_price, fact)
            .await?;
        self.attach_answer(action, link).await?;
        Ok(link)
    }

    async fn attach_answer(&self, action: ElementId, link: ElementId) -> Result<()> {
        let edge = self
            .store
            .create_edge(EdgeKind::Common, action, link)
            .await?;
        self.store
            .create_edge(EdgeKind::Membership, self.keynodes.nrel_answer, edge)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InMemoryGraphStore;
    use crate::keynodes::REQUIRED_SYMBOLS;

    async fn setup() -> (Arc<InMemoryGraphStore>, Keynodes, AnswerWriter) {
        let store = Arc::new(InMemoryGraphStore::new());
        for name in REQUIRED_SYMBOLS {
            if *name == "unknown_company_for_stock_price_agent_message_text" {
                store
                    .register_literal_symbol(name, "Unknown company")
                    .await;
            } else {
                store.register_symbol(name).await;
            }
        }
        let keynodes = Keynodes::resolve(store.as_ref()).await.unwrap();
        let writer = AnswerWriter::new(store.clone(), keynodes);
        (store, keynodes, writer)
    }

    #[tokio::test]
    async fn test_commit_replaces_previous_fact() {
        let (store, keynodes, writer) = setup().await;
        let entity = store.create_node().await;
        let action = store.create_node().await;

        writer.commit_price(action, entity, 100.0).await.unwrap();
        writer.invalidate(Some(entity)).await.unwrap();
        writer.commit_price(action, entity, 123.45).await.unwrap();

        let facts = store
            .relation_links(entity, keynodes.nrel_price)
            .await
            .unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(
            store.literal_content(facts[0].1).await.unwrap().as_deref(),
            Some("123.45")
        );
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let (store, keynodes, writer) = setup().await;
        let entity = store.create_node().await;
        let action = store.create_node().await;
        writer.commit_price(action, entity, 42.0).await.unwrap();

        writer.invalidate(Some(entity)).await.unwrap();
        let after_first = store.element_count().await;
        writer.invalidate(Some(entity)).await.unwrap();

        assert_eq!(store.element_count().await, after_first);
        assert!(store
            .relation_links(entity, keynodes.nrel_price)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_without_entity_clears_answer_set() {
        let (store, keynodes, writer) = setup().await;
        let action = store.create_node().await;
        writer.commit_unknown(action).await.unwrap();
        assert!(store
            .edge_exists(
                EdgeKind::Membership,
                keynodes.answer_phrase,
                keynodes.unknown_entity_text
            )
            .await
            .unwrap());

        writer.invalidate(None).await.unwrap();

        assert!(!store
            .edge_exists(
                EdgeKind::Membership,
                keynodes.answer_phrase,
                keynodes.unknown_entity_text
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unknown_answer_attached_to_action() {
        let (store, keynodes, writer) = setup().await;
        let action = store.create_node().await;

        let link = writer.commit_unknown(action).await.unwrap();

        let answers = store
            .relation_links(action, keynodes.nrel_answer)
            .await
            .unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].1, link);
    }
}

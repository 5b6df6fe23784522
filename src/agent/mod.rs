//! Stock price agent orchestrator
//!
//! One invocation walks the fixed sequence:
//! RECEIVE → VALIDATE → RESOLVE → INVALIDATE → TICKER → FETCH → COMMIT → REPORT
//!
//! Every path marks the action node finished exactly once before returning.
//! Only configuration faults (missing well-known symbols) escape; they are
//! detected at construction, never mid-invocation.

use crate::answer::AnswerWriter;
use crate::error::AgentError;
use crate::graph::GraphStore;
use crate::keynodes::Keynodes;
use crate::market::MarketData;
use crate::models::{ActionStatus, EdgeKind, ElementId, InvocationReport};
use crate::resolver::{EntityResolver, TickerResolver};
use crate::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Serializes invalidate+commit per entity. The graph store gives no
/// isolation across calls, and the hosting runtime may dispatch concurrent
/// events for the same entity.
struct EntityLocks {
    locks: Mutex<HashMap<ElementId, Arc<Mutex<()>>>>,
}

impl EntityLocks {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, entity: ElementId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(entity)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Rule-triggered agent answering "what is the stock price of X?".
pub struct StockPriceAgent {
    store: Arc<dyn GraphStore>,
    market: Arc<dyn MarketData>,
    keynodes: Keynodes,
    entities: EntityResolver,
    tickers: TickerResolver,
    answers: AnswerWriter,
    entity_locks: EntityLocks,
}

impl StockPriceAgent {
    /// Build the agent, resolving and validating the well-known symbol
    /// registry. Fails with a configuration error on a broken deployment.
    pub async fn new(store: Arc<dyn GraphStore>, market: Arc<dyn MarketData>) -> Result<Self> {
        let keynodes = Keynodes::resolve(store.as_ref()).await?;
        Ok(Self {
            entities: EntityResolver::new(store.clone(), keynodes),
            tickers: TickerResolver::new(store.clone(), keynodes),
            answers: AnswerWriter::new(store.clone(), keynodes),
            store,
            market,
            keynodes,
            entity_locks: EntityLocks::new(),
        })
    }

    /// Handle one invocation for `action`, reporting the terminal status
    /// back onto the action node before returning.
    pub async fn on_event(&self, action: ElementId) -> Result<InvocationReport> {
        let start = Instant::now();
        info!(%action, "StockPriceAgent started");

        let status = match self.run(action).await {
            Ok(status) => status,
            Err(AgentError::NoTickerKnown(cause)) => {
                warn!(%action, %cause, "Knowledge base has no ticker for the entity");
                ActionStatus::Error
            }
            Err(AgentError::HttpError(cause)) => {
                warn!(%action, %cause, "Market data source unreachable");
                ActionStatus::Error
            }
            Err(error) => {
                warn!(%action, %error, "Resolution failed");
                ActionStatus::Error
            }
        };

        self.finish_action(action, status).await?;
        info!(
            %action,
            %status,
            "StockPriceAgent finished {}",
            if status == ActionStatus::Ok { "successfully" } else { "unsuccessfully" }
        );

        Ok(InvocationReport {
            action,
            status,
            finished_at: Utc::now(),
            execution_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn run(&self, action: ElementId) -> Result<ActionStatus> {
        // === RECEIVE ===
        let arguments = self
            .store
            .role_targets(action, self.keynodes.rrel_first_argument)
            .await?;
        let message = *arguments.first().ok_or_else(|| {
            AgentError::Resolution(format!("action {} carries no message argument", action))
        })?;

        // === VALIDATE ===
        if !self
            .store
            .edge_exists(EdgeKind::Membership, self.keynodes.message_type, message)
            .await?
        {
            debug!(%message, "Message is not about stock price, skipping");
            return Ok(ActionStatus::Ok);
        }

        // === RESOLVE ===
        let entity = self.entities.resolve(message).await?;

        let Some(entity) = entity else {
            // Still clears any stale rendered answer before the fallback.
            self.answers.invalidate(None).await?;
            self.answers.commit_unknown(action).await?;
            return Ok(ActionStatus::Ok);
        };

        let lock = self.entity_locks.acquire(entity).await;
        let _guard = lock.lock().await;

        // === INVALIDATE ===
        self.answers.invalidate(Some(entity)).await?;

        let Some(name_link) = self.entities.localized_name(entity).await? else {
            self.answers.commit_unknown(action).await?;
            return Ok(ActionStatus::Ok);
        };
        let display_name = self
            .store
            .literal_content(name_link)
            .await?
            .unwrap_or_default();

        // === TICKER / FETCH ===
        let ticker = self.tickers.resolve_ticker(entity).await?;
        let price = self.market.fetch_price(&ticker).await?;

        // === COMMIT ===
        self.answers.commit_price(action, entity, price).await?;
        info!(entity = %display_name, ticker, price, "Stock price answered");

        Ok(ActionStatus::Ok)
    }

    async fn finish_action(&self, action: ElementId, status: ActionStatus) -> Result<()> {
        let class = match status {
            ActionStatus::Ok => self.keynodes.action_finished_successfully,
            ActionStatus::Error => self.keynodes.action_finished_unsuccessfully,
        };
        self.store
            .create_edge(EdgeKind::Membership, self.keynodes.action_finished, action)
            .await?;
        self.store
            .create_edge(EdgeKind::Membership, class, action)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InMemoryGraphStore;
    use crate::keynodes::REQUIRED_SYMBOLS;
    use crate::market::FixedPriceClient;

    /// Price source that fails the way a dead endpoint would.
    struct UnreachableClient;

    #[async_trait::async_trait]
    impl MarketData for UnreachableClient {
        async fn fetch_price(&self, _ticker: &str) -> Result<f64> {
            // reqwest errors cannot be constructed directly; a malformed
            // quote stands in for an infrastructure failure here.
            Err(AgentError::MalformedQuote(
                "connection refused".to_string(),
            ))
        }
    }

    struct Fixture {
        store: Arc<InMemoryGraphStore>,
        keynodes: Keynodes,
        action: ElementId,
        message: ElementId,
    }

    async fn seed_registry(store: &InMemoryGraphStore) {
        for name in REQUIRED_SYMBOLS {
            if *name == "unknown_company_for_stock_price_agent_message_text" {
                store
                    .register_literal_symbol(name, "Unknown company")
                    .await;
            } else {
                store.register_symbol(name).await;
            }
        }
    }

    /// Action + message of the stock-price type, no entity attached yet.
    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryGraphStore::new());
        seed_registry(&store).await;
        let keynodes = Keynodes::resolve(store.as_ref()).await.unwrap();

        let action = store.create_node().await;
        let message = store.create_node().await;

        let argument = store
            .create_edge(EdgeKind::Membership, action, message)
            .await
            .unwrap();
        store
            .create_edge(EdgeKind::Membership, keynodes.rrel_first_argument, argument)
            .await
            .unwrap();
        store
            .create_edge(EdgeKind::Membership, keynodes.message_type, message)
            .await
            .unwrap();

        Fixture {
            store,
            keynodes,
            action,
            message,
        }
    }

    async fn attach_entity(fx: &Fixture, name: &str, ticker: Option<&str>) -> ElementId {
        let entity = fx.store.create_node().await;
        let edge = fx
            .store
            .create_edge(EdgeKind::Membership, fx.message, entity)
            .await
            .unwrap();
        fx.store
            .create_edge(EdgeKind::Membership, fx.keynodes.rrel_entity, edge)
            .await
            .unwrap();

        let name_link = fx.store.create_literal(name).await.unwrap();
        let name_edge = fx
            .store
            .create_edge(EdgeKind::Common, entity, name_link)
            .await
            .unwrap();
        fx.store
            .create_edge(EdgeKind::Membership, fx.keynodes.nrel_main_idtf, name_edge)
            .await
            .unwrap();
        fx.store
            .create_edge(EdgeKind::Membership, fx.keynodes.lang, name_link)
            .await
            .unwrap();

        if let Some(ticker) = ticker {
            let ticker_link = fx.store.create_literal(ticker).await.unwrap();
            let ticker_edge = fx
                .store
                .create_edge(EdgeKind::Common, entity, ticker_link)
                .await
                .unwrap();
            fx.store
                .create_edge(
                    EdgeKind::Membership,
                    fx.keynodes.nrel_company_cipher,
                    ticker_edge,
                )
                .await
                .unwrap();
            fx.store
                .create_edge(EdgeKind::Membership, fx.keynodes.lang, ticker_link)
                .await
                .unwrap();
        }

        entity
    }

    async fn agent(fx: &Fixture, market: Arc<dyn MarketData>) -> StockPriceAgent {
        StockPriceAgent::new(fx.store.clone(), market)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_price_answer() {
        let fx = fixture().await;
        let entity = attach_entity(&fx, "Acme Corp", Some("ACME")).await;
        let agent = agent(&fx, Arc::new(FixedPriceClient(123.45))).await;

        let report = agent.on_event(fx.action).await.unwrap();
        assert_eq!(report.status, ActionStatus::Ok);

        let facts = fx
            .store
            .relation_links(entity, fx.keynodes.nrel_price)
            .await
            .unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(
            fx.store
                .literal_content(facts[0].1)
                .await
                .unwrap()
                .as_deref(),
            Some("123.45")
        );

        // The action's answer points at the same literal.
        let answers = fx
            .store
            .relation_links(fx.action, fx.keynodes.nrel_answer)
            .await
            .unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].1, facts[0].1);
    }

    #[tokio::test]
    async fn test_repeated_invocations_keep_at_most_one_fact() {
        let fx = fixture().await;
        let entity = attach_entity(&fx, "Acme Corp", Some("ACME")).await;
        let agent = agent(&fx, Arc::new(FixedPriceClient(123.45))).await;

        for _ in 0..3 {
            let report = agent.on_event(fx.action).await.unwrap();
            assert_eq!(report.status, ActionStatus::Ok);
        }

        let facts = fx
            .store
            .relation_links(entity, fx.keynodes.nrel_price)
            .await
            .unwrap();
        assert_eq!(facts.len(), 1);
    }

    #[tokio::test]
    async fn test_irrelevant_message_is_a_no_op() {
        let fx = fixture().await;
        attach_entity(&fx, "Acme Corp", Some("ACME")).await;
        // Retract the type tag; another agent owns this message.
        fx.store
            .delete_edges(fx.keynodes.message_type, fx.message, EdgeKind::Membership)
            .await
            .unwrap();
        let before = fx.store.element_count().await;

        let agent = agent(&fx, Arc::new(FixedPriceClient(123.45))).await;
        let report = agent.on_event(fx.action).await.unwrap();

        assert_eq!(report.status, ActionStatus::Ok);
        // Only the two completion edges were added; no answer, no fact.
        assert_eq!(fx.store.element_count().await, before + 2);
        assert!(fx
            .store
            .relation_links(fx.action, fx.keynodes.nrel_answer)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_entity_fallback() {
        let fx = fixture().await;
        let agent = agent(&fx, Arc::new(FixedPriceClient(123.45))).await;

        let report = agent.on_event(fx.action).await.unwrap();
        assert_eq!(report.status, ActionStatus::Ok);

        let answers = fx
            .store
            .relation_links(fx.action, fx.keynodes.nrel_answer)
            .await
            .unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].1, fx.keynodes.unknown_entity_text);
        assert!(fx
            .store
            .edge_exists(
                EdgeKind::Membership,
                fx.keynodes.answer_phrase,
                fx.keynodes.unknown_entity_text
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_missing_ticker_reports_error() {
        let fx = fixture().await;
        attach_entity(&fx, "Acme Corp", None).await;
        let agent = agent(&fx, Arc::new(FixedPriceClient(123.45))).await;

        let report = agent.on_event(fx.action).await.unwrap();
        assert_eq!(report.status, ActionStatus::Error);
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_error_after_invalidation() {
        let fx = fixture().await;
        let entity = attach_entity(&fx, "Acme Corp", Some("ACME")).await;
        let keynodes = fx.keynodes;

        // Seed a stale fact from an earlier invocation.
        {
            let writer = AnswerWriter::new(fx.store.clone(), keynodes);
            writer.commit_price(fx.action, entity, 99.0).await.unwrap();
        }

        let agent = agent(&fx, Arc::new(UnreachableClient)).await;
        let report = agent.on_event(fx.action).await.unwrap();

        assert_eq!(report.status, ActionStatus::Error);
        // Invalidation already ran; no new commit happened.
        assert!(fx
            .store
            .relation_links(entity, keynodes.nrel_price)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_action_without_argument_reports_error() {
        let fx = fixture().await;
        let bare_action = fx.store.create_node().await;
        let agent = agent(&fx, Arc::new(FixedPriceClient(123.45))).await;

        let report = agent.on_event(bare_action).await.unwrap();
        assert_eq!(report.status, ActionStatus::Error);
        assert!(fx
            .store
            .edge_exists(
                EdgeKind::Membership,
                fx.keynodes.action_finished_unsuccessfully,
                bare_action
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_completion_marked_on_success() {
        let fx = fixture().await;
        attach_entity(&fx, "Acme Corp", Some("ACME")).await;
        let agent = agent(&fx, Arc::new(FixedPriceClient(123.45))).await;

        agent.on_event(fx.action).await.unwrap();

        assert!(fx
            .store
            .edge_exists(
                EdgeKind::Membership,
                fx.keynodes.action_finished,
                fx.action
            )
            .await
            .unwrap());
        assert!(fx
            .store
            .edge_exists(
                EdgeKind::Membership,
                fx.keynodes.action_finished_successfully,
                fx.action
            )
            .await
            .unwrap());
    }
}

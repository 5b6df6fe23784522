//! Well-known symbol registry
//!
//! Every graph symbol the workflow depends on is resolved once, up front.
//! A missing symbol is a deployment fault and fails agent construction;
//! per-invocation code never resolves registry names lazily.

use crate::error::AgentError;
use crate::graph::GraphStore;
use crate::models::ElementId;
use crate::Result;
use tracing::debug;

/// Resolved addresses of the symbols this agent requires.
///
/// The identifier strings are an external contract with the shared
/// knowledge base and must match its registry verbatim.
#[derive(Debug, Clone, Copy)]
pub struct Keynodes {
    /// Class of messages asking for a stock price.
    pub message_type: ElementId,
    /// Role relation attaching the first action argument.
    pub rrel_first_argument: ElementId,
    /// Role relation marking the subject entity on a message.
    pub rrel_entity: ElementId,
    /// Relation from an entity to its display-name literals.
    pub nrel_main_idtf: ElementId,
    /// Relation from an entity to its ticker-symbol literals.
    pub nrel_company_cipher: ElementId,
    /// Relation tagging price fact edges.
    pub nrel_price: ElementId,
    /// Relation attaching an answer link to an action node.
    pub nrel_answer: ElementId,
    /// Target locale tag on literals.
    pub lang: ElementId,
    /// Answer-phrase concept whose member set holds rendered answers.
    pub answer_phrase: ElementId,
    /// Canned "unknown company" literal.
    pub unknown_entity_text: ElementId,
    /// Completion classes for action nodes.
    pub action_finished: ElementId,
    pub action_finished_successfully: ElementId,
    pub action_finished_unsuccessfully: ElementId,
}

const MESSAGE_TYPE: &str = "concept_message_about_stock_price";
const RREL_FIRST_ARGUMENT: &str = "rrel_1";
const RREL_ENTITY: &str = "rrel_entity";
const NREL_MAIN_IDTF: &str = "nrel_main_idtf";
const NREL_COMPANY_CIPHER: &str = "nrel_company_cipher";
const NREL_PRICE: &str = "nrel_price";
const NREL_ANSWER: &str = "nrel_answer";
const LANG: &str = "lang_ru";
const ANSWER_PHRASE: &str = "show_stock_price_answer_phrase";
const UNKNOWN_ENTITY_TEXT: &str = "unknown_company_for_stock_price_agent_message_text";
const ACTION_FINISHED: &str = "action_finished";
const ACTION_FINISHED_SUCCESSFULLY: &str = "action_finished_successfully";
const ACTION_FINISHED_UNSUCCESSFULLY: &str = "action_finished_unsuccessfully";

/// Registry names required by this agent, in resolution order.
pub const REQUIRED_SYMBOLS: &[&str] = &[
    MESSAGE_TYPE,
    RREL_FIRST_ARGUMENT,
    RREL_ENTITY,
    NREL_MAIN_IDTF,
    NREL_COMPANY_CIPHER,
    NREL_PRICE,
    NREL_ANSWER,
    LANG,
    ANSWER_PHRASE,
    UNKNOWN_ENTITY_TEXT,
    ACTION_FINISHED,
    ACTION_FINISHED_SUCCESSFULLY,
    ACTION_FINISHED_UNSUCCESSFULLY,
];

impl Keynodes {
    /// Resolve and validate all required symbols against the store.
    pub async fn resolve(store: &dyn GraphStore) -> Result<Self> {
        let keynodes = Self {
            message_type: required(store, MESSAGE_TYPE).await?,
            rrel_first_argument: required(store, RREL_FIRST_ARGUMENT).await?,
            rrel_entity: required(store, RREL_ENTITY).await?,
            nrel_main_idtf: required(store, NREL_MAIN_IDTF).await?,
            nrel_company_cipher: required(store, NREL_COMPANY_CIPHER).await?,
            nrel_price: required(store, NREL_PRICE).await?,
            nrel_answer: required(store, NREL_ANSWER).await?,
            lang: required(store, LANG).await?,
            answer_phrase: required(store, ANSWER_PHRASE).await?,
            unknown_entity_text: required(store, UNKNOWN_ENTITY_TEXT).await?,
            action_finished: required(store, ACTION_FINISHED).await?,
            action_finished_successfully: required(store, ACTION_FINISHED_SUCCESSFULLY).await?,
            action_finished_unsuccessfully: required(store, ACTION_FINISHED_UNSUCCESSFULLY).await?,
        };
        debug!(count = REQUIRED_SYMBOLS.len(), "Well-known symbols resolved");
        Ok(keynodes)
    }
}

async fn required(store: &dyn GraphStore, name: &str) -> Result<ElementId> {
    store
        .resolve_symbol(name)
        .await?
        .ok_or_else(|| AgentError::Configuration(format!("missing well-known symbol '{}'", name)))
}

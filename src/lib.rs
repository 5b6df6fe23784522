//! Stock Price Agent
//!
//! A rule-triggered agent over a shared semantic knowledge graph that:
//! - Validates that an incoming message asks about a stock price
//! - Resolves the subject entity and its localized display name
//! - Maps the entity to an external ticker symbol
//! - Fetches a live quote from the market data source
//! - Writes the answer back as a graph fact, retracting any stale one
//!
//! WORKFLOW:
//! RECEIVE → VALIDATE → RESOLVE → INVALIDATE → TICKER → FETCH → COMMIT → REPORT

pub mod agent;
pub mod answer;
pub mod error;
pub mod graph;
pub mod keynodes;
pub mod market;
pub mod models;
pub mod resolver;

pub use error::Result;

// Re-export common types
pub use agent::StockPriceAgent;
pub use models::*;

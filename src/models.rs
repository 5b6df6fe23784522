//! Core data models for the stock price agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Graph Elements =================
//

/// Address of a node, edge, or literal link in the graph store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ElementId(pub Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edge kinds used by the workflow.
///
/// `Membership` covers class membership and role/relation tagging;
/// `Common` is the directed fact edge between an entity and a literal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Membership,
    Common,
}

//
// ================= Invocation Outcome =================
//

/// Terminal status reported back to the hosting runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionStatus {
    Ok,
    Error,
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionStatus::Ok => "OK",
            ActionStatus::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Summary of one handled invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationReport {
    pub action: ElementId,
    pub status: ActionStatus,
    pub finished_at: DateTime<Utc>,
    pub execution_time_ms: u64,
}

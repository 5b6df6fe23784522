//! Graph store capability trait
//!
//! The shared semantic graph is an external collaborator. Instead of a
//! generic pattern-template API, the trait exposes one typed query per
//! pattern shape the workflow actually uses, so a shape mismatch is a
//! compile error rather than a malformed template at runtime.

use crate::models::{EdgeKind, ElementId};
use crate::Result;

pub mod memory;
pub use memory::InMemoryGraphStore;

/// Synchronous-in-effect, strongly-consistent graph store interface.
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    /// Resolve a well-known symbol by its registry name.
    async fn resolve_symbol(&self, name: &str) -> Result<Option<ElementId>>;

    /// Pattern: `source -membership-> X`, where the membership edge itself
    /// is tagged `role -membership-> edge`. Returns the `X` endpoints in
    /// deterministic (insertion) order.
    async fn role_targets(&self, source: ElementId, role: ElementId) -> Result<Vec<ElementId>>;

    /// Pattern: `source =common=> literal`, where the common edge is tagged
    /// `relation -membership-> edge`. Returns `(fact edge, literal)` pairs
    /// in deterministic (insertion) order.
    async fn relation_links(
        &self,
        source: ElementId,
        relation: ElementId,
    ) -> Result<Vec<(ElementId, ElementId)>>;

    async fn edge_exists(&self, kind: EdgeKind, from: ElementId, to: ElementId) -> Result<bool>;

    /// Read the text content of a literal link.
    async fn literal_content(&self, link: ElementId) -> Result<Option<String>>;

    async fn create_literal(&self, value: &str) -> Result<ElementId>;

    async fn create_edge(
        &self,
        kind: EdgeKind,
        from: ElementId,
        to: ElementId,
    ) -> Result<ElementId>;

    /// Delete every `kind` edge between `from` and `to`, cascading to edges
    /// incident to the deleted ones (relation tags must not dangle).
    async fn delete_edges(&self, from: ElementId, to: ElementId, kind: EdgeKind) -> Result<()>;

    /// Remove all membership edges leaving `set`.
    async fn clear_set(&self, set: ElementId) -> Result<()>;
}

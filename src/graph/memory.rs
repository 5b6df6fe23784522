//! In-memory graph store
//!
//! Reference implementation of [`GraphStore`] for development and tests.
//! Production deployments point the agent at the shared knowledge base
//! instead; this store only has to honor the same query/mutation contract.

use crate::graph::GraphStore;
use crate::models::{EdgeKind, ElementId};
use crate::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
enum Element {
    Node,
    Edge {
        kind: EdgeKind,
        from: ElementId,
        to: ElementId,
    },
    Literal(String),
}

#[derive(Default)]
struct Inner {
    elements: HashMap<ElementId, Element>,
    // Insertion log; queries iterate this so results are deterministic.
    order: Vec<ElementId>,
    symbols: HashMap<String, ElementId>,
}

impl Inner {
    fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId::new();
        self.elements.insert(id, element);
        self.order.push(id);
        id
    }

    fn edges(&self) -> impl Iterator<Item = (ElementId, EdgeKind, ElementId, ElementId)> + '_ {
        self.order.iter().filter_map(|id| match self.elements.get(id) {
            Some(Element::Edge { kind, from, to }) => Some((*id, *kind, *from, *to)),
            _ => None,
        })
    }

    fn is_tagged(&self, tag: ElementId, element: ElementId) -> bool {
        self.edges()
            .any(|(_, kind, from, to)| kind == EdgeKind::Membership && from == tag && to == element)
    }

    /// Remove the given edges plus everything transitively incident to them.
    fn remove_cascading(&mut self, seed: Vec<ElementId>) {
        let mut doomed: HashSet<ElementId> = seed.into_iter().collect();
        loop {
            let dangling: Vec<ElementId> = self
                .edges()
                .filter(|(id, _, from, to)| {
                    !doomed.contains(id) && (doomed.contains(from) || doomed.contains(to))
                })
                .map(|(id, _, _, _)| id)
                .collect();
            if dangling.is_empty() {
                break;
            }
            doomed.extend(dangling);
        }
        self.elements.retain(|id, _| !doomed.contains(id));
        self.order.retain(|id| !doomed.contains(id));
    }
}

/// In-memory graph store for development and tests.
pub struct InMemoryGraphStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Create an anonymous node (seeding API, not part of the trait).
    pub async fn create_node(&self) -> ElementId {
        let mut inner = self.inner.write().await;
        inner.insert(Element::Node)
    }

    /// Create a node and bind it to a registry name.
    pub async fn register_symbol(&self, name: &str) -> ElementId {
        let mut inner = self.inner.write().await;
        if let Some(id) = inner.symbols.get(name) {
            return *id;
        }
        let id = inner.insert(Element::Node);
        inner.symbols.insert(name.to_string(), id);
        id
    }

    /// Create a literal and bind it to a registry name (canned texts).
    pub async fn register_literal_symbol(&self, name: &str, value: &str) -> ElementId {
        let mut inner = self.inner.write().await;
        if let Some(id) = inner.symbols.get(name) {
            return *id;
        }
        let id = inner.insert(Element::Literal(value.to_string()));
        inner.symbols.insert(name.to_string(), id);
        id
    }

    /// Total number of live elements (test observability).
    pub async fn element_count(&self) -> usize {
        self.inner.read().await.order.len()
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn resolve_symbol(&self, name: &str) -> Result<Option<ElementId>> {
        let inner = self.inner.read().await;
        Ok(inner.symbols.get(name).copied())
    }

    async fn role_targets(&self, source: ElementId, role: ElementId) -> Result<Vec<ElementId>> {
        let inner = self.inner.read().await;
        let targets = inner
            .edges()
            .filter(|(id, kind, from, _)| {
                *kind == EdgeKind::Membership && *from == source && inner.is_tagged(role, *id)
            })
            .map(|(_, _, _, to)| to)
            .collect();
        Ok(targets)
    }

    async fn relation_links(
        &self,
        source: ElementId,
        relation: ElementId,
    ) -> Result<Vec<(ElementId, ElementId)>> {
        let inner = self.inner.read().await;
        let links = inner
            .edges()
            .filter(|(id, kind, from, to)| {
                *kind == EdgeKind::Common
                    && *from == source
                    && matches!(inner.elements.get(to), Some(Element::Literal(_)))
                    && inner.is_tagged(relation, *id)
            })
            .map(|(id, _, _, to)| (id, to))
            .collect();
        Ok(links)
    }

    async fn edge_exists(&self, kind: EdgeKind, from: ElementId, to: ElementId) -> Result<bool> {
        let inner = self.inner.read().await;
        let exists = inner
            .edges()
            .any(|(_, k, f, t)| k == kind && f == from && t == to);
        Ok(exists)
    }

    async fn literal_content(&self, link: ElementId) -> Result<Option<String>> {
        let inner = self.inner.read().await;
        Ok(match inner.elements.get(&link) {
            Some(Element::Literal(value)) => Some(value.clone()),
            _ => None,
        })
    }

    async fn create_literal(&self, value: &str) -> Result<ElementId> {
        let mut inner = self.inner.write().await;
        Ok(inner.insert(Element::Literal(value.to_string())))
    }

    async fn create_edge(
        &self,
        kind: EdgeKind,
        from: ElementId,
        to: ElementId,
    ) -> Result<ElementId> {
        let mut inner = self.inner.write().await;
        Ok(inner.insert(Element::Edge { kind, from, to }))
    }

    async fn delete_edges(&self, from: ElementId, to: ElementId, kind: EdgeKind) -> Result<()> {
        let mut inner = self.inner.write().await;
        let doomed: Vec<ElementId> = inner
            .edges()
            .filter(|(_, k, f, t)| *k == kind && *f == from && *t == to)
            .map(|(id, _, _, _)| id)
            .collect();
        inner.remove_cascading(doomed);
        Ok(())
    }

    async fn clear_set(&self, set: ElementId) -> Result<()> {
        let mut inner = self.inner.write().await;
        let doomed: Vec<ElementId> = inner
            .edges()
            .filter(|(_, kind, from, _)| *kind == EdgeKind::Membership && *from == set)
            .map(|(id, _, _, _)| id)
            .collect();
        inner.remove_cascading(doomed);
        Ok(())
    }
}

//! In-memory index over the concept edges of a single relationship kind.
//!
//! The store loads the edges of one kind and asks this module whether a new
//! edge would close a cycle, or walks ancestors and descendants. Cycles are
//! only forbidden among edges of the same kind, so each [`ConceptGraph`]
//! holds exactly one kind.
//!
//! Edges point from the dependent concept to the concept it depends on:
//!
//! ```text
//!        G            ancestors(C)   = P1, P2, G
//!       / \           descendants(G) = P1, P2, C
//!     P1   P2
//!       \ /
//!        C
//! ```

use std::collections::{BTreeSet, HashMap};

use rustworkx_core::petgraph::Direction;
use rustworkx_core::petgraph::algo::has_path_connecting;
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex};
use rustworkx_core::petgraph::visit::{Bfs, Reversed, Visitable};

use crate::entities::ConceptEdge;
use crate::enums::Relationship;

type Graph = DiGraph<String, ()>;
type VisitMap = <Graph as Visitable>::Map;

/// Directed graph of concept ids for one relationship kind.
///
/// Nodes are never removed, so indices stay valid for the life of the graph.
#[derive(Debug, Clone)]
pub struct ConceptGraph {
    relationship: Relationship,
    graph: Graph,
    id_to_index: HashMap<String, NodeIndex>,
}

impl ConceptGraph {
    #[must_use]
    pub fn new(relationship: Relationship) -> Self {
        Self {
            relationship,
            graph: DiGraph::new(),
            id_to_index: HashMap::new(),
        }
    }

    /// Build an index from `edges`, ignoring edges of other kinds.
    ///
    /// Neighbors of a graph built here are visited in ascending id order.
    #[must_use]
    pub fn from_edges<'e>(
        relationship: Relationship,
        edges: impl IntoIterator<Item = &'e ConceptEdge>,
    ) -> Self {
        let mut kept: Vec<&ConceptEdge> = edges
            .into_iter()
            .filter(|edge| edge.relationship == relationship)
            .collect();
        // petgraph walks adjacency lists newest first
        kept.sort_by(|a, b| (&b.to_id, &b.from_id).cmp(&(&a.to_id, &a.from_id)));

        let mut graph = Self::new(relationship);
        for edge in kept {
            graph.insert(&edge.from_id, &edge.to_id);
        }
        graph
    }

    #[must_use]
    pub const fn relationship(&self) -> Relationship {
        self.relationship
    }

    fn index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(idx) = self.index(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.id_to_index.insert(id.to_string(), idx);
        idx
    }

    /// Returns `false` if the edge was already present.
    pub fn insert(&mut self, from: &str, to: &str) -> bool {
        let from = self.ensure_node(from);
        let to = self.ensure_node(to);
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Returns `false` if the edge was not present.
    pub fn remove(&mut self, from: &str, to: &str) -> bool {
        let edge = self
            .index(from)
            .zip(self.index(to))
            .and_then(|(from, to)| self.graph.find_edge(from, to));
        edge.is_some_and(|edge| self.graph.remove_edge(edge).is_some())
    }

    #[must_use]
    pub fn contains(&self, from: &str, to: &str) -> bool {
        self.index(from)
            .zip(self.index(to))
            .is_some_and(|(from, to)| self.graph.find_edge(from, to).is_some())
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether adding `from -> to` would close a cycle, i.e. whether `from`
    /// is already reachable from `to`.
    #[must_use]
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        match (self.index(from), self.index(to)) {
            (Some(from), Some(to)) => has_path_connecting(&self.graph, to, from, None),
            _ => false,
        }
    }

    /// Concepts reached by following edges out of `id`, nearest first.
    ///
    /// The walk is lazy and each concept is yielded at most once, even when
    /// several paths reach it. `id` itself is never yielded.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Walk<'_> {
        Walk::new(&self.graph, self.index(id), Direction::Outgoing)
    }

    /// Concepts that reach `id` by following edges, nearest first.
    #[must_use]
    pub fn descendants(&self, id: &str) -> Walk<'_> {
        Walk::new(&self.graph, self.index(id), Direction::Incoming)
    }

    /// `root` plus every descendant of it.
    #[must_use]
    pub fn subtree(&self, root: &str) -> BTreeSet<String> {
        let mut ids: BTreeSet<String> = self.descendants(root).map(str::to_string).collect();
        ids.insert(root.to_string());
        ids
    }

    /// Concepts `id` points to directly.
    pub fn targets(&self, id: &str) -> impl Iterator<Item = &str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Concepts pointing directly at `id`.
    pub fn sources(&self, id: &str) -> impl Iterator<Item = &str> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> impl Iterator<Item = &str> {
        self.index(id)
            .into_iter()
            .flat_map(move |idx| self.graph.neighbors_directed(idx, direction))
            .map(|idx| self.graph[idx].as_str())
    }
}

/// Breadth-first walk over one direction of a [`ConceptGraph`].
///
/// Cloning a walk forks it: both copies continue independently from the same
/// point. Calling [`ConceptGraph::ancestors`] again restarts from the origin.
#[derive(Clone)]
pub struct Walk<'a> {
    graph: &'a Graph,
    bfs: Option<Bfs<NodeIndex, VisitMap>>,
    direction: Direction,
}

impl<'a> Walk<'a> {
    fn new(graph: &'a Graph, origin: Option<NodeIndex>, direction: Direction) -> Self {
        let mut walk = Self {
            graph,
            bfs: origin.map(|start| Bfs::new(graph, start)),
            direction,
        };
        // the first step yields the origin itself
        walk.next();
        walk
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        let bfs = self.bfs.as_mut()?;
        let idx = match self.direction {
            Direction::Outgoing => bfs.next(graph),
            Direction::Incoming => bfs.next(Reversed(graph)),
        }?;
        Some(graph[idx].as_str())
    }
}

impl std::fmt::Debug for Walk<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("direction", &self.direction)
            .field("pending", &self.bfs.as_ref().map_or(0, |bfs| bfs.stack.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn edge(from: &str, to: &str, relationship: Relationship) -> ConceptEdge {
        ConceptEdge {
            from_id: from.into(),
            to_id: to.into(),
            relationship,
        }
    }

    fn diamond() -> ConceptGraph {
        let edges = [
            edge("c", "p1", Relationship::Parent),
            edge("c", "p2", Relationship::Parent),
            edge("p1", "g", Relationship::Parent),
            edge("p2", "g", Relationship::Parent),
        ];
        ConceptGraph::from_edges(Relationship::Parent, &edges)
    }

    #[test]
    fn diamond_ancestors_yield_each_node_once() {
        let graph = diamond();
        let ancestors: Vec<&str> = graph.ancestors("c").collect();
        assert_eq!(ancestors, vec!["p1", "p2", "g"]);
    }

    #[test]
    fn diamond_descendants_yield_each_node_once() {
        let graph = diamond();
        let descendants: Vec<&str> = graph.descendants("g").collect();
        assert_eq!(descendants, vec!["p1", "p2", "c"]);
    }

    #[test]
    fn walk_is_restartable_and_forkable() {
        let graph = diamond();
        let mut walk = graph.ancestors("c");
        assert_eq!(walk.next(), Some("p1"));

        let fork = walk.clone();
        assert_eq!(walk.collect::<Vec<_>>(), vec!["p2", "g"]);
        assert_eq!(fork.collect::<Vec<_>>(), vec!["p2", "g"]);

        assert_eq!(graph.ancestors("c").count(), 3);
    }

    #[test]
    fn walk_of_unknown_concept_is_empty() {
        let graph = diamond();
        assert_eq!(graph.ancestors("missing").next(), None);
        assert_eq!(graph.ancestors("g").next(), None);
    }

    #[test]
    fn from_edges_keeps_only_its_kind() {
        let edges = [
            edge("a", "b", Relationship::Parent),
            edge("b", "a", Relationship::Prerequisite),
            edge("a", "c", Relationship::Related),
        ];
        let graph = ConceptGraph::from_edges(Relationship::Parent, &edges);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains("a", "b"));
        assert!(!graph.contains("b", "a"));
    }

    #[test]
    fn detects_direct_and_transitive_cycles() {
        let graph = diamond();
        assert!(graph.would_create_cycle("g", "c"));
        assert!(graph.would_create_cycle("p1", "c"));
        assert!(graph.would_create_cycle("c", "c"));
        assert!(!graph.would_create_cycle("c", "g"));
        assert!(!graph.would_create_cycle("p1", "p2"));
    }

    #[test]
    fn cycles_in_other_kinds_do_not_count() {
        let edges = [
            edge("a", "b", Relationship::Parent),
            edge("b", "c", Relationship::Prerequisite),
        ];
        let prerequisites = ConceptGraph::from_edges(Relationship::Prerequisite, &edges);
        assert!(!prerequisites.would_create_cycle("c", "a"));
        assert!(!prerequisites.would_create_cycle("b", "a"));
    }

    #[test]
    fn walk_terminates_on_cyclic_edges() {
        let edges = [
            edge("a", "b", Relationship::Related),
            edge("b", "c", Relationship::Related),
            edge("c", "a", Relationship::Related),
        ];
        let graph = ConceptGraph::from_edges(Relationship::Related, &edges);
        assert_eq!(graph.ancestors("a").collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut graph = diamond();
        assert!(graph.remove("c", "p1"));
        assert!(!graph.remove("c", "p1"));
        assert_eq!(graph.ancestors("c").collect::<Vec<_>>(), vec!["p2", "g"]);
        assert_eq!(graph.descendants("p1").next(), None);
    }

    #[test]
    fn subtree_includes_root() {
        let graph = diamond();
        let subtree = graph.subtree("p1");
        assert_eq!(
            subtree.into_iter().collect::<Vec<_>>(),
            vec!["c".to_string(), "p1".to_string()]
        );
    }

    #[test]
    fn long_chain_is_checked_without_recursion() {
        let ids: Vec<String> = (0..5_000).map(|n| format!("n{n:05}")).collect();
        let edges: Vec<ConceptEdge> = ids
            .windows(2)
            .map(|pair| edge(&pair[0], &pair[1], Relationship::Prerequisite))
            .collect();
        let graph = ConceptGraph::from_edges(Relationship::Prerequisite, &edges);

        assert!(graph.would_create_cycle("n04999", "n00000"));
        assert!(!graph.would_create_cycle("n00000", "n04999"));
        assert_eq!(graph.ancestors("n00000").count(), 4_999);
        assert_eq!(graph.descendants("n04999").last(), Some("n00000"));
    }

    #[test]
    fn edges_inserted_later_are_walked() {
        let mut graph = diamond();
        assert!(graph.insert("g", "root"));
        assert!(!graph.insert("g", "root"));
        assert!(graph.would_create_cycle("root", "c"));
        assert_eq!(graph.ancestors("c").collect::<Vec<_>>(), vec!["p1", "p2", "g", "root"]);
        assert_eq!(graph.subtree("root").len(), 5);
    }

    #[test]
    fn direct_neighbors() {
        let graph = diamond();
        assert_eq!(graph.targets("c").collect::<Vec<_>>(), vec!["p1", "p2"]);
        assert_eq!(graph.sources("g").collect::<Vec<_>>(), vec!["p1", "p2"]);
    }
}

//! skeleton.rs
//! The undirected adjacency structure pruned during skeleton discovery.

use super::node::{VarId, VarPair};
use petgraph::graphmap::UnGraphMap;
use std::collections::BTreeSet;

/// A simple undirected graph over the run's variables.
///
/// Starts complete and only ever loses edges. Neighbour queries return ordered
/// sets so that callers iterate in name order without re-sorting.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    graph: UnGraphMap<VarId, ()>,
    var_count: usize,
}

impl Skeleton {
    /// The complete graph over `var_count` variables.
    pub fn complete(var_count: usize) -> Self {
        let mut graph = UnGraphMap::with_capacity(var_count, var_count * var_count.saturating_sub(1) / 2);
        for i in 0..var_count {
            graph.add_node(VarId::new(i));
        }
        for i in 0..var_count {
            for j in (i + 1)..var_count {
                graph.add_edge(VarId::new(i), VarId::new(j), ());
            }
        }
        Self { graph, var_count }
    }

    /// A skeleton holding exactly the given edges. Self-loops are ignored.
    pub fn from_edges(var_count: usize, edges: impl IntoIterator<Item = (VarId, VarId)>) -> Self {
        let mut graph = UnGraphMap::with_capacity(var_count, 0);
        for i in 0..var_count {
            graph.add_node(VarId::new(i));
        }
        for (a, b) in edges {
            if a != b {
                graph.add_edge(a, b, ());
            }
        }
        Self { graph, var_count }
    }

    pub fn var_count(&self) -> usize { self.var_count }

    pub fn edge_count(&self) -> usize { self.graph.edge_count() }

    pub fn has_edge(&self, a: VarId, b: VarId) -> bool {
        a != b && self.graph.contains_edge(a, b)
    }

    /// Removes the edge `a - b`. Returns `false` if it was already absent.
    pub fn remove_edge(&mut self, a: VarId, b: VarId) -> bool {
        self.graph.remove_edge(a, b).is_some()
    }

    pub fn neighbors(&self, v: VarId) -> BTreeSet<VarId> {
        if !self.graph.contains_node(v) {
            return BTreeSet::new();
        }
        self.graph.neighbors(v).collect()
    }

    pub fn common_neighbors(&self, a: VarId, b: VarId) -> BTreeSet<VarId> {
        let na = self.neighbors(a);
        let nb = self.neighbors(b);
        na.intersection(&nb).copied().collect()
    }

    /// All edges as canonical pairs, in sorted order.
    pub fn edges(&self) -> Vec<VarPair> {
        let set: BTreeSet<VarPair> = self
            .graph
            .all_edges()
            .map(|(a, b, _)| VarPair::new(a, b))
            .collect();
        set.into_iter().collect()
    }

    /// All non-adjacent pairs of distinct variables, in sorted order.
    pub fn non_adjacent_pairs(&self) -> Vec<VarPair> {
        let mut pairs = Vec::new();
        for i in 0..self.var_count {
            for j in (i + 1)..self.var_count {
                let (a, b) = (VarId::new(i), VarId::new(j));
                if !self.has_edge(a, b) {
                    pairs.push(VarPair::new(a, b));
                }
            }
        }
        pairs
    }
}

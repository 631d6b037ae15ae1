//! dag.rs
//! The directed-edge set mutated by the orientation stages, with the
//! reachability queries used to keep it acyclic.

use super::node::{VarId, VarPair};
use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, BTreeSet};

/// A set of ordered pairs `(u, v)` meaning `u -> v`.
///
/// May briefly hold both `(u, v)` and `(v, u)` for a pair (a conflict) until the
/// conflict resolver has run. Iteration is in sorted `(u, v)` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectedEdges {
    edges: BTreeSet<(VarId, VarId)>,
}

impl DirectedEdges {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, from: VarId, to: VarId) -> bool { self.edges.insert((from, to)) }
    pub fn remove(&mut self, from: VarId, to: VarId) -> bool { self.edges.remove(&(from, to)) }
    pub fn contains(&self, from: VarId, to: VarId) -> bool { self.edges.contains(&(from, to)) }

    /// `from -> to` is present and its reverse is not.
    pub fn is_oriented(&self, from: VarId, to: VarId) -> bool {
        self.contains(from, to) && !self.contains(to, from)
    }

    /// Neither direction is present.
    pub fn is_unoriented(&self, a: VarId, b: VarId) -> bool {
        !self.contains(a, b) && !self.contains(b, a)
    }

    pub fn len(&self) -> usize { self.edges.len() }
    pub fn is_empty(&self) -> bool { self.edges.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, VarId)> + '_ {
        self.edges.iter().copied()
    }

    /// A sorted copy, for scans that mutate the set while iterating.
    pub fn snapshot(&self) -> Vec<(VarId, VarId)> { self.iter().collect() }

    /// Pairs holding both directions, as canonical pairs in sorted order.
    pub fn bidirectional_pairs(&self) -> Vec<VarPair> {
        let set: BTreeSet<VarPair> = self
            .iter()
            .filter(|&(u, v)| self.contains(v, u))
            .map(|(u, v)| VarPair::new(u, v))
            .collect();
        set.into_iter().collect()
    }

    /// Head -> sorted tails, over every edge in the set.
    pub fn parents_by_head(&self) -> BTreeMap<VarId, Vec<VarId>> {
        let mut map: BTreeMap<VarId, Vec<VarId>> = BTreeMap::new();
        for (u, v) in self.iter() {
            map.entry(v).or_default().push(u);
        }
        // BTreeSet iteration yields tails already sorted per head.
        map
    }

    /// Head -> sorted tails, counting only one-way edges.
    pub fn oriented_parents_by_head(&self) -> BTreeMap<VarId, Vec<VarId>> {
        let mut map: BTreeMap<VarId, Vec<VarId>> = BTreeMap::new();
        for (u, v) in self.iter() {
            if !self.contains(v, u) {
                map.entry(v).or_default().push(u);
            }
        }
        map
    }

    /// Tails of one-way edges into `v`.
    pub fn parents(&self, v: VarId) -> BTreeSet<VarId> {
        self.iter()
            .filter(|&(a, b)| b == v && !self.contains(b, a))
            .map(|(a, _)| a)
            .collect()
    }

    fn as_graph(&self) -> DiGraphMap<VarId, ()> {
        DiGraphMap::from_edges(self.iter())
    }

    /// Whether a directed path `from ~> to` exists. A node reaches itself.
    pub fn reaches(&self, from: VarId, to: VarId) -> bool {
        if from == to {
            return true;
        }
        let graph = self.as_graph();
        if !graph.contains_node(from) || !graph.contains_node(to) {
            return false;
        }
        has_path_connecting(&graph, from, to, None)
    }

    /// Whether inserting `from -> to` would close a directed cycle.
    pub fn would_create_cycle(&self, from: VarId, to: VarId) -> bool {
        self.reaches(to, from)
    }

    /// Whether the set, read as a digraph, contains a directed cycle.
    /// A bidirectional pair counts as a cycle of length two.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.as_graph())
    }
}

impl FromIterator<(VarId, VarId)> for DirectedEdges {
    fn from_iter<I: IntoIterator<Item = (VarId, VarId)>>(iter: I) -> Self {
        Self { edges: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: u32) -> VarId { VarId(i) }

    #[test]
    fn test_reaches_follows_direction() {
        let d: DirectedEdges = [(v(0), v(1)), (v(1), v(2))].into_iter().collect();
        assert!(d.reaches(v(0), v(2)));
        assert!(!d.reaches(v(2), v(0)));
        assert!(!d.reaches(v(0), v(5)));
        assert!(d.would_create_cycle(v(2), v(0)));
        assert!(!d.would_create_cycle(v(0), v(2)));
    }

    #[test]
    fn test_bidirectional_pairs_and_orientation() {
        let d: DirectedEdges = [(v(0), v(1)), (v(1), v(0)), (v(2), v(1))].into_iter().collect();
        assert_eq!(d.bidirectional_pairs(), vec![VarPair::new(v(0), v(1))]);
        assert!(!d.is_oriented(v(0), v(1)));
        assert!(d.is_oriented(v(2), v(1)));
        assert_eq!(d.parents(v(1)).into_iter().collect::<Vec<_>>(), vec![v(2)]);
        assert!(d.has_cycle());
    }

    #[test]
    fn test_parents_by_head_sorted() {
        let d: DirectedEdges = [(v(3), v(0)), (v(1), v(0)), (v(2), v(4))].into_iter().collect();
        let heads = d.parents_by_head();
        assert_eq!(heads[&v(0)], vec![v(1), v(3)]);
        assert_eq!(heads[&v(4)], vec![v(2)]);
        assert!(!d.has_cycle());
    }
}

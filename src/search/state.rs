//! The run environment and the mutable state threaded through the stages.

use crate::config::SearchConfig;
use crate::graph::{DirectedEdges, SepsetRegistry, Skeleton, VarId, VarPair};
use crate::stats::IndependenceOracle;

/// Read-only inputs shared by every stage of one run.
pub struct SearchContext<'a, O: IndependenceOracle> {
    pub names: &'a [String],
    pub oracle: &'a O,
    pub config: &'a SearchConfig,
}

impl<'a, O: IndependenceOracle> SearchContext<'a, O> {
    pub fn new(names: &'a [String], oracle: &'a O, config: &'a SearchConfig) -> Self {
        Self { names, oracle, config }
    }

    pub fn name(&self, id: VarId) -> &str { &self.names[id.index()] }

    pub fn var_count(&self) -> usize { self.names.len() }

    pub fn alpha(&self) -> f64 { self.config.alpha }

    pub(crate) fn names_of<'b>(&self, ids: impl IntoIterator<Item = &'b VarId>) -> Vec<String> {
        ids.into_iter().map(|&id| self.name(id).to_string()).collect()
    }
}

/// The graph state owned by one run. Stages mutate it in place, in order.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub skeleton: Skeleton,
    pub sepsets: SepsetRegistry,
    pub directed: DirectedEdges,
}

impl SearchState {
    pub fn new(skeleton: Skeleton, sepsets: SepsetRegistry) -> Self {
        Self { skeleton, sepsets, directed: DirectedEdges::new() }
    }

    /// Skeleton edges with neither direction claimed.
    pub fn undirected_edges(&self) -> Vec<VarPair> {
        self.skeleton
            .edges()
            .into_iter()
            .filter(|p| self.directed.is_unoriented(p.first(), p.second()))
            .collect()
    }

    /// Splits the final orientation into its three kinds of edge.
    pub fn to_pdag(&self) -> Pdag {
        let bidirected = self.directed.bidirectional_pairs();
        let directed = self
            .directed
            .iter()
            .filter(|&(u, v)| !self.directed.contains(v, u))
            .collect();
        Pdag { directed, bidirected, undirected: self.undirected_edges() }
    }
}

/// A partially directed graph: the result of the orientation phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pdag {
    /// One-way edges `(u, v)` meaning `u -> v`, sorted.
    pub directed: Vec<(VarId, VarId)>,
    /// Pairs that kept both directions, sorted.
    pub bidirected: Vec<VarPair>,
    /// Skeleton edges with no direction, sorted.
    pub undirected: Vec<VarPair>,
}

impl Pdag {
    pub fn edge_count(&self) -> usize {
        self.directed.len() + self.bidirected.len() + self.undirected.len()
    }
}

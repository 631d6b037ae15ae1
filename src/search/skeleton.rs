//! Skeleton discovery: prune the complete graph with conditional-independence tests.
//!
//! Order 0 tests every pair unconditionally. Order `k` tests each remaining
//! edge against the size-`k` subsets of the endpoints' joint neighbourhood, in
//! lexicographic order, and removes the edge on the first subset that
//! separates it. Subsets whose shared neighbours all sit on a known collider
//! with the edge's endpoints are skipped: conditioning on them cannot separate
//! the pair and could remove a collider leg. The loop stops after a pass that
//! removes nothing, or after `max_order`.

use super::colliders::{collider_triples, find_colliders};
use super::state::{SearchContext, SearchState};
use crate::graph::{CondSet, DirectedEdges, SepsetRegistry, Skeleton, VarId};
use crate::stats::{IndependenceOracle, TestOutcome};
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Bookkeeping for one conditioning order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStats {
    pub order: usize,
    /// Edges that had enough neighbours to be tested at this order.
    pub edges_examined: usize,
    pub edges_removed: usize,
    pub edges_remaining: usize,
}

/// Runs skeleton discovery and returns the state the orientation phase starts from.
pub fn discover<O: IndependenceOracle>(ctx: &SearchContext<'_, O>) -> (SearchState, Vec<OrderStats>) {
    let mut skeleton = Skeleton::complete(ctx.var_count());
    let mut sepsets = SepsetRegistry::new();
    let mut stats = Vec::new();

    info!(variables = ctx.var_count(), edges = skeleton.edge_count(), "skeleton discovery started");

    stats.push(test_unconditional(ctx, &mut skeleton, &mut sepsets));

    let mut colliders = find_colliders(&skeleton, &sepsets);
    for order in 1..=ctx.config.max_order {
        trace_colliders(ctx, &colliders, order);
        let round = test_order(ctx, &mut skeleton, &mut sepsets, &colliders, order);
        let removed = round.edges_removed;
        stats.push(round);

        if removed == 0 {
            debug!(order, "no edge removed, skeleton discovery converged");
            break;
        }
        colliders = find_colliders(&skeleton, &sepsets);
    }

    info!(edges = skeleton.edge_count(), separated = sepsets.len(), "skeleton discovery finished");
    (SearchState::new(skeleton, sepsets), stats)
}

fn test_unconditional<O: IndependenceOracle>(
    ctx: &SearchContext<'_, O>,
    skeleton: &mut Skeleton,
    sepsets: &mut SepsetRegistry,
) -> OrderStats {
    let pairs = skeleton.edges();
    let mut removed = 0;

    for pair in &pairs {
        let (x, y) = (pair.first(), pair.second());
        match ctx.oracle.test(x, y, &[]) {
            Ok(outcome) if outcome.p_value > ctx.alpha() => {
                skeleton.remove_edge(x, y);
                sepsets.record(*pair, CondSet::new(), outcome.p_value);
                removed += 1;
                debug!(x = ctx.name(x), y = ctx.name(y), order = 0, p_value = outcome.p_value, "edge removed");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(x = ctx.name(x), y = ctx.name(y), error = %err, "unconditional test inconclusive, edge kept");
            }
        }
    }

    info!(order = 0, removed, remaining = skeleton.edge_count(), "conditioning order finished");
    OrderStats { order: 0, edges_examined: pairs.len(), edges_removed: removed, edges_remaining: skeleton.edge_count() }
}

fn test_order<O: IndependenceOracle>(
    ctx: &SearchContext<'_, O>,
    skeleton: &mut Skeleton,
    sepsets: &mut SepsetRegistry,
    colliders: &DirectedEdges,
    order: usize,
) -> OrderStats {
    let mut examined = 0;
    let mut removed = 0;

    for pair in skeleton.edges() {
        let (x, y) = (pair.first(), pair.second());
        let pool = conditioning_pool(skeleton, x, y);
        if pool.len() < order {
            continue;
        }
        examined += 1;

        if let Some((set, outcome)) = find_separator(ctx, skeleton, colliders, x, y, &pool, order) {
            skeleton.remove_edge(x, y);
            debug!(
                x = ctx.name(x),
                y = ctx.name(y),
                order,
                p_value = outcome.p_value,
                given = ?ctx.names_of(set.iter()),
                "edge removed"
            );
            sepsets.record(pair, set, outcome.p_value);
            removed += 1;
        }
    }

    info!(order, removed, remaining = skeleton.edge_count(), "conditioning order finished");
    OrderStats { order, edges_examined: examined, edges_removed: removed, edges_remaining: skeleton.edge_count() }
}

/// `(neighbors(x) ∪ neighbors(y)) \ {x, y}`, sorted.
fn conditioning_pool(skeleton: &Skeleton, x: VarId, y: VarId) -> Vec<VarId> {
    let mut pool: BTreeSet<VarId> = skeleton.neighbors(x);
    pool.extend(skeleton.neighbors(y));
    pool.remove(&x);
    pool.remove(&y);
    pool.into_iter().collect()
}

/// The first candidate set, in lexicographic order, that separates `x` and `y`.
///
/// The parallel path tests candidates concurrently but `find_map_first` still
/// yields the earliest qualifying one, so both paths agree.
fn find_separator<O: IndependenceOracle>(
    ctx: &SearchContext<'_, O>,
    skeleton: &Skeleton,
    colliders: &DirectedEdges,
    x: VarId,
    y: VarId,
    pool: &[VarId],
    order: usize,
) -> Option<(CondSet, TestOutcome)> {
    let alpha = ctx.alpha();
    let check = |set: &CondSet| -> Option<(CondSet, TestOutcome)> {
        match ctx.oracle.test(x, y, set) {
            Ok(outcome) if outcome.p_value > alpha => Some((set.clone(), outcome)),
            Ok(_) => None,
            Err(err) => {
                debug!(x = ctx.name(x), y = ctx.name(y), given = ?ctx.names_of(set.iter()), error = %err, "test inconclusive, trying next set");
                None
            }
        }
    };

    let candidates = Combinations::new(pool, order).filter(|set| !is_redundant(skeleton, colliders, x, y, set));
    if ctx.config.parallel {
        let candidates: Vec<CondSet> = candidates.collect();
        candidates.par_iter().find_map_first(check)
    } else {
        candidates.into_iter().find_map(|set| check(&set))
    }
}

/// Whether every member of `set` adjacent to both endpoints is already the
/// head of a provisional collider `x -> z <- y`. Vacuously true when no member
/// is adjacent to both.
pub(crate) fn is_redundant(skeleton: &Skeleton, colliders: &DirectedEdges, x: VarId, y: VarId, set: &[VarId]) -> bool {
    set.iter()
        .filter(|&&z| skeleton.has_edge(x, z) && skeleton.has_edge(y, z))
        .all(|&z| colliders.contains(x, z) && colliders.contains(y, z))
}

fn trace_colliders<O: IndependenceOracle>(ctx: &SearchContext<'_, O>, colliders: &DirectedEdges, order: usize) {
    for (x, y, z) in collider_triples(colliders) {
        debug!(order, x = ctx.name(x), z = ctx.name(z), y = ctx.name(y), "provisional collider");
    }
}

/// Size-`k` subsets of a sorted pool, in lexicographic order.
pub(crate) struct Combinations<'a> {
    pool: &'a [VarId],
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl<'a> Combinations<'a> {
    pub(crate) fn new(pool: &'a [VarId], k: usize) -> Self {
        Self { pool, indices: (0..k).collect(), started: false, done: k > pool.len() }
    }

    fn current(&self) -> CondSet {
        self.indices.iter().map(|&i| self.pool[i]).collect()
    }
}

impl Iterator for Combinations<'_> {
    type Item = CondSet;

    fn next(&mut self) -> Option<CondSet> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current());
        }

        let n = self.pool.len();
        let k = self.indices.len();
        // Rightmost index that can still move right.
        let pivot = (0..k).rev().find(|&i| self.indices[i] != i + n - k);
        match pivot {
            Some(i) => {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                Some(self.current())
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

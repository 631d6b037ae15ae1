//! Resolution of pairs claimed in both directions by different colliders,
//! and of longer directed cycles among collider legs.

use super::state::{SearchContext, SearchState};
use crate::graph::{DirectedEdges, SepsetRegistry, Skeleton, VarId, VarPair};
use crate::stats::IndependenceOracle;
use tracing::{debug, info};

/// How one conflicting pair was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Kept `from -> to`, dropped the reverse.
    Kept { from: VarId, to: VarId },
    /// The edge would close a directed cycle; dropped along with its
    /// collider partner legs.
    DroppedForCycle,
    /// Equal or missing evidence; both dropped.
    DroppedForTie,
}

/// Evidence for one direction of a conflicting pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confidence {
    /// Largest sepset p-value among the supporting colliders, 0 when none.
    pub p_value: f64,
    /// The collider tail that supplied `p_value`.
    pub witness: Option<VarId>,
}

/// Evidence for `u -> v`: colliders `w -> v` with `w` not adjacent to `u`,
/// scored by how convincingly `w` and `u` were separated.
pub fn confidence(skeleton: &Skeleton, sepsets: &SepsetRegistry, directed: &DirectedEdges, u: VarId, v: VarId) -> Confidence {
    let mut best = Confidence { p_value: 0.0, witness: None };
    for w in skeleton.neighbors(v) {
        if w == u || !directed.contains(w, v) || skeleton.has_edge(w, u) {
            continue;
        }
        if let Some(p) = sepsets.p_value(VarPair::new(w, u)) {
            if p > best.p_value {
                best = Confidence { p_value: p, witness: Some(w) };
            }
        }
    }
    best
}

/// Settles every pair holding both `(u, v)` and `(v, u)`, in sorted pair order,
/// then breaks any directed cycle left among the one-way edges.
///
/// Afterwards the directed set holds no bidirectional pair and no cycle. A
/// pair is re-checked before it is handled because earlier resolutions remove
/// edges.
pub fn resolve_conflicts<O: IndependenceOracle>(ctx: &SearchContext<'_, O>, state: &mut SearchState) -> Vec<(VarPair, Resolution)> {
    let conflicts = state.directed.bidirectional_pairs();
    if !conflicts.is_empty() {
        info!(conflicts = conflicts.len(), "resolving conflicting orientations");
    }

    let mut outcomes = Vec::with_capacity(conflicts.len());
    for pair in conflicts {
        let (u, v) = (pair.first(), pair.second());
        if !(state.directed.contains(u, v) && state.directed.contains(v, u)) {
            continue;
        }

        let uv = confidence(&state.skeleton, &state.sepsets, &state.directed, u, v);
        let vu = confidence(&state.skeleton, &state.sepsets, &state.directed, v, u);

        let mut base = state.directed.clone();
        base.remove(u, v);
        base.remove(v, u);

        let resolution = if uv.p_value > vu.p_value {
            if base.would_create_cycle(u, v) { Resolution::DroppedForCycle } else { Resolution::Kept { from: u, to: v } }
        } else if vu.p_value > uv.p_value {
            if base.would_create_cycle(v, u) { Resolution::DroppedForCycle } else { Resolution::Kept { from: v, to: u } }
        } else {
            Resolution::DroppedForTie
        };

        match resolution {
            Resolution::Kept { from, to } => {
                state.directed.remove(to, from);
            }
            Resolution::DroppedForCycle | Resolution::DroppedForTie => {
                state.directed.remove(u, v);
                state.directed.remove(v, u);
            }
        }

        debug!(
            u = ctx.name(u),
            v = ctx.name(v),
            confidence_uv = uv.p_value,
            witness_uv = uv.witness.map(|w| ctx.name(w)),
            confidence_vu = vu.p_value,
            witness_vu = vu.witness.map(|w| ctx.name(w)),
            resolution = ?resolution,
            "conflict resolved"
        );
        outcomes.push((pair, resolution));
    }
    break_cycles(ctx, state, &mut outcomes);
    outcomes
}

/// Rebuilds the directed set edge by edge in sorted order. An edge that would
/// close a cycle among those already kept is dropped, and takes with it the
/// partner legs `w -> v` of the colliders it belonged to.
fn break_cycles<O: IndependenceOracle>(ctx: &SearchContext<'_, O>, state: &mut SearchState, outcomes: &mut Vec<(VarPair, Resolution)>) {
    if !state.directed.has_cycle() {
        return;
    }
    let mut kept = DirectedEdges::new();
    let mut dropped = 0usize;
    for (u, v) in state.directed.snapshot() {
        if !state.directed.contains(u, v) {
            continue;
        }
        if !kept.would_create_cycle(u, v) {
            kept.insert(u, v);
            continue;
        }

        let partners: Vec<VarId> = state
            .skeleton
            .neighbors(v)
            .into_iter()
            .filter(|&w| w != u && state.directed.contains(w, v) && !state.skeleton.has_edge(w, u))
            .collect();
        state.directed.remove(u, v);
        for &w in &partners {
            state.directed.remove(w, v);
            kept.remove(w, v);
        }
        dropped += 1;

        let resolution = Resolution::DroppedForCycle;
        debug!(
            u = ctx.name(u),
            v = ctx.name(v),
            partners = ?ctx.names_of(partners.iter()),
            resolution = ?resolution,
            "conflict resolved"
        );
        outcomes.push((VarPair::new(u, v), resolution));
    }
    info!(dropped, remaining = state.directed.len(), "directed cycles broken");
}

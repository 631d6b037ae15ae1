//! Propagation of orientations with four logical rules, run to a fixpoint.
//!
//! Each rule proposes `a -> b` for an edge with no direction yet. A proposal is
//! committed only if `a` is not already reachable from `b`, so the directed set
//! never gains a cycle. Rules run in order R1..R4 over sorted snapshots; the
//! loop ends after a pass that commits nothing.

use super::state::{SearchContext, SearchState};
use crate::graph::{DirectedEdges, Skeleton, VarId};
use crate::stats::IndependenceOracle;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    /// `x -> y - z`, x and z non-adjacent ⇒ `y -> z` (no new collider at y).
    R1,
    /// `x -> y -> z`, `x - z` ⇒ `x -> z` (no cycle).
    R2,
    /// `y -> w <- z` unshielded, `x - y`, `x - z`, `x - w` ⇒ `x -> w`.
    R3,
    /// `x -> y -> z`, `x - w - z` ⇒ `w -> z`. Witnessed by `[x, w, z]`.
    R4,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One committed orientation and the triple that justified it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Application {
    pub rule: Rule,
    pub from: VarId,
    pub to: VarId,
    /// The pattern's anchoring vertices, in the order named in the rule.
    pub witness: [VarId; 3],
}

/// A candidate left unoriented because `from` is reachable from `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CycleSkip {
    rule: Rule,
    from: VarId,
    to: VarId,
}

/// Orientation scratchpad for one pass: commits proposals and records them.
struct Pass<'s> {
    skeleton: &'s Skeleton,
    directed: &'s mut DirectedEdges,
    applied: Vec<Application>,
    skipped: Vec<CycleSkip>,
}

impl Pass<'_> {
    /// Both endpoints adjacent, no direction claimed.
    fn undirected(&self, a: VarId, b: VarId) -> bool {
        self.skeleton.has_edge(a, b) && self.directed.is_unoriented(a, b)
    }

    fn propose(&mut self, rule: Rule, from: VarId, to: VarId, witness: [VarId; 3]) {
        if !self.directed.is_unoriented(from, to) {
            return;
        }
        if self.directed.would_create_cycle(from, to) {
            self.skipped.push(CycleSkip { rule, from, to });
            return;
        }
        self.directed.insert(from, to);
        self.applied.push(Application { rule, from, to, witness });
    }

    fn r1(&mut self) {
        for (x, y) in self.directed.snapshot() {
            if self.directed.contains(y, x) {
                continue;
            }
            for z in self.skeleton.neighbors(y) {
                if z != x && !self.skeleton.has_edge(x, z) && self.undirected(y, z) {
                    self.propose(Rule::R1, y, z, [x, y, z]);
                }
            }
        }
    }

    fn r2(&mut self) {
        for (x, y) in self.directed.snapshot() {
            if self.directed.contains(y, x) {
                continue;
            }
            for z in self.skeleton.neighbors(y) {
                if z != x && self.directed.is_oriented(y, z) && self.undirected(x, z) {
                    self.propose(Rule::R2, x, z, [x, y, z]);
                }
            }
        }
    }

    fn r3(&mut self) {
        for (w, parents) in self.directed.oriented_parents_by_head() {
            for (i, &y) in parents.iter().enumerate() {
                for &z in &parents[i + 1..] {
                    if self.skeleton.has_edge(y, z) {
                        continue;
                    }
                    for x in self.skeleton.common_neighbors(y, z) {
                        if x != w && self.undirected(x, y) && self.undirected(x, z) && self.undirected(x, w) {
                            self.propose(Rule::R3, x, w, [y, w, z]);
                        }
                    }
                }
            }
        }
    }

    fn r4(&mut self) {
        for (x, y) in self.directed.snapshot() {
            if self.directed.contains(y, x) {
                continue;
            }
            for z in self.skeleton.neighbors(y) {
                if z == x || !self.directed.is_oriented(y, z) {
                    continue;
                }
                for w in self.skeleton.common_neighbors(x, z) {
                    if w != y && self.undirected(x, w) && self.undirected(w, z) {
                        self.propose(Rule::R4, w, z, [x, w, z]);
                    }
                }
            }
        }
    }
}

/// Applies R1..R4 until a full pass adds no edge. Returns every committed
/// orientation in application order.
pub fn propagate<O: IndependenceOracle>(ctx: &SearchContext<'_, O>, state: &mut SearchState) -> Vec<Application> {
    let (applied, skipped) = run_to_fixpoint(&state.skeleton, &mut state.directed);
    for skip in &skipped {
        debug!(
            rule = %skip.rule,
            from = ctx.name(skip.from),
            to = ctx.name(skip.to),
            "orientation skipped, would close a cycle"
        );
    }
    for app in &applied {
        debug!(
            rule = %app.rule,
            from = ctx.name(app.from),
            to = ctx.name(app.to),
            witness = ?ctx.names_of(app.witness.iter()),
            "orientation rule applied"
        );
    }
    info!(
        applied = applied.len(),
        skipped = skipped.len(),
        directed = state.directed.len(),
        "orientation propagation finished"
    );
    applied
}

/// The propagation loop over bare graph structures.
pub fn propagate_orientations(skeleton: &Skeleton, directed: &mut DirectedEdges) -> Vec<Application> {
    run_to_fixpoint(skeleton, directed).0
}

/// Every committed orientation, plus each distinct cycle skip in the order
/// first seen.
fn run_to_fixpoint(skeleton: &Skeleton, directed: &mut DirectedEdges) -> (Vec<Application>, Vec<CycleSkip>) {
    let mut all = Vec::new();
    let mut skipped: Vec<CycleSkip> = Vec::new();
    let mut passes = 0usize;
    loop {
        let mut pass = Pass { skeleton, directed: &mut *directed, applied: Vec::new(), skipped: Vec::new() };
        pass.r1();
        pass.r2();
        pass.r3();
        pass.r4();
        passes += 1;

        let progressed = !pass.applied.is_empty();
        debug!(pass = passes, applied = pass.applied.len(), skipped = pass.skipped.len(), "propagation pass");
        all.extend(pass.applied);
        for skip in pass.skipped {
            if !skipped.contains(&skip) {
                skipped.push(skip);
            }
        }
        if !progressed {
            return (all, skipped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: u32) -> VarId { VarId(i) }

    fn run(skeleton: &Skeleton, directed: &[(u32, u32)]) -> (DirectedEdges, Vec<Application>) {
        let mut d: DirectedEdges = directed.iter().map(|&(a, b)| (v(a), v(b))).collect();
        let applied = propagate_orientations(skeleton, &mut d);
        (d, applied)
    }

    #[test]
    fn test_r1_orients_away_from_collider_free_chain() {
        // 0 -> 1 - 2, 0 and 2 non-adjacent.
        let skeleton = Skeleton::from_edges(3, [(v(0), v(1)), (v(1), v(2))]);
        let (d, applied) = run(&skeleton, &[(0, 1)]);
        assert!(d.is_oriented(v(1), v(2)));
        assert_eq!(applied[0].rule, Rule::R1);
        assert_eq!(applied[0].witness, [v(0), v(1), v(2)]);
    }

    #[test]
    fn test_r1_cascades_down_a_chain() {
        let skeleton = Skeleton::from_edges(5, (0..4).map(|i| (v(i), v(i + 1))));
        let (d, applied) = run(&skeleton, &[(0, 1)]);
        for i in 0..4 {
            assert!(d.is_oriented(v(i), v(i + 1)));
        }
        assert_eq!(applied.len(), 3);
    }

    #[test]
    fn test_r2_closes_transitive_pair() {
        // 0 -> 1 -> 2, 0 - 2 ⇒ 0 -> 2.
        let skeleton = Skeleton::from_edges(3, [(v(0), v(1)), (v(1), v(2)), (v(0), v(2))]);
        let (d, applied) = run(&skeleton, &[(0, 1), (1, 2)]);
        assert!(d.is_oriented(v(0), v(2)));
        assert_eq!(applied, vec![Application { rule: Rule::R2, from: v(0), to: v(2), witness: [v(0), v(1), v(2)] }]);
    }

    #[test]
    fn test_r3_orients_into_collider() {
        // 1 -> 3 <- 2, 0 - 1, 0 - 2, 0 - 3, 1 and 2 non-adjacent ⇒ 0 -> 3.
        let skeleton = Skeleton::from_edges(4, [(v(1), v(3)), (v(2), v(3)), (v(0), v(1)), (v(0), v(2)), (v(0), v(3))]);
        let (d, applied) = run(&skeleton, &[(1, 3), (2, 3)]);
        assert!(d.is_oriented(v(0), v(3)));
        assert_eq!(applied[0].rule, Rule::R3);
        assert!(d.is_unoriented(v(0), v(1)));
        assert!(d.is_unoriented(v(0), v(2)));
    }

    #[test]
    fn test_r3_requires_adjacency_to_head() {
        let skeleton = Skeleton::from_edges(4, [(v(1), v(3)), (v(2), v(3)), (v(0), v(1)), (v(0), v(2))]);
        let (d, applied) = run(&skeleton, &[(1, 3), (2, 3)]);
        assert!(applied.is_empty());
        assert!(!d.contains(v(0), v(3)));
    }

    #[test]
    fn test_r4_orients_second_leg() {
        // 0 -> 1 -> 2 with 0 - 3 - 2 undirected and 1 - 3 shielding R1.
        let skeleton = Skeleton::from_edges(4, [(v(0), v(1)), (v(1), v(2)), (v(0), v(3)), (v(3), v(2)), (v(1), v(3))]);
        let (d, applied) = run(&skeleton, &[(0, 1), (1, 2)]);
        assert!(d.is_oriented(v(3), v(2)));
        assert_eq!(applied, vec![Application { rule: Rule::R4, from: v(3), to: v(2), witness: [v(0), v(3), v(2)] }]);
        assert!(d.is_unoriented(v(1), v(3)));
        assert!(!d.has_cycle());
    }

    #[test]
    fn test_cycle_candidates_are_skipped() {
        // 0 -> 1 - 2 would orient 1 -> 2 by R1, but 2 -> 3 -> 1 already exists.
        let skeleton = Skeleton::from_edges(4, [(v(0), v(1)), (v(1), v(2)), (v(2), v(3)), (v(3), v(1))]);
        let (d, applied) = run(&skeleton, &[(0, 1), (2, 3), (3, 1)]);
        assert!(!d.contains(v(1), v(2)));
        assert!(applied.iter().all(|a| !(a.from == v(1) && a.to == v(2))));
        assert!(!d.has_cycle());
    }

    #[test]
    fn test_cycle_skips_are_reported_by_rule() {
        let skeleton = Skeleton::from_edges(4, [(v(0), v(1)), (v(1), v(2)), (v(2), v(3)), (v(3), v(1))]);
        let mut d: DirectedEdges = [(v(0), v(1)), (v(2), v(3)), (v(3), v(1))].into_iter().collect();
        let (_, skipped) = run_to_fixpoint(&skeleton, &mut d);
        assert_eq!(skipped.iter().filter(|s| s.from == v(1) && s.to == v(2)).count(), 1);
        assert!(skipped.contains(&CycleSkip { rule: Rule::R1, from: v(1), to: v(2) }));
    }

    #[test]
    fn test_rerun_on_fixpoint_adds_nothing() {
        let skeleton = Skeleton::from_edges(6, [
            (v(0), v(2)), (v(1), v(2)), (v(2), v(3)), (v(3), v(4)), (v(2), v(4)), (v(4), v(5)),
        ]);
        let (mut d, applied) = run(&skeleton, &[(0, 2), (1, 2)]);
        assert!(!applied.is_empty());
        let before = d.clone();
        assert!(propagate_orientations(&skeleton, &mut d).is_empty());
        assert_eq!(d, before);
    }
}

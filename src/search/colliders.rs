//! Unshielded-collider detection.

use crate::graph::{DirectedEdges, SepsetRegistry, Skeleton, VarId};
use std::collections::BTreeSet;

/// Orients every unshielded triple `x - z - y` (x, y non-adjacent) as
/// `x -> z <- y` unless `z` appears in a separating set of `(x, y)`.
///
/// Pure: always recomputed from the current skeleton and registry.
pub fn find_colliders(skeleton: &Skeleton, sepsets: &SepsetRegistry) -> DirectedEdges {
    let mut directed = DirectedEdges::new();
    for pair in skeleton.non_adjacent_pairs() {
        let (x, y) = (pair.first(), pair.second());
        for z in skeleton.common_neighbors(x, y) {
            if !sepsets.separates_via(pair, z) {
                directed.insert(x, z);
                directed.insert(y, z);
            }
        }
    }
    directed
}

/// Readable view of the colliders in `directed`: every `(x, y, z)` with
/// `x < y` and both `x -> z`, `y -> z` present.
pub fn collider_triples(directed: &DirectedEdges) -> BTreeSet<(VarId, VarId, VarId)> {
    let mut triples = BTreeSet::new();
    for (z, parents) in directed.parents_by_head() {
        for (i, &x) in parents.iter().enumerate() {
            for &y in &parents[i + 1..] {
                triples.insert((x, y, z));
            }
        }
    }
    triples
}

//! Retraction of collider orientations that a competing collider explains away.

use super::state::{SearchContext, SearchState};
use crate::graph::VarId;
use crate::stats::IndependenceOracle;
use tracing::{debug, info, warn};

/// A retracted collider `x -> z <- y`, contested by `x -> w <- y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retraction {
    pub x: VarId,
    pub y: VarId,
    pub collider: VarId,
    pub rival: VarId,
    pub p_value: f64,
}

/// For each collider `z` and each pair of its parents `x, y` that also point
/// into another head `w`: if `x` and `y` are independent given `{z}` alone,
/// the orientation at `z` is unreliable and both `x -> z` and `y -> z` are
/// removed. The skeleton edges stay.
///
/// Heads and parents are read once, before any removal. Runs once per search.
pub fn retract_unreliable<O: IndependenceOracle>(ctx: &SearchContext<'_, O>, state: &mut SearchState) -> Vec<Retraction> {
    let heads = state.directed.parents_by_head();
    let mut retractions = Vec::new();

    for (&z, parents) in &heads {
        if parents.len() < 2 {
            continue;
        }
        for (i, &x) in parents.iter().enumerate() {
            for &y in &parents[i + 1..] {
                let rival = heads
                    .iter()
                    .find(|&(&w, w_parents)| w != z && w_parents.contains(&x) && w_parents.contains(&y))
                    .map(|(&w, _)| w);
                let Some(rival) = rival else { continue };

                match ctx.oracle.test(x, y, &[z]) {
                    Ok(outcome) if outcome.p_value > ctx.alpha() => {
                        debug!(
                            x = ctx.name(x),
                            y = ctx.name(y),
                            collider = ctx.name(z),
                            rival = ctx.name(rival),
                            p_value = outcome.p_value,
                            "unreliable collider retracted"
                        );
                        state.directed.remove(x, z);
                        state.directed.remove(y, z);
                        retractions.push(Retraction { x, y, collider: z, rival, p_value: outcome.p_value });
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(x = ctx.name(x), y = ctx.name(y), given = ctx.name(z), error = %err, "reliability test inconclusive");
                    }
                }
            }
        }
    }

    if !retractions.is_empty() {
        info!(retracted = retractions.len(), "unreliable orientations removed");
    }
    retractions
}

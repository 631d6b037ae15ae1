//! The search pipeline and its stages.
//!
//! Stages run in a fixed order over one `SearchState`: skeleton discovery,
//! collider detection, conflict resolution, unreliable-direction correction,
//! rule propagation and strength estimation. `CausalSearch` drives them.
pub mod colliders;
pub mod conflicts;
pub mod pipeline;
pub mod rules;
pub mod skeleton;
pub mod state;
pub mod strength;
pub mod unreliable;

pub use colliders::{collider_triples, find_colliders};
pub use conflicts::{confidence, resolve_conflicts, Confidence, Resolution};
pub use pipeline::{run_directed_analysis, run_undirected_analysis, CausalSearch, SearchOutcome};
pub use rules::{propagate, propagate_orientations, Application, Rule};
pub use skeleton::{discover, OrderStats};
pub use state::{Pdag, SearchContext, SearchState};
pub use strength::{estimate_directed, estimate_undirected, PathRecord, SkippedEdge, StrengthReport};
pub use unreliable::{retract_unreliable, Retraction};

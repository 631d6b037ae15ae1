//! Defines the core graph structures manipulated by the search.
pub mod dag;
pub mod edge;
pub mod node;
pub mod sepset;
pub mod skeleton;

// Re-export key types for convenient access
pub use dag::DirectedEdges;
pub use edge::EdgeMark;
pub use node::{CondSet, VarId, VarPair};
pub use sepset::{SepsetRecord, SepsetRegistry};
pub use skeleton::Skeleton;

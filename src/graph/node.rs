//! Identifiers for variables and unordered variable pairs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A unique, stable identifier for a variable (a column of the dataset).
///
/// Ids are assigned in ascending name order, so comparing two `VarId`s is the
/// same as comparing the variable names. Every "sorted" iteration in the
/// search relies on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct VarId(pub u32);

impl VarId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// A conditioning set. Orders above 4 are rare, so the common case stays inline.
pub type CondSet = SmallVec<[VarId; 4]>;

/// An unordered pair of distinct variables, stored as `(min, max)`.
///
/// Used as the key of the separating-set registry and to name skeleton edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarPair(VarId, VarId);

impl VarPair {
    pub fn new(a: VarId, b: VarId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn first(&self) -> VarId { self.0 }
    pub fn second(&self) -> VarId { self.1 }

    pub fn contains(&self, v: VarId) -> bool { self.0 == v || self.1 == v }

    /// The endpoint that is not `v`, if `v` is an endpoint.
    pub fn other(&self, v: VarId) -> Option<VarId> {
        if v == self.0 {
            Some(self.1)
        } else if v == self.1 {
            Some(self.0)
        } else {
            None
        }
    }
}

impl From<(VarId, VarId)> for VarPair {
    fn from((a, b): (VarId, VarId)) -> Self { Self::new(a, b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_canonical() {
        let a = VarId(3);
        let b = VarId(1);
        assert_eq!(VarPair::new(a, b), VarPair::new(b, a));
        assert_eq!(VarPair::new(a, b).first(), b);
        assert_eq!(VarPair::new(a, b).other(b), Some(a));
        assert_eq!(VarPair::new(a, b).other(VarId(7)), None);
    }
}

//! Defines the `EdgeMark` type, the direction marker carried by a path record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes how a surviving relation between two variables was oriented.
///
/// Serialized as the marker string itself (`"-->"`, `"<-->"`, `"---"`), which is
/// the shape report writers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeMark {
    /// A one-way orientation from the first endpoint to the second.
    #[serde(rename = "-->")]
    Directed,
    /// Both directions were claimed and neither could be retracted.
    #[serde(rename = "<-->")]
    Bidirected,
    /// Adjacent, but no direction could be determined.
    #[serde(rename = "---")]
    Undirected,
}

impl EdgeMark {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeMark::Directed => "-->",
            EdgeMark::Bidirected => "<-->",
            EdgeMark::Undirected => "---",
        }
    }
}

impl fmt::Display for EdgeMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

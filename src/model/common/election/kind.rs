use serde::{Deserialize, Serialize};

/// The two flavours of election. Fixed at creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionKind {
    /// Every participant sees the same, unredacted data.
    Shared,
    /// Anonymous live polling: participants only ever see a zeroed tally.
    Virtual,
}

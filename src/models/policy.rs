use serde::{Deserialize, Serialize};
use std::fmt;

/// How bundle aggregation treats a member with no resolvable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// A member without a value contributes zero at that timestamp; dangling
    /// member names are ignored.
    SkipMissing,
    /// Every member must resolve. Dangling member names fail the whole
    /// aggregation; timestamps where any member has no value are omitted.
    RequireAll,
}

impl fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapPolicy::SkipMissing => write!(f, "skip_missing"),
            GapPolicy::RequireAll => write!(f, "require_all"),
        }
    }
}

impl Default for GapPolicy {
    fn default() -> Self {
        GapPolicy::SkipMissing
    }
}

/// How a series resolves a timestamp it has no exact point for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Only an exact timestamp match produces a value.
    Exact,
    /// Fall back to the nearest earlier point; a price holds until the next
    /// observation replaces it.
    CarryForward,
}

impl fmt::Display for LookupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupPolicy::Exact => write!(f, "exact"),
            LookupPolicy::CarryForward => write!(f, "carry_forward"),
        }
    }
}

impl Default for LookupPolicy {
    fn default() -> Self {
        LookupPolicy::CarryForward
    }
}

use serde::{Deserialize, Serialize};

use super::{BundleMap, SeriesMap};

/// The complete persistent state of a store.
///
/// Everything a store needs to come back after a restart: each tracked
/// series with its points and covered ranges, and every bundle definition.
/// Configuration is not part of the snapshot; it comes from
/// [`crate::config::StoreConfig`] at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Price history keyed by ticker, ascending.
    #[serde(default)]
    pub series: SeriesMap,

    /// Bundle definitions keyed by name, ascending.
    #[serde(default)]
    pub bundles: BundleMap,
}

impl StoreSnapshot {
    /// A first-run snapshot: nothing tracked, nothing bundled.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the snapshot holds no state at all.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.bundles.is_empty()
    }
}

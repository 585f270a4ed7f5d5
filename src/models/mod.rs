mod bundle;
mod coverage;
mod policy;
mod price_point;
mod series;
mod snapshot;
mod time_range;

pub use bundle::{Bundle, MemberResolution};
pub use coverage::Coverage;
pub use policy::{GapPolicy, LookupPolicy};
pub use price_point::PricePoint;
pub use series::PriceSeries;
pub use snapshot::StoreSnapshot;
pub use time_range::TimeRange;

use std::collections::BTreeMap;

/// Price history keyed by ticker
pub type SeriesMap = BTreeMap<String, PriceSeries>;

/// Bundle definitions keyed by name
pub type BundleMap = BTreeMap<String, Bundle>;

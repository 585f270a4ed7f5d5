use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, StoreError};
use crate::utils::normalize_ticker;

use super::policy::{GapPolicy, LookupPolicy};
use super::price_point::PricePoint;
use super::series::PriceSeries;
use super::time_range::TimeRange;

/// A named, weighted basket of currencies.
///
/// Weights are positive decimals and do not need to sum to one: the
/// aggregate is a weighted sum, not an average. Members are ticker names
/// resolved against live series at query time; a bundle never holds price
/// data itself, so a member ticker may go dangling when its currency is
/// removed from the store.
///
/// Construction and mutation enforce the invariants (at least one member,
/// positive weights, no duplicate members); deserialization runs through the
/// same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BundleRepr")]
pub struct Bundle {
    name: String,
    members: BTreeMap<String, Decimal>,
}

/// Raw serialized form, validated into [`Bundle`] on load.
#[derive(Deserialize)]
struct BundleRepr {
    name: String,
    members: BTreeMap<String, Decimal>,
}

impl TryFrom<BundleRepr> for Bundle {
    type Error = StoreError;

    fn try_from(repr: BundleRepr) -> Result<Self> {
        Bundle::new(repr.name, repr.members)
    }
}

/// Outcome of resolving bundle members against the live ticker set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberResolution {
    /// Members with a live series, with their weights, ascending by ticker.
    pub resolved: Vec<(String, Decimal)>,
    /// Member tickers with no live series (dangling names), ascending.
    pub unresolved: Vec<String>,
}

impl MemberResolution {
    /// True when every member has a live series.
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl Bundle {
    /// Build a bundle from its initial members.
    ///
    /// Fails when the member list is empty, a weight is not positive, or the
    /// same ticker appears twice (after normalization).
    pub fn new(
        name: impl Into<String>,
        members: impl IntoIterator<Item = (String, Decimal)>,
    ) -> Result<Self> {
        let name = name.into();
        let mut normalized = BTreeMap::new();
        for (ticker, weight) in members {
            let ticker = normalize_ticker(&ticker);
            if weight <= Decimal::ZERO {
                return Err(StoreError::InvalidWeight { ticker, weight });
            }
            if normalized.insert(ticker.clone(), weight).is_some() {
                return Err(StoreError::DuplicateMember { bundle: name, ticker });
            }
        }
        if normalized.is_empty() {
            return Err(StoreError::EmptyBundle(name));
        }
        Ok(Self {
            name,
            members: normalized,
        })
    }

    /// The bundle's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member weights keyed by ticker, ascending.
    pub fn members(&self) -> &BTreeMap<String, Decimal> {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Bundles are never empty, but the trait-like pair keeps callers honest.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member tickers, ascending.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Is `ticker` a member (case-insensitive)?
    pub fn contains(&self, ticker: &str) -> bool {
        self.members.contains_key(&normalize_ticker(ticker))
    }

    /// Weight of `ticker`, if a member.
    pub fn weight_of(&self, ticker: &str) -> Option<Decimal> {
        self.members.get(&normalize_ticker(ticker)).copied()
    }

    /// Add a member. Fails on duplicate tickers and non-positive weights.
    pub fn add_member(&mut self, ticker: &str, weight: Decimal) -> Result<()> {
        let ticker = normalize_ticker(ticker);
        if weight <= Decimal::ZERO {
            return Err(StoreError::InvalidWeight { ticker, weight });
        }
        if self.members.contains_key(&ticker) {
            return Err(StoreError::DuplicateMember {
                bundle: self.name.clone(),
                ticker,
            });
        }
        self.members.insert(ticker, weight);
        Ok(())
    }

    /// Remove a member. The last member cannot be removed.
    pub fn remove_member(&mut self, ticker: &str) -> Result<()> {
        let ticker = normalize_ticker(ticker);
        if !self.members.contains_key(&ticker) {
            return Err(StoreError::UnknownMember {
                bundle: self.name.clone(),
                ticker,
            });
        }
        if self.members.len() == 1 {
            return Err(StoreError::EmptyBundle(self.name.clone()));
        }
        self.members.remove(&ticker);
        Ok(())
    }

    /// Split members into those present in `tracked` and dangling names.
    pub fn resolve_members(&self, tracked: &BTreeSet<String>) -> MemberResolution {
        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for (ticker, weight) in &self.members {
            if tracked.contains(ticker) {
                resolved.push((ticker.clone(), *weight));
            } else {
                unresolved.push(ticker.clone());
            }
        }
        MemberResolution {
            resolved,
            unresolved,
        }
    }

    /// Weighted aggregate of the member series over `range`.
    ///
    /// `series_by_ticker` holds the live series; a member ticker absent from
    /// it counts as unresolved. The output carries one point per distinct
    /// member timestamp inside `range`, each valued as the weighted sum of
    /// member prices with earlier prices carried forward between
    /// observations. Gap handling follows `policy`; see [`GapPolicy`].
    pub fn aggregate_series(
        &self,
        series_by_ticker: &BTreeMap<String, &PriceSeries>,
        range: &TimeRange,
        policy: GapPolicy,
    ) -> Result<Vec<PricePoint>> {
        let mut active: Vec<(Decimal, &PriceSeries)> = Vec::with_capacity(self.members.len());
        for (ticker, weight) in &self.members {
            match series_by_ticker.get(ticker) {
                Some(series) => active.push((*weight, *series)),
                None if policy == GapPolicy::RequireAll => {
                    return Err(StoreError::UnresolvedMember {
                        bundle: self.name.clone(),
                        ticker: ticker.clone(),
                    });
                }
                None => {}
            }
        }

        // union of member timestamps inside the window
        let mut timestamps = BTreeSet::new();
        for (_, series) in &active {
            for point in series.points_in(range) {
                timestamps.insert(point.time);
            }
        }

        let mut aggregate = Vec::with_capacity(timestamps.len());
        for time in timestamps {
            if let Some(value) = weighted_value_at(&active, time, policy) {
                aggregate.push(PricePoint::new(time, value));
            }
        }
        Ok(aggregate)
    }
}

/// Weighted sum across member series at one timestamp, or `None` when the
/// policy omits the timestamp.
fn weighted_value_at(
    active: &[(Decimal, &PriceSeries)],
    time: DateTime<Utc>,
    policy: GapPolicy,
) -> Option<Decimal> {
    let mut total = Decimal::ZERO;
    for (weight, series) in active {
        match series.value_at(time, LookupPolicy::CarryForward) {
            Some(price) => total += *weight * price,
            None if policy == GapPolicy::RequireAll => return None,
            None => {}
        }
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(i64::from(secs))
    }

    fn range(start: u32, end: u32) -> TimeRange {
        TimeRange::new(at(start), at(end)).unwrap()
    }

    fn members(list: &[(&str, i64)]) -> Vec<(String, Decimal)> {
        list.iter()
            .map(|(t, w)| (t.to_string(), Decimal::from(*w)))
            .collect()
    }

    fn series_of(points: &[(u32, i64)]) -> PriceSeries {
        let mut series = PriceSeries::new();
        for (secs, price) in points {
            series.insert(PricePoint::new(at(*secs), Decimal::from(*price)));
        }
        series
    }

    #[test]
    fn test_new_rejects_empty_member_list() {
        let result = Bundle::new("empty", members(&[]));
        assert!(matches!(result, Err(StoreError::EmptyBundle(_))));
    }

    #[test]
    fn test_new_rejects_non_positive_weights() {
        let result = Bundle::new("bad", members(&[("BTC", 0)]));
        assert!(matches!(result, Err(StoreError::InvalidWeight { .. })));

        let result = Bundle::new("bad", members(&[("BTC", -2)]));
        assert!(matches!(result, Err(StoreError::InvalidWeight { .. })));
    }

    #[test]
    fn test_new_rejects_duplicate_members_case_insensitively() {
        let result = Bundle::new(
            "dupes",
            vec![
                ("btc".to_string(), Decimal::ONE),
                ("BTC".to_string(), Decimal::TWO),
            ],
        );
        assert!(matches!(result, Err(StoreError::DuplicateMember { .. })));
    }

    #[test]
    fn test_add_member_enforces_invariants() {
        let mut bundle = Bundle::new("b", members(&[("BTC", 1)])).unwrap();

        assert!(matches!(
            bundle.add_member("btc", Decimal::ONE),
            Err(StoreError::DuplicateMember { .. })
        ));
        assert!(matches!(
            bundle.add_member("ETH", Decimal::ZERO),
            Err(StoreError::InvalidWeight { .. })
        ));

        bundle.add_member("eth", Decimal::TWO).unwrap();
        assert_eq!(bundle.weight_of("ETH"), Some(Decimal::TWO));
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn test_remove_member_refuses_to_empty_the_bundle() {
        let mut bundle = Bundle::new("b", members(&[("BTC", 1), ("ETH", 2)])).unwrap();

        bundle.remove_member("eth").unwrap();
        assert_eq!(bundle.len(), 1);

        let result = bundle.remove_member("BTC");
        assert!(matches!(result, Err(StoreError::EmptyBundle(_))));
        // bundle unchanged by the failed removal
        assert!(bundle.contains("BTC"));
    }

    #[test]
    fn test_remove_unknown_member() {
        let mut bundle = Bundle::new("b", members(&[("BTC", 1), ("ETH", 2)])).unwrap();
        assert!(matches!(
            bundle.remove_member("DOGE"),
            Err(StoreError::UnknownMember { .. })
        ));
    }

    #[test]
    fn test_resolve_members_splits_live_and_dangling() {
        let bundle = Bundle::new("b", members(&[("BTC", 1), ("ETH", 2), ("XMR", 3)])).unwrap();
        let tracked: BTreeSet<String> = ["BTC".to_string(), "ETH".to_string()].into();

        let resolution = bundle.resolve_members(&tracked);
        assert!(!resolution.is_fully_resolved());
        assert_eq!(
            resolution.resolved,
            vec![
                ("BTC".to_string(), Decimal::ONE),
                ("ETH".to_string(), Decimal::TWO)
            ]
        );
        assert_eq!(resolution.unresolved, vec!["XMR".to_string()]);
    }

    #[test]
    fn test_aggregate_weighted_sum_is_exact() {
        let bundle = Bundle::new("b", members(&[("BTC", 2), ("ETH", 3)])).unwrap();
        let btc = series_of(&[(10, 100), (20, 110)]);
        let eth = series_of(&[(10, 10), (20, 12)]);
        let map = BTreeMap::from([("BTC".to_string(), &btc), ("ETH".to_string(), &eth)]);

        let out = bundle
            .aggregate_series(&map, &range(0, 100), GapPolicy::SkipMissing)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].price, Decimal::from(2 * 100 + 3 * 10));
        assert_eq!(out[1].price, Decimal::from(2 * 110 + 3 * 12));
    }

    #[test]
    fn test_aggregate_carries_member_prices_forward() {
        let bundle = Bundle::new("b", members(&[("BTC", 1), ("ETH", 1)])).unwrap();
        // ETH has no point at t=20; its t=10 price carries forward
        let btc = series_of(&[(10, 100), (20, 110)]);
        let eth = series_of(&[(10, 10)]);
        let map = BTreeMap::from([("BTC".to_string(), &btc), ("ETH".to_string(), &eth)]);

        let out = bundle
            .aggregate_series(&map, &range(0, 100), GapPolicy::RequireAll)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].price, Decimal::from(110 + 10));
    }

    #[test]
    fn test_aggregate_skip_missing_treats_gaps_as_zero() {
        let bundle = Bundle::new("b", members(&[("BTC", 1), ("ETH", 1)])).unwrap();
        // ETH's first point comes later than BTC's: nothing to carry at t=10
        let btc = series_of(&[(10, 100), (20, 110)]);
        let eth = series_of(&[(20, 12)]);
        let map = BTreeMap::from([("BTC".to_string(), &btc), ("ETH".to_string(), &eth)]);

        let out = bundle
            .aggregate_series(&map, &range(0, 100), GapPolicy::SkipMissing)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].price, Decimal::from(100));
        assert_eq!(out[1].price, Decimal::from(110 + 12));
    }

    #[test]
    fn test_aggregate_require_all_omits_unresolvable_timestamps() {
        let bundle = Bundle::new("b", members(&[("BTC", 1), ("ETH", 1)])).unwrap();
        let btc = series_of(&[(10, 100), (20, 110)]);
        let eth = series_of(&[(20, 12)]);
        let map = BTreeMap::from([("BTC".to_string(), &btc), ("ETH".to_string(), &eth)]);

        let out = bundle
            .aggregate_series(&map, &range(0, 100), GapPolicy::RequireAll)
            .unwrap();
        // t=10 omitted: ETH has nothing to carry there
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time, at(20));
        assert_eq!(out[0].price, Decimal::from(110 + 12));
    }

    #[test]
    fn test_aggregate_require_all_fails_on_dangling_member() {
        let bundle = Bundle::new("b", members(&[("BTC", 1), ("GONE", 1)])).unwrap();
        let btc = series_of(&[(10, 100)]);
        let map = BTreeMap::from([("BTC".to_string(), &btc)]);

        let result = bundle.aggregate_series(&map, &range(0, 100), GapPolicy::RequireAll);
        assert!(matches!(
            result,
            Err(StoreError::UnresolvedMember { ref ticker, .. }) if ticker == "GONE"
        ));
    }

    #[test]
    fn test_aggregate_skip_missing_ignores_dangling_member() {
        let bundle = Bundle::new("b", members(&[("BTC", 2), ("GONE", 5)])).unwrap();
        let btc = series_of(&[(10, 100)]);
        let map = BTreeMap::from([("BTC".to_string(), &btc)]);

        let out = bundle
            .aggregate_series(&map, &range(0, 100), GapPolicy::SkipMissing)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].price, Decimal::from(200));
    }

    #[test]
    fn test_aggregate_window_excludes_outside_points() {
        let bundle = Bundle::new("b", members(&[("BTC", 1)])).unwrap();
        let btc = series_of(&[(10, 100), (50, 150), (90, 190)]);
        let map = BTreeMap::from([("BTC".to_string(), &btc)]);

        let out = bundle
            .aggregate_series(&map, &range(40, 60), GapPolicy::SkipMissing)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time, at(50));
    }

    #[test]
    fn test_deserialization_rejects_invalid_bundles() {
        assert!(serde_json::from_str::<Bundle>(r#"{"name":"x","members":{}}"#).is_err());
        assert!(serde_json::from_str::<Bundle>(r#"{"name":"x","members":{"BTC":"0"}}"#).is_err());

        let ok: Bundle = serde_json::from_str(r#"{"name":"x","members":{"btc":"1.5"}}"#).unwrap();
        assert_eq!(ok.weight_of("BTC"), Some(Decimal::new(15, 1)));
    }
}

//! Shared fixtures for the store integration tests.
//!
//! `FakeGateway` serves a scripted book of prices and records every fetch
//! call, so tests can assert not only on the resulting series but on how
//! often (and for which ranges) the provider was actually consulted.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use coinplot::{FetchError, PriceGateway, PricePoint, TimeRange};
use rust_decimal::Decimal;

/// Midnight UTC on day `n` of the fixture calendar (March 2024).
pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, n, 0, 0, 0).unwrap()
}

/// Closed range from day `a` midnight to day `b` midnight.
pub fn days(a: u32, b: u32) -> TimeRange {
    TimeRange::new(day(a), day(b)).unwrap()
}

/// Exact decimal from a literal.
pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Scripted provider: a fixed book of observations per ticker, an optional
/// per-ticker error queue, and a log of every fetch call.
///
/// Each fetch first drains one queued error for the ticker, if any; after
/// the queue empties, fetches answer from the book. That makes
/// fail-once-then-recover scripts one-liners.
pub struct FakeGateway {
    book: BTreeMap<String, Vec<PricePoint>>,
    errors: RefCell<BTreeMap<String, Vec<FetchError>>>,
    calls: RefCell<Vec<(String, TimeRange)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            book: BTreeMap::new(),
            errors: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Add one observation to the book.
    pub fn add_point(&mut self, ticker: &str, time: DateTime<Utc>, price: Decimal) {
        self.book
            .entry(ticker.to_string())
            .or_default()
            .push(PricePoint::new(time, price));
    }

    /// Add a daily observation at midnight for each `(day, price)` pair.
    pub fn add_daily(&mut self, ticker: &str, prices: &[(u32, &str)]) {
        for (d, price) in prices {
            self.add_point(ticker, day(*d), dec(price));
        }
    }

    /// Queue `error` for the next fetch of `ticker`.
    pub fn push_error(&mut self, ticker: &str, error: FetchError) {
        self.errors
            .borrow_mut()
            .entry(ticker.to_string())
            .or_default()
            .push(error);
    }

    /// Every fetch call made so far, in order.
    pub fn calls(&self) -> Vec<(String, TimeRange)> {
        self.calls.borrow().clone()
    }

    /// Total number of fetch calls.
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of fetch calls for one ticker.
    pub fn calls_for(&self, ticker: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(t, _)| t == ticker)
            .count()
    }
}

impl PriceGateway for FakeGateway {
    fn fetch(&self, ticker: &str, range: &TimeRange) -> Result<Vec<PricePoint>, FetchError> {
        self.calls.borrow_mut().push((ticker.to_string(), *range));

        if let Some(queue) = self.errors.borrow_mut().get_mut(ticker) {
            if !queue.is_empty() {
                return Err(queue.remove(0));
            }
        }

        let points = self
            .book
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| range.contains(p.time))
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        Ok(points)
    }
}

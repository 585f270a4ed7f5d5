//! Interface to the external price-data provider.
//!
//! The store never speaks HTTP itself. Callers pass any [`PriceGateway`]
//! implementation: a real API client, a replay file, or a scripted fake in
//! tests. Failures are classified so the calling layer can decide which
//! holes are worth retrying.

use std::fmt;

use crate::models::{PricePoint, TimeRange};

/// Classification of a gateway failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The provider throttled the request.
    RateLimited,
    /// The provider does not know the requested currency.
    NotFound,
    /// Network trouble, timeout, or a provider-side error.
    Transient,
}

impl FetchErrorKind {
    /// May the identical request succeed if retried later?
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchErrorKind::RateLimited | FetchErrorKind::Transient)
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::RateLimited => write!(f, "rate limited"),
            FetchErrorKind::NotFound => write!(f, "not found"),
            FetchErrorKind::Transient => write!(f, "transient failure"),
        }
    }
}

/// Failure reported by a [`PriceGateway`] for a single fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::RateLimited, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::NotFound, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transient, message)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

/// Source of historical prices for one currency over a closed range.
///
/// Implementations must return within bounded time (fail with
/// [`FetchErrorKind::Transient`] rather than hang) and should return points
/// inside the requested range; out-of-range points are stored too, but only
/// the requested range is marked covered.
pub trait PriceGateway {
    /// Fetch all available points for `ticker` within `range`.
    ///
    /// An empty vector is a valid answer: it means the provider has no
    /// observations there, and the range still counts as covered.
    fn fetch(&self, ticker: &str, range: &TimeRange) -> Result<Vec<PricePoint>, FetchError>;
}

use rust_decimal::Decimal;
use thiserror::Error as ThisError;

/// Errors returned by the store surface.
///
/// A failed operation leaves the store unchanged, so the error value is the
/// only signal a caller gets; every variant names the entities involved.
#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("currency {0} is already tracked")]
    DuplicateTicker(String),

    #[error("currency {0} is not tracked")]
    UnknownTicker(String),

    #[error("{0:?} is not a valid ticker")]
    InvalidTicker(String),

    #[error("bundle name {0} is already taken")]
    DuplicateBundle(String),

    #[error("bundle {0} not found")]
    UnknownBundle(String),

    #[error("{0:?} is not a valid bundle name")]
    InvalidBundleName(String),

    #[error("currency {ticker} is already a member of bundle {bundle}")]
    DuplicateMember { bundle: String, ticker: String },

    #[error("currency {ticker} is not a member of bundle {bundle}")]
    UnknownMember { bundle: String, ticker: String },

    #[error("bundle {0} must keep at least one member")]
    EmptyBundle(String),

    #[error("invalid weight {weight} for {ticker}: weights must be positive")]
    InvalidWeight { ticker: String, weight: Decimal },

    #[error("bundle {bundle} references untracked currency {ticker}")]
    UnresolvedMember { bundle: String, ticker: String },

    #[error("invalid rescale factor {0}: factor must be positive")]
    InvalidFactor(Decimal),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::Io(format!("CSV error: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

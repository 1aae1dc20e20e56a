use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// A current price observation for a ticker.
///
/// Ephemeral: recomputed each refresh cycle and superseded (never
/// merged) by the next fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: Ticker,

    /// Latest traded/market price (always positive)
    pub price: f64,

    /// When this observation was fetched
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(ticker: Ticker, price: f64) -> Self {
        Self {
            ticker,
            price,
            fetched_at: Utc::now(),
        }
    }
}

/// Why a quote could not be produced for a ticker.
///
/// Callers can distinguish "this ticker does not exist" from "the
/// provider was unreachable this cycle", even though both currently
/// lead to the same outcome (the row is excluded until the next cycle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnavailableReason {
    /// No provider recognizes the ticker, or none returned a price for it
    NotFound,
    /// Transport-level failure (timeout, DNS, connection refused)
    Network(String),
    /// The provider answered but the body could not be interpreted as a price
    Malformed(String),
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::NotFound => write!(f, "not found"),
            UnavailableReason::Network(msg) => write!(f, "network failure: {msg}"),
            UnavailableReason::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

/// The typed "no price this cycle" result returned by the quote service.
///
/// Deliberately not a `CoreError`: an unavailable quote is an expected
/// per-row outcome, handled by silent exclusion from the valuation,
/// never propagated as a failure of the whole operation.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteUnavailable {
    pub ticker: Ticker,
    pub reason: UnavailableReason,
}

impl std::fmt::Display for QuoteUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "quote unavailable for {}: {}", self.ticker, self.reason)
    }
}

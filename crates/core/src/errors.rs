use thiserror::Error;

/// Unified error type for the entire portfolio-tracker-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
///
/// Note that an individually unavailable quote is NOT an error: the
/// quote service converts provider failures into `QuoteUnavailable`
/// values (see `models::quote`) and the valuation engine drops those
/// rows silently. Only two quote-related situations surface here:
/// a failed price probe when adding a holding (`TickerNotFound`) and
/// a refresh cycle in which every holding failed (`NoValidPrices`).
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No provider available for ticker class: {0}")]
    NoProvider(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    #[error("No valid prices found for any holding in this cycle")]
    NoValidPrices,

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs.
        // reqwest errors often contain the full request URL.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

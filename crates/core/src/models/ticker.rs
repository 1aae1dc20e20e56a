use serde::{Deserialize, Serialize};

/// Routing class of a ticker symbol.
/// Determines which quote providers are tried, and in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickerClass {
    /// Crypto pairs quoted against USD (BTC-USD, ETH-USD, ...) — fast
    /// path via the exchange ticker endpoint, Yahoo as fallback.
    Crypto,
    /// Everything else: equities, ETFs, indices — Yahoo Finance.
    Equity,
}

impl std::fmt::Display for TickerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickerClass::Crypto => write!(f, "Crypto"),
            TickerClass::Equity => write!(f, "Equity"),
        }
    }
}

/// A normalized ticker symbol (trimmed, uppercased).
///
/// Tickers are free text from the input surface; normalization happens
/// once here so that lookups, caching, and removal all agree on the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify by naming convention: a `-USD` suffix marks a crypto pair.
    pub fn class(&self) -> TickerClass {
        if self.0.ends_with("-USD") {
            TickerClass::Crypto
        } else {
            TickerClass::Equity
        }
    }

    /// The base symbol without the `-USD` pair suffix, if any
    /// (e.g., "BTC-USD" → "BTC", "AAPL" → "AAPL").
    pub fn base_symbol(&self) -> &str {
        self.0.strip_suffix("-USD").unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

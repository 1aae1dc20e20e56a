use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::ticker::{Ticker, TickerClass};

/// Trait abstraction for all live quote sources.
///
/// Each source (Binance, Yahoo Finance) implements this trait. If a
/// source stops working or changes its API, we replace only that one
/// implementation — the rest of the codebase is untouched.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which ticker classes this provider can handle.
    fn supported_classes(&self) -> Vec<TickerClass>;

    /// Get the current (latest) price for a ticker.
    async fn latest_price(&self, ticker: &Ticker) -> Result<f64, CoreError>;

    /// Get a human-readable display name for a ticker.
    /// Providers without descriptive metadata return an `Api` error;
    /// the name resolver falls back to the ticker itself.
    async fn display_name(&self, ticker: &Ticker) -> Result<String, CoreError>;
}

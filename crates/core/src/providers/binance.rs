use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::ticker::{Ticker, TickerClass};

const BASE_URL: &str = "https://api.binance.com/api/v3";

/// Binance public ticker-price endpoint for crypto pairs.
///
/// - **Free**: No API key required.
/// - **Fast**: single keyed lookup, aggressive 2-second timeout — this
///   is the low-latency path tried before the general market source.
/// - **Endpoint**: `/ticker/price?symbol={PAIR}`
///
/// Tickers use the `XXX-USD` convention; Binance trades against USDT,
/// so `BTC-USD` maps to the `BTCUSDT` pair.
pub struct BinanceProvider {
    client: Client,
}

impl BinanceProvider {
    pub fn new() -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(2));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    /// Map a crypto ticker to its Binance pair symbol
    /// (`BTC-USD` → `BTCUSDT`). Returns `None` for non-crypto tickers.
    pub fn pair_symbol(ticker: &Ticker) -> Option<String> {
        if ticker.class() != TickerClass::Crypto {
            return None;
        }
        Some(format!("{}USDT", ticker.base_symbol()))
    }
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Binance API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct TickerPriceResponse {
    /// Price comes back as a decimal string, e.g. "67412.51000000"
    price: String,
}

#[async_trait]
impl QuoteProvider for BinanceProvider {
    fn name(&self) -> &str {
        "Binance"
    }

    fn supported_classes(&self) -> Vec<TickerClass> {
        vec![TickerClass::Crypto]
    }

    async fn latest_price(&self, ticker: &Ticker) -> Result<f64, CoreError> {
        let pair = Self::pair_symbol(ticker).ok_or_else(|| CoreError::Api {
            provider: "Binance".into(),
            message: format!("{ticker} is not a crypto pair"),
        })?;
        let url = format!("{BASE_URL}/ticker/price?symbol={pair}");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CoreError::Api {
                provider: "Binance".into(),
                message: format!("HTTP {} for {pair}", response.status()),
            });
        }

        let body: TickerPriceResponse =
            response.json().await.map_err(|e| CoreError::Api {
                provider: "Binance".into(),
                message: format!("Failed to parse response for {pair}: {e}"),
            })?;

        body.price.parse().map_err(|e| CoreError::Api {
            provider: "Binance".into(),
            message: format!("Invalid price format for {pair}: {e}"),
        })
    }

    async fn display_name(&self, ticker: &Ticker) -> Result<String, CoreError> {
        // The ticker-price endpoint carries no descriptive metadata.
        Err(CoreError::Api {
            provider: "Binance".into(),
            message: format!("No display name available for {ticker}"),
        })
    }
}

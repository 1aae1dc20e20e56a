use async_trait::async_trait;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::ticker::{Ticker, TickerClass};

/// Yahoo Finance provider — the general-purpose market data source.
///
/// - **Free**: No API key required (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices, crypto pairs.
///
/// Uses the `yahoo_finance_api` crate. The price lookup walks a chain
/// of fallbacks within one response: last minute-bar close, then the
/// regular market price from chart metadata, then the previous close.
/// Display names come from the ticker search endpoint.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn supported_classes(&self) -> Vec<TickerClass> {
        vec![TickerClass::Crypto, TickerClass::Equity]
    }

    async fn latest_price(&self, ticker: &Ticker) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(ticker.as_str(), "1m")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {ticker}: {e}"),
            })?;

        // Last minute-bar trade price, when the chart has bars
        if let Ok(quote) = resp.last_quote() {
            return Ok(quote.close);
        }

        // Chart came back bar-less (pre-market, thin listing):
        // fall back to the metadata price fields
        let meta = resp.metadata().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {ticker}: {e}"),
        })?;

        if let Some(price) = meta.regular_market_price {
            if price > 0.0 {
                return Ok(price);
            }
        }
        if let Some(prev) = meta.previous_close {
            if prev > 0.0 {
                return Ok(prev);
            }
        }
        if let Some(prev) = meta.chart_previous_close {
            if prev > 0.0 {
                return Ok(prev);
            }
        }

        Err(CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No usable price field for {ticker}"),
        })
    }

    async fn display_name(&self, ticker: &Ticker) -> Result<String, CoreError> {
        let resp = self
            .connector
            .search_ticker(ticker.as_str())
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to search for {ticker}: {e}"),
            })?;

        // Find the entry whose symbol matches (case-insensitive)
        let item = resp
            .quotes
            .iter()
            .find(|q| q.symbol.to_uppercase() == ticker.as_str())
            .ok_or_else(|| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("No search result for {ticker}"),
            })?;

        let name = if !item.long_name.is_empty() {
            item.long_name.clone()
        } else if !item.short_name.is_empty() {
            item.short_name.clone()
        } else {
            return Err(CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Search result for {ticker} has no name"),
            });
        };

        Ok(name)
    }
}

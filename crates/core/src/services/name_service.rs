use log::debug;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::ticker::Ticker;
use crate::providers::registry::QuoteProviderRegistry;

/// Well-known crypto pairs. The `-USD` suffix convention means these
/// never need a provider round-trip for a name.
const CRYPTO_NAMES: &[(&str, &str)] = &[
    ("BTC-USD", "Bitcoin"),
    ("ETH-USD", "Ethereum"),
    ("SOL-USD", "Solana"),
    ("BNB-USD", "Binance Coin"),
    ("XRP-USD", "XRP"),
    ("TAO-USD", "Bittensor"),
    ("ADA-USD", "Cardano"),
    ("DOT-USD", "Polkadot"),
    ("LINK-USD", "Chainlink"),
    ("DOGE-USD", "Dogecoin"),
    ("AVAX-USD", "Avalanche"),
    ("LTC-USD", "Litecoin"),
];

/// Common equities and ETFs, seeded so a fresh portfolio renders
/// recognizable names before any metadata fetch.
const EQUITY_NAMES: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com, Inc."),
    ("TSLA", "Tesla, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("IWDA.AS", "iShares Core MSCI World"),
    ("VWCE.DE", "Vanguard FTSE All-World"),
    ("CSPX.L", "iShares Core S&P 500"),
    ("VUSA.L", "Vanguard S&P 500"),
];

struct CachedName {
    name: String,
    stored_at: Instant,
}

/// Resolves a ticker to a display name.
///
/// Lookup order: static table → provider metadata → the ticker itself.
/// Resolution never fails; the worst case is echoing the symbol back.
/// Provider-sourced names are cached for a long duration (names don't
/// change) and truncated to the configured display cap.
pub struct NameService {
    ttl: Duration,
    max_len: usize,
    cache: Mutex<HashMap<Ticker, CachedName>>,
}

impl NameService {
    pub fn new(ttl: Duration, max_len: usize) -> Self {
        Self {
            ttl,
            max_len,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Reconfigure TTL and truncation cap (applies to new lookups).
    pub fn set_config(&mut self, ttl: Duration, max_len: usize) {
        self.ttl = ttl;
        self.max_len = max_len;
    }

    /// Resolve a display name for a ticker.
    pub async fn get_name(&self, ticker: &Ticker, registry: &QuoteProviderRegistry) -> String {
        if let Some(name) = Self::static_name(ticker) {
            return name.to_string();
        }

        if let Some(name) = self.cached(ticker) {
            return name;
        }

        for provider in registry.get_providers_for(&ticker.class()) {
            match provider.display_name(ticker).await {
                Ok(name) => {
                    let name = self.truncate(&name);
                    self.store(ticker.clone(), name.clone());
                    return name;
                }
                Err(e) => {
                    debug!("{} has no name for {ticker}: {e}", provider.name());
                }
            }
        }

        // Last resort: crypto pairs read better without the suffix
        ticker.base_symbol().to_string()
    }

    fn static_name(ticker: &Ticker) -> Option<&'static str> {
        let symbol = ticker.as_str();
        CRYPTO_NAMES
            .iter()
            .chain(EQUITY_NAMES.iter())
            .find(|(sym, _)| *sym == symbol)
            .map(|(_, name)| *name)
    }

    fn truncate(&self, name: &str) -> String {
        if name.chars().count() > self.max_len {
            let head: String = name.chars().take(self.max_len).collect();
            format!("{head}...")
        } else {
            name.to_string()
        }
    }

    fn cached(&self, ticker: &Ticker) -> Option<String> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .get(ticker)
            .filter(|c| c.stored_at.elapsed() < self.ttl)
            .map(|c| c.name.clone())
    }

    fn store(&self, ticker: Ticker, name: String) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            ticker,
            CachedName {
                name,
                stored_at: Instant::now(),
            },
        );
    }
}

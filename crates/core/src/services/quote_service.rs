use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::errors::CoreError;
use crate::models::quote::{Quote, QuoteUnavailable, UnavailableReason};
use crate::models::ticker::{Ticker, TickerClass};
use crate::providers::registry::QuoteProviderRegistry;

struct CachedQuote {
    quote: Quote,
    stored_at: Instant,
}

/// The quote provider adapter: fetches live prices with provider
/// fallback and a short-lived per-ticker cache.
///
/// This is the error boundary of the system. Every provider failure is
/// caught here and converted into a typed `QuoteUnavailable`; nothing
/// propagates past this service. Callers treat an unavailable quote as "exclude this
/// holding from this cycle", and the next refresh cycle is the retry.
///
/// Cache strategy: a fetched quote stays fresh for a few seconds so
/// that one render pass (valuation + probes) doesn't hit the network
/// twice for the same ticker. The refresh loop calls `invalidate()` at
/// the start of each cycle, so every cycle re-fetches.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
    ttl: Duration,
    cache: Mutex<HashMap<Ticker, CachedQuote>>,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry, ttl: Duration) -> Self {
        Self {
            registry,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The provider registry, for callers that resolve names.
    pub fn registry(&self) -> &QuoteProviderRegistry {
        &self.registry
    }

    /// Check if at least one provider is available for a ticker class.
    pub fn has_provider_for(&self, class: &TickerClass) -> bool {
        self.registry.get_provider_for(class).is_some()
    }

    /// Names of the providers that would be tried for a ticker class,
    /// in fallback order.
    pub fn provider_names(&self, class: &TickerClass) -> Vec<String> {
        self.registry
            .get_providers_for(class)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Reconfigure the cache TTL (applies to subsequent fetches).
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Drop all cached quotes. Called at the start of each refresh
    /// cycle so the cycle works from live prices.
    pub fn invalidate(&self) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Get the current price for a ticker.
    ///
    /// 1. Fresh cache entry → return it.
    /// 2. Otherwise try each provider for the ticker's class in
    ///    registry order; first finite positive price wins.
    /// 3. All failed → `QuoteUnavailable` carrying the last reason.
    pub async fn get_price(&self, ticker: &Ticker) -> Result<Quote, QuoteUnavailable> {
        if let Some(quote) = self.cached(ticker) {
            debug!("quote cache hit for {ticker}");
            return Ok(quote);
        }

        let class = ticker.class();
        let providers = self.registry.get_providers_for(&class);
        if providers.is_empty() {
            return Err(QuoteUnavailable {
                ticker: ticker.clone(),
                reason: UnavailableReason::NotFound,
            });
        }

        let mut last_reason = UnavailableReason::NotFound;
        for provider in &providers {
            match provider.latest_price(ticker).await {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    let quote = Quote::new(ticker.clone(), price);
                    self.store(quote.clone());
                    return Ok(quote);
                }
                Ok(price) => {
                    warn!(
                        "{} returned invalid price {price} for {ticker}",
                        provider.name()
                    );
                    last_reason = UnavailableReason::Malformed(format!(
                        "invalid price {price} from {}",
                        provider.name()
                    ));
                }
                Err(e) => {
                    warn!("{} failed for {ticker}: {e}", provider.name());
                    last_reason = UnavailableReason::from(&e);
                }
            }
        }

        Err(QuoteUnavailable {
            ticker: ticker.clone(),
            reason: last_reason,
        })
    }

    /// Add-time probe: can a price be resolved for this ticker at all?
    pub async fn probe(&self, ticker: &Ticker) -> bool {
        self.get_price(ticker).await.is_ok()
    }

    fn cached(&self, ticker: &Ticker) -> Option<Quote> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .get(ticker)
            .filter(|c| c.stored_at.elapsed() < self.ttl)
            .map(|c| c.quote.clone())
    }

    fn store(&self, quote: Quote) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            quote.ticker.clone(),
            CachedQuote {
                quote,
                stored_at: Instant::now(),
            },
        );
    }
}

impl From<&CoreError> for UnavailableReason {
    fn from(e: &CoreError) -> Self {
        match e {
            CoreError::Network(msg) => UnavailableReason::Network(msg.clone()),
            CoreError::NoProvider(_) | CoreError::TickerNotFound(_) => {
                UnavailableReason::NotFound
            }
            CoreError::Api { message, .. } => UnavailableReason::Malformed(message.clone()),
            other => UnavailableReason::Malformed(other.to_string()),
        }
    }
}

use crate::models::ticker::TickerClass;

use super::binance::BinanceProvider;
use super::traits::QuoteProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all available quote providers.
///
/// Routes requests by `TickerClass`, in registration order: for crypto
/// pairs the low-latency exchange endpoint comes first with Yahoo as
/// fallback; equities go straight to Yahoo. New providers can be
/// registered without modifying existing code.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with the default providers pre-configured.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();

        // Binance — crypto fast path, no API key needed
        registry.register(Box::new(BinanceProvider::new()));

        // Yahoo Finance — equities/ETFs, crypto fallback, no API key needed
        if let Ok(yahoo) = YahooFinanceProvider::new() {
            registry.register(Box::new(yahoo));
        }

        registry
    }

    /// Register a new quote provider.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given ticker class.
    pub fn get_provider_for(&self, class: &TickerClass) -> Option<&dyn QuoteProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_classes().contains(class))
            .map(|p| p.as_ref())
    }

    /// Return ALL providers supporting the given class, in registration
    /// order. Used for fallback: if the first fails, try the next one.
    pub fn get_providers_for(&self, class: &TickerClass) -> Vec<&dyn QuoteProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_classes().contains(class))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════
// Service Tests — QuoteService, NameService, HoldingsService,
// ValuationService
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::holding::Holding;
use portfolio_tracker_core::models::portfolio::Portfolio;
use portfolio_tracker_core::models::quote::UnavailableReason;
use portfolio_tracker_core::models::ticker::{Ticker, TickerClass};
use portfolio_tracker_core::providers::registry::QuoteProviderRegistry;
use portfolio_tracker_core::providers::traits::QuoteProvider;
use portfolio_tracker_core::services::holdings_service::HoldingsService;
use portfolio_tracker_core::services::name_service::NameService;
use portfolio_tracker_core::services::quote_service::QuoteService;
use portfolio_tracker_core::services::valuation_service::ValuationService;

// ═══════════════════════════════════════════════════════════════════
// Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// Serves a fixed price table and counts every fetch.
struct MockQuoteProvider {
    prices: HashMap<String, f64>,
    names: HashMap<String, String>,
    price_calls: Arc<AtomicUsize>,
    name_calls: Arc<AtomicUsize>,
}

impl MockQuoteProvider {
    fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(s, p)| (s.to_string(), *p))
                .collect(),
            names: HashMap::new(),
            price_calls: Arc::new(AtomicUsize::new(0)),
            name_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_names(mut self, names: &[(&str, &str)]) -> Self {
        self.names = names
            .iter()
            .map(|(s, n)| (s.to_string(), n.to_string()))
            .collect();
        self
    }

    fn price_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.price_calls)
    }

    fn name_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.name_calls)
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    fn supported_classes(&self) -> Vec<TickerClass> {
        vec![TickerClass::Crypto, TickerClass::Equity]
    }

    async fn latest_price(&self, ticker: &Ticker) -> Result<f64, CoreError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        self.prices
            .get(ticker.as_str())
            .copied()
            .ok_or_else(|| CoreError::Api {
                provider: "Mock".into(),
                message: format!("no price for {ticker}"),
            })
    }

    async fn display_name(&self, ticker: &Ticker) -> Result<String, CoreError> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        self.names
            .get(ticker.as_str())
            .cloned()
            .ok_or_else(|| CoreError::Api {
                provider: "Mock".into(),
                message: format!("no name for {ticker}"),
            })
    }
}

/// Always fails with a chosen error kind.
enum FailKind {
    Network,
    Api,
}

struct FailingProvider {
    kind: FailKind,
}

#[async_trait]
impl QuoteProvider for FailingProvider {
    fn name(&self) -> &str {
        "Failing"
    }

    fn supported_classes(&self) -> Vec<TickerClass> {
        vec![TickerClass::Crypto, TickerClass::Equity]
    }

    async fn latest_price(&self, _ticker: &Ticker) -> Result<f64, CoreError> {
        Err(match self.kind {
            FailKind::Network => CoreError::Network("connection timed out".into()),
            FailKind::Api => CoreError::Api {
                provider: "Failing".into(),
                message: "bad body".into(),
            },
        })
    }

    async fn display_name(&self, _ticker: &Ticker) -> Result<String, CoreError> {
        Err(CoreError::Api {
            provider: "Failing".into(),
            message: "no names".into(),
        })
    }
}

/// Serves a constant price, regardless of ticker.
struct ConstantProvider {
    price: f64,
}

#[async_trait]
impl QuoteProvider for ConstantProvider {
    fn name(&self) -> &str {
        "Constant"
    }

    fn supported_classes(&self) -> Vec<TickerClass> {
        vec![TickerClass::Crypto, TickerClass::Equity]
    }

    async fn latest_price(&self, _ticker: &Ticker) -> Result<f64, CoreError> {
        Ok(self.price)
    }

    async fn display_name(&self, _ticker: &Ticker) -> Result<String, CoreError> {
        Err(CoreError::Api {
            provider: "Constant".into(),
            message: "no names".into(),
        })
    }
}

fn registry_with(provider: Box<dyn QuoteProvider>) -> QuoteProviderRegistry {
    let mut registry = QuoteProviderRegistry::new();
    registry.register(provider);
    registry
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// QuoteService
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn quote_service_fetches_and_caches_within_ttl() {
    let mock = MockQuoteProvider::new(&[("AAPL", 165.0)]);
    let calls = mock.price_calls();
    let service = QuoteService::new(registry_with(Box::new(mock)), Duration::from_secs(60));

    let ticker = Ticker::new("AAPL");
    let first = service.get_price(&ticker).await.unwrap();
    let second = service.get_price(&ticker).await.unwrap();

    assert_eq!(first.price, 165.0);
    assert_eq!(second.price, 165.0);
    // Second lookup served from cache
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn quote_service_invalidate_forces_refetch() {
    let mock = MockQuoteProvider::new(&[("BTC-USD", 67000.0)]);
    let calls = mock.price_calls();
    let service = QuoteService::new(registry_with(Box::new(mock)), Duration::from_secs(60));

    let ticker = Ticker::new("BTC-USD");
    service.get_price(&ticker).await.unwrap();
    service.invalidate();
    service.get_price(&ticker).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn quote_service_zero_ttl_never_caches() {
    let mock = MockQuoteProvider::new(&[("ETH-USD", 3500.0)]);
    let calls = mock.price_calls();
    let service = QuoteService::new(registry_with(Box::new(mock)), Duration::ZERO);

    let ticker = Ticker::new("ETH-USD");
    service.get_price(&ticker).await.unwrap();
    service.get_price(&ticker).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn quote_service_falls_back_to_next_provider() {
    let mut registry = QuoteProviderRegistry::new();
    registry.register(Box::new(FailingProvider {
        kind: FailKind::Network,
    }));
    registry.register(Box::new(ConstantProvider { price: 42.5 }));
    let service = QuoteService::new(registry, Duration::from_secs(60));

    let quote = service.get_price(&Ticker::new("SOL-USD")).await.unwrap();
    assert_eq!(quote.price, 42.5);
}

#[tokio::test]
async fn quote_service_rejects_non_positive_prices() {
    let mut registry = QuoteProviderRegistry::new();
    registry.register(Box::new(ConstantProvider { price: 0.0 }));
    registry.register(Box::new(ConstantProvider { price: 99.0 }));
    let service = QuoteService::new(registry, Duration::from_secs(60));

    // Zero from the first provider is invalid; the second one wins
    let quote = service.get_price(&Ticker::new("XRP-USD")).await.unwrap();
    assert_eq!(quote.price, 99.0);
}

#[tokio::test]
async fn quote_service_classifies_network_failures() {
    let service = QuoteService::new(
        registry_with(Box::new(FailingProvider {
            kind: FailKind::Network,
        })),
        Duration::from_secs(60),
    );

    let err = service.get_price(&Ticker::new("AAPL")).await.unwrap_err();
    assert_eq!(err.ticker, Ticker::new("AAPL"));
    assert!(matches!(err.reason, UnavailableReason::Network(_)));
}

#[tokio::test]
async fn quote_service_classifies_api_failures_as_malformed() {
    let service = QuoteService::new(
        registry_with(Box::new(FailingProvider {
            kind: FailKind::Api,
        })),
        Duration::from_secs(60),
    );

    let err = service.get_price(&Ticker::new("AAPL")).await.unwrap_err();
    assert!(matches!(err.reason, UnavailableReason::Malformed(_)));
}

#[tokio::test]
async fn quote_service_reports_not_found_without_providers() {
    let registry = QuoteProviderRegistry::new();
    let service = QuoteService::new(registry, Duration::from_secs(60));

    let err = service.get_price(&Ticker::new("AAPL")).await.unwrap_err();
    assert_eq!(err.reason, UnavailableReason::NotFound);
}

#[tokio::test]
async fn quote_service_probe_matches_availability() {
    let mock = MockQuoteProvider::new(&[("AAPL", 165.0)]);
    let service = QuoteService::new(registry_with(Box::new(mock)), Duration::from_secs(60));

    assert!(service.probe(&Ticker::new("AAPL")).await);
    assert!(!service.probe(&Ticker::new("NOPE")).await);
}

#[tokio::test]
async fn quote_service_provider_introspection() {
    let mock = MockQuoteProvider::new(&[]);
    let service = QuoteService::new(registry_with(Box::new(mock)), Duration::from_secs(60));

    assert!(service.has_provider_for(&TickerClass::Crypto));
    assert_eq!(service.provider_names(&TickerClass::Equity), vec!["Mock"]);
}

// ═══════════════════════════════════════════════════════════════════
// NameService
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn name_service_prefers_the_static_table() {
    let mock = MockQuoteProvider::new(&[]).with_names(&[("BTC-USD", "Should not be used")]);
    let name_calls = mock.name_calls();
    let registry = registry_with(Box::new(mock));
    let service = NameService::new(Duration::from_secs(1800), 25);

    assert_eq!(service.get_name(&Ticker::new("BTC-USD"), &registry).await, "Bitcoin");
    assert_eq!(service.get_name(&Ticker::new("aapl"), &registry).await, "Apple Inc.");
    assert_eq!(name_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn name_service_uses_provider_metadata_and_caches_it() {
    let mock =
        MockQuoteProvider::new(&[]).with_names(&[("SHOP", "Shopify Inc.")]);
    let name_calls = mock.name_calls();
    let registry = registry_with(Box::new(mock));
    let service = NameService::new(Duration::from_secs(1800), 25);

    let ticker = Ticker::new("SHOP");
    assert_eq!(service.get_name(&ticker, &registry).await, "Shopify Inc.");
    assert_eq!(service.get_name(&ticker, &registry).await, "Shopify Inc.");
    assert_eq!(name_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn name_service_truncates_long_names() {
    let mock = MockQuoteProvider::new(&[]).with_names(&[(
        "TSM",
        "Taiwan Semiconductor Manufacturing Company Limited",
    )]);
    let registry = registry_with(Box::new(mock));
    let service = NameService::new(Duration::from_secs(1800), 25);

    let name = service.get_name(&Ticker::new("TSM"), &registry).await;
    assert_eq!(name, "Taiwan Semiconductor Manu...");
    assert_eq!(name.chars().count(), 28); // 25 + "..."
}

#[tokio::test]
async fn name_service_falls_back_to_the_base_symbol() {
    let registry = registry_with(Box::new(MockQuoteProvider::new(&[])));
    let service = NameService::new(Duration::from_secs(1800), 25);

    // Unknown crypto pair: suffix stripped for readability
    assert_eq!(service.get_name(&Ticker::new("FOO-USD"), &registry).await, "FOO");
    // Unknown equity: ticker echoed back
    assert_eq!(service.get_name(&Ticker::new("ZZZT"), &registry).await, "ZZZT");
}

// ═══════════════════════════════════════════════════════════════════
// HoldingsService
// ═══════════════════════════════════════════════════════════════════

#[test]
fn holdings_add_preserves_insertion_order_and_duplicates() {
    let service = HoldingsService::new();
    let mut portfolio = Portfolio::default();

    service
        .add(&mut portfolio, Holding::new("AAPL", 10.0, 150.0, date(2025, 1, 15)))
        .unwrap();
    service
        .add(&mut portfolio, Holding::new("BTC-USD", 0.5, 40000.0, date(2025, 2, 1)))
        .unwrap();
    service
        .add(&mut portfolio, Holding::new("AAPL", 5.0, 170.0, date(2025, 3, 1)))
        .unwrap();

    let tickers: Vec<&str> = portfolio.holdings.iter().map(|h| h.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["AAPL", "BTC-USD", "AAPL"]);
}

#[test]
fn holdings_add_rejects_non_positive_values() {
    let service = HoldingsService::new();
    let mut portfolio = Portfolio::default();

    let err = service
        .add(&mut portfolio, Holding::new("AAPL", 0.0, 150.0, date(2025, 1, 15)))
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));

    let err = service
        .add(&mut portfolio, Holding::new("AAPL", 1.0, -5.0, date(2025, 1, 15)))
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));

    let err = service
        .add(&mut portfolio, Holding::new("AAPL", f64::NAN, 150.0, date(2025, 1, 15)))
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));

    assert!(portfolio.is_empty());
}

#[test]
fn holdings_remove_all_matches_every_row_and_keeps_order() {
    let service = HoldingsService::new();
    let mut portfolio = Portfolio::default();
    for (t, q) in [("AAPL", 10.0), ("BTC-USD", 0.5), ("AAPL", 5.0), ("MSFT", 2.0)] {
        service
            .add(&mut portfolio, Holding::new(t, q, 100.0, date(2025, 1, 15)))
            .unwrap();
    }

    let removed = service.remove_all(&mut portfolio, &Ticker::new("aapl"));
    assert_eq!(removed, 2);

    let tickers: Vec<&str> = portfolio.holdings.iter().map(|h| h.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["BTC-USD", "MSFT"]);

    // Removing a ticker that isn't there is a no-op
    assert_eq!(service.remove_all(&mut portfolio, &Ticker::new("AAPL")), 0);
}

#[test]
fn holdings_add_then_remove_restores_the_prior_list() {
    let service = HoldingsService::new();
    let mut portfolio = Portfolio::default();
    service
        .add(&mut portfolio, Holding::new("MSFT", 1.0, 400.0, date(2025, 1, 1)))
        .unwrap();
    service
        .add(&mut portfolio, Holding::new("ETH-USD", 2.0, 3000.0, date(2025, 1, 2)))
        .unwrap();
    let before = portfolio.holdings.clone();

    service
        .add(&mut portfolio, Holding::new("TSLA", 3.0, 250.0, date(2025, 1, 3)))
        .unwrap();
    service.remove_all(&mut portfolio, &Ticker::new("TSLA"));

    assert_eq!(portfolio.holdings, before);
}

#[test]
fn holdings_remove_at_takes_one_selected_row() {
    let service = HoldingsService::new();
    let mut portfolio = Portfolio::default();
    for (t, q) in [("AAPL", 10.0), ("AAPL", 5.0)] {
        service
            .add(&mut portfolio, Holding::new(t, q, 100.0, date(2025, 1, 15)))
            .unwrap();
    }

    let removed = service.remove_at(&mut portfolio, 0).unwrap();
    assert_eq!(removed.quantity, 10.0);
    assert_eq!(portfolio.holdings.len(), 1);
    assert_eq!(portfolio.holdings[0].quantity, 5.0);

    let err = service.remove_at(&mut portfolio, 5).unwrap_err();
    assert!(matches!(err, CoreError::HoldingNotFound(_)));
}

#[test]
fn holdings_clear_empties_the_portfolio() {
    let service = HoldingsService::new();
    let mut portfolio = Portfolio::default();
    service
        .add(&mut portfolio, Holding::new("AAPL", 10.0, 150.0, date(2025, 1, 15)))
        .unwrap();

    service.clear(&mut portfolio);
    assert!(portfolio.is_empty());
}

// ═══════════════════════════════════════════════════════════════════
// ValuationService
// ═══════════════════════════════════════════════════════════════════

fn valuation_fixture(
    prices: &[(&str, f64)],
) -> (QuoteService, NameService, ValuationService) {
    let mock = MockQuoteProvider::new(prices);
    let quote_service = QuoteService::new(registry_with(Box::new(mock)), Duration::from_secs(60));
    let name_service = NameService::new(Duration::from_secs(1800), 25);
    (quote_service, name_service, ValuationService::new())
}

#[tokio::test]
async fn valuation_row_math_is_exact() {
    let (quotes, names, valuation) = valuation_fixture(&[("AAPL", 165.0)]);
    let holdings = vec![Holding::new("AAPL", 10.0, 150.0, date(2025, 1, 15))];

    let (rows, summary) = valuation.evaluate(&holdings, &quotes, &names).await;

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.current_price, 165.0);
    assert_eq!(row.current_value, 1650.0);
    assert_eq!(row.invested_value, 1500.0);
    assert_eq!(row.gain_loss, 150.0);
    assert_eq!(row.gain_loss_pct, 10.0);
    assert_eq!(row.weight_pct, 100.0);
    assert_eq!(row.name, "Apple Inc.");

    assert_eq!(summary.position_count, 1);
    assert_eq!(summary.total_value, 1650.0);
    assert_eq!(summary.total_invested, 1500.0);
    assert_eq!(summary.total_gain_loss, 150.0);
    assert_eq!(summary.total_return_pct, 10.0);
}

#[tokio::test]
async fn valuation_weights_split_by_current_value() {
    // AAPL worth 1650, BTC-USD worth 350 → 82.5% / 17.5% of 2000
    let (quotes, names, valuation) =
        valuation_fixture(&[("AAPL", 165.0), ("BTC-USD", 350.0)]);
    let holdings = vec![
        Holding::new("AAPL", 10.0, 150.0, date(2025, 1, 15)),
        Holding::new("BTC-USD", 1.0, 300.0, date(2025, 2, 1)),
    ];

    let (rows, summary) = valuation.evaluate(&holdings, &quotes, &names).await;

    assert_eq!(summary.total_value, 2000.0);
    assert!((rows[0].weight_pct - 82.5).abs() < 1e-9);
    assert!((rows[1].weight_pct - 17.5).abs() < 1e-9);

    let weight_sum: f64 = rows.iter().map(|r| r.weight_pct).sum();
    assert!((weight_sum - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn valuation_excludes_unavailable_tickers_everywhere() {
    // No price for MISSING: its row and its money vanish from this cycle
    let (quotes, names, valuation) = valuation_fixture(&[("AAPL", 165.0)]);
    let holdings = vec![
        Holding::new("AAPL", 10.0, 150.0, date(2025, 1, 15)),
        Holding::new("MISSING", 4.0, 50.0, date(2025, 1, 20)),
    ];

    let (rows, summary) = valuation.evaluate(&holdings, &quotes, &names).await;

    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|r| r.ticker.as_str() != "MISSING"));
    assert_eq!(summary.position_count, 1);
    assert_eq!(summary.total_value, 1650.0);
    assert_eq!(summary.total_invested, 1500.0);
    assert_eq!(rows[0].weight_pct, 100.0);
}

#[tokio::test]
async fn valuation_of_empty_holdings_is_empty_and_zeroed() {
    let (quotes, names, valuation) = valuation_fixture(&[]);

    let (rows, summary) = valuation.evaluate(&[], &quotes, &names).await;

    assert!(rows.is_empty());
    assert_eq!(summary.total_value, 0.0);
    assert!(summary.best.is_none());
    assert!(summary.worst.is_none());
}

#[tokio::test]
async fn valuation_is_idempotent_for_fixed_quotes() {
    let (quotes, names, valuation) =
        valuation_fixture(&[("AAPL", 165.0), ("BTC-USD", 350.0)]);
    let holdings = vec![
        Holding::new("AAPL", 10.0, 150.0, date(2025, 1, 15)),
        Holding::new("BTC-USD", 1.0, 300.0, date(2025, 2, 1)),
    ];

    let (rows_a, summary_a) = valuation.evaluate(&holdings, &quotes, &names).await;
    let (rows_b, summary_b) = valuation.evaluate(&holdings, &quotes, &names).await;

    assert_eq!(rows_a, rows_b);
    assert_eq!(summary_a.total_value, summary_b.total_value);
    assert_eq!(summary_a.average_return_pct, summary_b.average_return_pct);
}

#[tokio::test]
async fn valuation_average_best_and_worst() {
    // AAPL +10%, BTC-USD +50%, ETH-USD -20%
    let (quotes, names, valuation) = valuation_fixture(&[
        ("AAPL", 165.0),
        ("BTC-USD", 450.0),
        ("ETH-USD", 80.0),
    ]);
    let holdings = vec![
        Holding::new("AAPL", 10.0, 150.0, date(2025, 1, 15)),
        Holding::new("BTC-USD", 1.0, 300.0, date(2025, 2, 1)),
        Holding::new("ETH-USD", 1.0, 100.0, date(2025, 3, 1)),
    ];

    let (_, summary) = valuation.evaluate(&holdings, &quotes, &names).await;

    assert!((summary.average_return_pct - (10.0 + 50.0 - 20.0) / 3.0).abs() < 1e-9);
    assert_eq!(summary.best.as_ref().unwrap().ticker, Ticker::new("BTC-USD"));
    assert_eq!(summary.worst.as_ref().unwrap().ticker, Ticker::new("ETH-USD"));
}

#[tokio::test]
async fn valuation_ties_go_to_the_first_row() {
    // Both rows at exactly +10%
    let (quotes, names, valuation) =
        valuation_fixture(&[("AAPL", 110.0), ("MSFT", 220.0)]);
    let holdings = vec![
        Holding::new("AAPL", 1.0, 100.0, date(2025, 1, 15)),
        Holding::new("MSFT", 1.0, 200.0, date(2025, 1, 15)),
    ];

    let (_, summary) = valuation.evaluate(&holdings, &quotes, &names).await;

    assert_eq!(summary.best.as_ref().unwrap().ticker, Ticker::new("AAPL"));
    assert_eq!(summary.worst.as_ref().unwrap().ticker, Ticker::new("AAPL"));
}

#[tokio::test]
async fn valuation_zero_invested_reads_as_zero_percent() {
    let (quotes, names, valuation) = valuation_fixture(&[("GIFT", 50.0)]);
    // Constructed directly: the input boundary would normally reject this
    let holdings = vec![Holding::new("GIFT", 2.0, 0.0, date(2025, 1, 15))];

    let (rows, summary) = valuation.evaluate(&holdings, &quotes, &names).await;

    assert_eq!(rows[0].gain_loss_pct, 0.0);
    assert_eq!(rows[0].current_value, 100.0);
    assert_eq!(summary.total_return_pct, 0.0);
}

#[tokio::test]
async fn valuation_duplicate_tickers_stay_separate_rows() {
    let (quotes, names, valuation) = valuation_fixture(&[("AAPL", 165.0)]);
    let holdings = vec![
        Holding::new("AAPL", 10.0, 150.0, date(2025, 1, 15)),
        Holding::new("AAPL", 5.0, 170.0, date(2025, 3, 1)),
    ];

    let (rows, summary) = valuation.evaluate(&holdings, &quotes, &names).await;

    assert_eq!(rows.len(), 2);
    assert_eq!(summary.total_value, 1650.0 + 825.0);
    // Same live price, different cost basis, different performance
    assert_eq!(rows[0].gain_loss_pct, 10.0);
    assert!(rows[1].gain_loss_pct < 0.0);
}

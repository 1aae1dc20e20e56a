pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use tokio::sync::watch;

use errors::CoreError;
use models::{
    holding::Holding,
    portfolio::Portfolio,
    settings::Settings,
    ticker::Ticker,
    valuation::{PortfolioSummary, ValuationRow},
};
use providers::registry::QuoteProviderRegistry;
use services::{
    holdings_service::HoldingsService, name_service::NameService, quote_service::QuoteService,
    refresh_service::RefreshService, refresh_service::RenderSink,
    valuation_service::ValuationService,
};

/// Main entry point for the portfolio tracker core library.
/// Owns the session state (holdings, settings, refresh flags) and all
/// services needed to operate on it. One tracker per session; nothing
/// survives the process.
#[must_use]
pub struct PortfolioTracker {
    portfolio: Portfolio,
    quote_service: QuoteService,
    name_service: NameService,
    holdings_service: HoldingsService,
    valuation_service: ValuationService,
    refresh_service: RefreshService,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("holdings", &self.portfolio.holdings.len())
            .field("auto_refresh", &self.portfolio.auto_refresh)
            .field("cycles", &self.refresh_service.cycles())
            .field("last_update", &self.portfolio.last_update)
            .finish()
    }
}

impl PortfolioTracker {
    /// Create a tracker with an empty portfolio, default settings, and
    /// the default provider registry (Binance + Yahoo Finance).
    pub fn new() -> Self {
        Self::with_registry(QuoteProviderRegistry::new_with_defaults())
    }

    /// Create a tracker backed by a custom provider registry.
    /// This is how tests inject mock providers.
    pub fn with_registry(registry: QuoteProviderRegistry) -> Self {
        Self::build(Portfolio::default(), registry)
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Add a holding after a successful price probe.
    ///
    /// The probe is the only add-time gate beyond positivity checks:
    /// if no provider can resolve a price for the ticker right now,
    /// the holding is rejected with `TickerNotFound`.
    pub async fn add_holding(
        &mut self,
        ticker: impl AsRef<str>,
        quantity: f64,
        purchase_price: f64,
        purchase_date: NaiveDate,
    ) -> Result<(), CoreError> {
        let ticker = Ticker::new(ticker);

        if let Err(unavailable) = self.quote_service.get_price(&ticker).await {
            debug!("add rejected: {unavailable}");
            return Err(CoreError::TickerNotFound(ticker.to_string()));
        }

        let holding = Holding::new(ticker, quantity, purchase_price, purchase_date);
        self.holdings_service.add(&mut self.portfolio, holding)
    }

    /// Remove every holding matching the ticker.
    /// Returns the number of rows removed.
    pub fn remove_holding(&mut self, ticker: impl AsRef<str>) -> usize {
        let ticker = Ticker::new(ticker);
        self.holdings_service.remove_all(&mut self.portfolio, &ticker)
    }

    /// Remove one holding by its position in the list.
    pub fn remove_holding_at(&mut self, index: usize) -> Result<Holding, CoreError> {
        self.holdings_service.remove_at(&mut self.portfolio, index)
    }

    /// Remove all holdings.
    pub fn clear_holdings(&mut self) {
        self.holdings_service.clear(&mut self.portfolio);
    }

    /// All holdings, in insertion order.
    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.portfolio.holdings
    }

    #[must_use]
    pub fn holding_count(&self) -> usize {
        self.portfolio.holdings.len()
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Value every holding against live quotes.
    ///
    /// Holdings whose quote is unavailable are silently excluded from
    /// the rows and the aggregates. An empty portfolio yields empty
    /// rows and a zeroed summary; a non-empty portfolio in which every
    /// quote failed is the one whole-cycle failure surfaced to the
    /// user, as `NoValidPrices`.
    pub async fn evaluate(
        &mut self,
    ) -> Result<(Vec<ValuationRow>, PortfolioSummary), CoreError> {
        if self.portfolio.is_empty() {
            return Ok((Vec::new(), PortfolioSummary::empty()));
        }

        let (rows, summary) = self
            .valuation_service
            .evaluate(
                &self.portfolio.holdings,
                &self.quote_service,
                &self.name_service,
            )
            .await;

        if rows.is_empty() {
            return Err(CoreError::NoValidPrices);
        }

        self.portfolio.last_update = Some(Utc::now());
        Ok((rows, summary))
    }

    /// Resolve a display name for a ticker.
    pub async fn asset_name(&self, ticker: impl AsRef<str>) -> String {
        let ticker = Ticker::new(ticker);
        self.name_service
            .get_name(&ticker, self.quote_service.registry())
            .await
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Run the refresh loop: one pass when auto-refresh is off,
    /// otherwise cycling at the configured interval until stopped.
    /// See `services::refresh_service::stop_channel` for the handle.
    pub async fn run_refresh(
        &mut self,
        sink: &mut dyn RenderSink,
        stop: &mut watch::Receiver<bool>,
    ) {
        self.refresh_service
            .run(
                &mut self.portfolio,
                &self.quote_service,
                &self.name_service,
                &self.valuation_service,
                sink,
                stop,
            )
            .await;
    }

    /// Run exactly one evaluate-and-render pass.
    pub async fn run_refresh_cycle(&mut self, sink: &mut dyn RenderSink) {
        self.refresh_service
            .run_cycle(
                &mut self.portfolio,
                &self.quote_service,
                &self.name_service,
                &self.valuation_service,
                sink,
            )
            .await;
    }

    #[must_use]
    pub fn auto_refresh(&self) -> bool {
        self.portfolio.auto_refresh
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.portfolio.auto_refresh = enabled;
    }

    /// Flip the auto-refresh flag; returns the new state.
    pub fn toggle_auto_refresh(&mut self) -> bool {
        self.portfolio.auto_refresh = !self.portfolio.auto_refresh;
        self.portfolio.auto_refresh
    }

    /// Number of completed refresh cycles this session.
    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.refresh_service.cycles()
    }

    /// When the last evaluate-and-render pass completed.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.portfolio.last_update
    }

    /// Drop all cached quotes so the next fetch hits the providers.
    /// The refresh loop does this automatically at each cycle start.
    pub fn invalidate_quotes(&self) {
        self.quote_service.invalidate();
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Replace the settings and reconfigure the caches accordingly.
    pub fn set_settings(&mut self, settings: Settings) {
        self.quote_service.set_ttl(settings.quote_cache_ttl());
        self.name_service
            .set_config(settings.name_cache_ttl(), settings.max_name_len);
        self.portfolio.settings = settings;
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Serialize one cycle's rows as pretty JSON for the presentation
    /// layer (tables and charts).
    pub fn rows_to_json(rows: &[ValuationRow]) -> Result<String, CoreError> {
        serde_json::to_string_pretty(rows).map_err(CoreError::from)
    }

    /// Serialize a portfolio summary as pretty JSON.
    pub fn summary_to_json(summary: &PortfolioSummary) -> Result<String, CoreError> {
        serde_json::to_string_pretty(summary).map_err(CoreError::from)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(portfolio: Portfolio, registry: QuoteProviderRegistry) -> Self {
        let settings = &portfolio.settings;
        let quote_service = QuoteService::new(registry, settings.quote_cache_ttl());
        let name_service = NameService::new(settings.name_cache_ttl(), settings.max_name_len);

        Self {
            portfolio,
            quote_service,
            name_service,
            holdings_service: HoldingsService::new(),
            valuation_service: ValuationService::new(),
            refresh_service: RefreshService::new(),
        }
    }
}

impl Default for PortfolioTracker {
    fn default() -> Self {
        Self::new()
    }
}

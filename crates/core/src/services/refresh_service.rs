use chrono::Utc;
use log::debug;
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::valuation::{PortfolioSummary, ValuationRow};
use crate::services::name_service::NameService;
use crate::services::quote_service::QuoteService;
use crate::services::valuation_service::ValuationService;

/// Presentation seam: the refresh loop pushes each cycle's output to a
/// sink instead of rendering anything itself.
pub trait RenderSink: Send {
    /// A cycle produced at least one valued row.
    fn render(&mut self, rows: &[ValuationRow], summary: &PortfolioSummary);

    /// The portfolio has no holdings.
    fn render_empty(&mut self) {}

    /// A cycle ran but produced nothing usable
    /// (every holding failed to resolve a price).
    fn render_error(&mut self, error: &CoreError) {
        let _ = error;
    }
}

/// Handle used to cancel a running refresh loop from outside.
/// The loop notices the signal while waiting between cycles, so
/// cancellation takes effect without waiting out the full interval.
pub struct StopHandle(watch::Sender<bool>);

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.0.send(true);
    }
}

/// Build a stop handle and the receiver the loop listens on.
pub fn stop_channel() -> (StopHandle, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    (StopHandle(tx), rx)
}

/// The timed refresh cycle.
///
/// Each cycle: invalidate the quote cache, evaluate, push the result
/// to the sink, stamp `last_update`, bump the cycle counter. While
/// `auto_refresh` is set the loop then waits for the configured
/// interval (or the stop signal) and goes again; with it cleared the
/// loop performs exactly one pass and returns.
pub struct RefreshService {
    cycles: u64,
}

impl RefreshService {
    pub fn new() -> Self {
        Self { cycles: 0 }
    }

    /// Number of completed evaluate-and-render passes.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one cycle: invalidate, evaluate, render.
    pub async fn run_cycle(
        &mut self,
        portfolio: &mut Portfolio,
        quote_service: &QuoteService,
        name_service: &NameService,
        valuation_service: &ValuationService,
        sink: &mut dyn RenderSink,
    ) {
        quote_service.invalidate();

        if portfolio.is_empty() {
            sink.render_empty();
        } else {
            let (rows, summary) = valuation_service
                .evaluate(&portfolio.holdings, quote_service, name_service)
                .await;
            if rows.is_empty() {
                sink.render_error(&CoreError::NoValidPrices);
            } else {
                sink.render(&rows, &summary);
            }
        }

        portfolio.last_update = Some(Utc::now());
        self.cycles += 1;
        debug!("refresh cycle {} complete", self.cycles);
    }

    /// Run the refresh loop until auto-refresh is turned off or the
    /// stop signal fires.
    pub async fn run(
        &mut self,
        portfolio: &mut Portfolio,
        quote_service: &QuoteService,
        name_service: &NameService,
        valuation_service: &ValuationService,
        sink: &mut dyn RenderSink,
        stop: &mut watch::Receiver<bool>,
    ) {
        loop {
            self.run_cycle(portfolio, quote_service, name_service, valuation_service, sink)
                .await;

            if !portfolio.auto_refresh {
                break;
            }
            if *stop.borrow() {
                break;
            }

            let delay = portfolio.settings.refresh_interval();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = stop.changed() => {
                    // A closed channel means the handle is gone; stop too.
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

impl Default for RefreshService {
    fn default() -> Self {
        Self::new()
    }
}

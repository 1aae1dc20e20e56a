use chrono::Utc;
use log::debug;

use crate::models::holding::Holding;
use crate::models::valuation::{PortfolioSummary, ValuationRow};
use crate::services::name_service::NameService;
use crate::services::quote_service::QuoteService;

/// Combines holdings with live quotes into valuation rows and
/// portfolio-level aggregates.
///
/// A holding whose quote is unavailable this cycle contributes nothing
/// to the rows or the summary — silent exclusion, no per-row error.
/// There are no retries within a cycle; the next cycle is the retry.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate all holdings against live quotes.
    ///
    /// Row math, per holding with a resolved quote:
    /// - current_value  = quantity × current_price
    /// - invested_value = quantity × purchase_price
    /// - gain_loss      = current_value − invested_value
    /// - gain_loss_pct  = gain_loss / invested_value × 100
    ///   (0.0 when invested_value is 0)
    ///
    /// Weights are filled in after totals are known:
    /// weight_pct = current_value / total_value × 100, with an all-zero
    /// summary when total_value is 0.
    pub async fn evaluate(
        &self,
        holdings: &[Holding],
        quote_service: &QuoteService,
        name_service: &NameService,
    ) -> (Vec<ValuationRow>, PortfolioSummary) {
        let mut rows: Vec<ValuationRow> = Vec::with_capacity(holdings.len());

        for holding in holdings {
            let quote = match quote_service.get_price(&holding.ticker).await {
                Ok(q) => q,
                Err(unavailable) => {
                    debug!("excluding holding this cycle: {unavailable}");
                    continue;
                }
            };

            let name = name_service
                .get_name(&holding.ticker, quote_service.registry())
                .await;

            let current_value = holding.quantity * quote.price;
            let invested_value = holding.invested_value();
            let gain_loss = current_value - invested_value;
            let gain_loss_pct = if invested_value > 0.0 {
                (gain_loss / invested_value) * 100.0
            } else {
                0.0
            };

            rows.push(ValuationRow {
                ticker: holding.ticker.clone(),
                name,
                quantity: holding.quantity,
                purchase_price: holding.purchase_price,
                purchase_date: holding.purchase_date,
                current_price: quote.price,
                current_value,
                invested_value,
                gain_loss,
                gain_loss_pct,
                weight_pct: 0.0, // filled below
            });
        }

        if rows.is_empty() {
            return (rows, PortfolioSummary::empty());
        }

        let total_value: f64 = rows.iter().map(|r| r.current_value).sum();
        let total_invested: f64 = rows.iter().map(|r| r.invested_value).sum();

        for row in &mut rows {
            row.weight_pct = if total_value > 0.0 {
                (row.current_value / total_value) * 100.0
            } else {
                0.0
            };
        }

        let total_gain_loss = total_value - total_invested;
        let total_return_pct = if total_invested > 0.0 {
            (total_gain_loss / total_invested) * 100.0
        } else {
            0.0
        };
        let average_return_pct =
            rows.iter().map(|r| r.gain_loss_pct).sum::<f64>() / rows.len() as f64;

        // Best/worst by percentage performance, first encountered wins ties
        let mut best = &rows[0];
        let mut worst = &rows[0];
        for row in &rows[1..] {
            if row.gain_loss_pct > best.gain_loss_pct {
                best = row;
            }
            if row.gain_loss_pct < worst.gain_loss_pct {
                worst = row;
            }
        }

        let summary = PortfolioSummary {
            as_of: Utc::now(),
            position_count: rows.len(),
            total_value,
            total_invested,
            total_gain_loss,
            total_return_pct,
            average_return_pct,
            best: Some(best.clone()),
            worst: Some(worst.clone()),
        };

        (rows, summary)
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

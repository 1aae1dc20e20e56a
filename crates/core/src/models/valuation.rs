use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// One holding combined with its live quote. Derived, never stored:
/// recomputed in full on every refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRow {
    pub ticker: Ticker,

    /// Resolved display name (falls back to the ticker itself)
    pub name: String,

    /// Units held
    pub quantity: f64,

    /// Price paid per unit
    pub purchase_price: f64,

    /// Date of purchase
    pub purchase_date: NaiveDate,

    /// Live price this cycle
    pub current_price: f64,

    /// quantity × current_price
    pub current_value: f64,

    /// quantity × purchase_price
    pub invested_value: f64,

    /// current_value − invested_value
    pub gain_loss: f64,

    /// gain_loss / invested_value × 100 (0.0 when invested_value is 0)
    pub gain_loss_pct: f64,

    /// current_value / total portfolio value × 100
    pub weight_pct: f64,
}

/// Portfolio-level aggregates over one cycle's resolved rows.
///
/// Holdings whose quote was unavailable this cycle contribute nothing:
/// `total_value` is the sum of `current_value` over resolved rows only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// When this summary was computed
    pub as_of: DateTime<Utc>,

    /// Number of holdings that resolved a quote this cycle
    pub position_count: usize,

    /// Σ current_value over resolved rows
    pub total_value: f64,

    /// Σ invested_value over resolved rows
    pub total_invested: f64,

    /// total_value − total_invested
    pub total_gain_loss: f64,

    /// total_gain_loss / total_invested × 100
    pub total_return_pct: f64,

    /// Arithmetic mean of per-row gain_loss_pct values
    pub average_return_pct: f64,

    /// Row with the highest gain_loss_pct (first encountered on ties)
    pub best: Option<ValuationRow>,

    /// Row with the lowest gain_loss_pct (first encountered on ties)
    pub worst: Option<ValuationRow>,
}

impl PortfolioSummary {
    /// The all-zero summary used when no holdings resolved a quote.
    pub fn empty() -> Self {
        Self {
            as_of: Utc::now(),
            position_count: 0,
            total_value: 0.0,
            total_invested: 0.0,
            total_gain_loss: 0.0,
            total_return_pct: 0.0,
            average_return_pct: 0.0,
            best: None,
            worst: None,
        }
    }
}

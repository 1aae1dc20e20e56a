use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// A single user-recorded position.
///
/// Identity is positional: duplicate tickers may coexist as separate
/// rows and are valued independently. Holdings are created by a form
/// submission after a successful price probe, removed explicitly, and
/// never otherwise mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Normalized ticker symbol
    pub ticker: Ticker,

    /// Units held (always positive)
    pub quantity: f64,

    /// Price paid per unit, in the display currency
    pub purchase_price: f64,

    /// Date of purchase (daily granularity)
    pub purchase_date: NaiveDate,
}

impl Holding {
    pub fn new(
        ticker: impl Into<Ticker>,
        quantity: f64,
        purchase_price: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            quantity,
            purchase_price,
            purchase_date,
        }
    }

    /// Amount originally invested in this position.
    pub fn invested_value(&self) -> f64 {
        self.quantity * self.purchase_price
    }
}

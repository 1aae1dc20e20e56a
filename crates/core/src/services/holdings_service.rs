use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;
use crate::models::ticker::Ticker;

/// Manages the in-memory holdings list.
///
/// Pure business logic — no I/O, no API calls. The add-time price
/// probe happens at the facade, before this service is invoked.
/// Insertion order is preserved and duplicate tickers are allowed as
/// separate rows.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Append a holding to the portfolio.
    /// Quantity and purchase price must be positive finite numbers.
    pub fn add(&self, portfolio: &mut Portfolio, holding: Holding) -> Result<(), CoreError> {
        if !holding.quantity.is_finite() || holding.quantity <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity must be a positive number, got {}",
                holding.quantity
            )));
        }
        if !holding.purchase_price.is_finite() || holding.purchase_price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Purchase price must be a positive number, got {}",
                holding.purchase_price
            )));
        }
        portfolio.holdings.push(holding);
        Ok(())
    }

    /// Remove every row matching the ticker.
    /// Returns the number of rows removed; remaining rows keep their order.
    pub fn remove_all(&self, portfolio: &mut Portfolio, ticker: &Ticker) -> usize {
        let before = portfolio.holdings.len();
        portfolio.holdings.retain(|h| &h.ticker != ticker);
        before - portfolio.holdings.len()
    }

    /// Remove one selected row by position.
    pub fn remove_at(
        &self,
        portfolio: &mut Portfolio,
        index: usize,
    ) -> Result<Holding, CoreError> {
        if index >= portfolio.holdings.len() {
            return Err(CoreError::HoldingNotFound(format!(
                "no holding at position {index}"
            )));
        }
        Ok(portfolio.holdings.remove(index))
    }

    /// Remove all holdings.
    pub fn clear(&self, portfolio: &mut Portfolio) {
        portfolio.holdings.clear();
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}

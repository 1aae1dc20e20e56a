pub mod registry;
pub mod traits;

// Quote source implementations
pub mod binance;
pub mod yahoo_finance;

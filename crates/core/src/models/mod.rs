pub mod holding;
pub mod portfolio;
pub mod quote;
pub mod settings;
pub mod ticker;
pub mod valuation;

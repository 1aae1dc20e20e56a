pub mod holdings_service;
pub mod name_service;
pub mod quote_service;
pub mod refresh_service;
pub mod valuation_service;

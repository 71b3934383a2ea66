pub mod holding_service;
pub mod job_scheduler_service;
pub mod market_data_service;
pub mod portfolio_service;
pub mod quote_cache;
pub mod valuation_service;

pub mod holding_queries;
pub mod user_queries;

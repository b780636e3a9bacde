pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod orders;
pub mod analytics;
pub mod gateway;

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod observability;
pub mod orders;
pub mod server;
pub mod types;
pub mod utils;

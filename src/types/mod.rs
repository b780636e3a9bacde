pub mod order;
pub mod analytics;

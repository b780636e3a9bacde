pub mod upstream_client;
pub mod sleeper;
pub mod order_store;

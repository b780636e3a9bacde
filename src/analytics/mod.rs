pub mod fetcher;
pub mod calculations;
pub mod http_client;

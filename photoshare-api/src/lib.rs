pub mod aggregator;
pub mod server;

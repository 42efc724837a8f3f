pub mod config;
pub mod counts;
pub mod engine;
pub mod error;
pub mod loader;
pub mod protocol;
pub mod scorer;
pub mod server;
pub mod stats;
pub mod transport;
pub mod types;

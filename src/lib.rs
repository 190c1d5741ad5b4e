pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod geo;
pub mod manage;
pub mod models;
pub mod refresh;
pub mod render;
pub mod timeutil;
pub mod view;
pub mod weather;

pub use client::FlightApi;
pub use config::Config;
pub use error::{Error, Result};

/// Initialize the tracing subscriber for logging.
/// Logs go to stderr so tables and JSON on stdout stay clean.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flight_console=info,flightctl=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

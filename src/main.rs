#![cfg(not(tarpaulin_include))]

use record_table::app;
use record_table::config::ServerConfig;
use std::env;

/// Entry point for the record server
///
/// Usage: `record-server [host] [port]`, defaulting to `127.0.0.1 3001`.
/// Log verbosity follows `RUST_LOG` (default `info`).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = ServerConfig::from_args(&args);

    app::run(config).await
}

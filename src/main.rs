//! # Pool Server - Entry Point
//! src/main.rs
//!
//! ```bash
//! pool_server [PORT] [WORKERS]
//! ```
//!
//! Ctrl+C (SIGINT) o SIGTERM detienen el servidor de forma ordenada. SIGPIPE
//! ya lo ignora el runtime de Rust, así que escribir a un cliente que se fue
//! devuelve un error en vez de matar el proceso.

use pool_server::commands::site_router;
use pool_server::config::Config;
use pool_server::error::ServerError;
use pool_server::server::{Server, Shutdown, SignalListener};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let config = Config::new();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_thread_names(true)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {}", e);
    }

    if let Err(e) = run(config) {
        error!(cause = %e, "fatal error");
        std::process::exit(e.exit_code());
    }
}

fn run(config: Config) -> Result<(), ServerError> {
    config.validate()?;
    config.print_summary();

    let shutdown = Shutdown::new();
    let _signals = SignalListener::install(shutdown.clone())?;

    let handler = Arc::new(site_router(&config.static_dir));
    let server = Server::bind(&config, handler, shutdown)?;
    server.run();
    Ok(())
}

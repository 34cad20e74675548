//! services/lexicon/src/lib.rs
//!
//! The `lexicon` service: PostgreSQL and HTTP adapters for the `lexicon_core`
//! ports, configuration, and the command-line surface.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber at the configured level.
pub fn init_tracing(config: &config::Config) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

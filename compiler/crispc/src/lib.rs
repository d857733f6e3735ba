//! The crisp driver: reading scripts, running them against a chain client
//! and reporting diagnostics.
//!
//! The `crisp` binary in `main.rs` is a thin argument dispatcher over
//! [`commands`].

pub mod client;
pub mod commands;
pub mod config;

use std::sync::Once;

pub use client::DryRunClient;
pub use config::{ConfigError, OutputFormat, RunConfig};

static TRACING_INIT: Once = Once::new();

/// Install the `tracing` subscriber, once, when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#![doc(test(attr(deny(warnings))))]

//! Allowance Core keeps a periodic spending allowance consistent with the
//! expenses logged against it, and summarises those expenses by category and
//! month.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "allowance_core=info";

/// Initializes global tracing and emits a startup info log.
///
/// `RUST_LOG` overrides the default `allowance_core=info` filter.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        tracing::info!("Allowance Core tracing initialized.");
    });
}

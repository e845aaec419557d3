//! Subscriber setup for binaries and tests.
//!
//! The library crates only emit `tracing` events. Call [`init`] once from
//! a binary to see them.
//!
//! - **DEBUG**: engine construction, totals, partitioning
//! - **TRACE**: per-range sweeps, memo table allocation, child ranks
//! - **ERROR**: strict validation failures, right before the panic

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "seqrank_core=info";

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Safe to call multiple times - only the first call has effect. Does
/// nothing if another global subscriber is already set.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init();
    });
}

/// Whether [`init`] has run.
pub fn is_initialized() -> bool {
    INIT.get().is_some()
}

//! Logger setup for the command-line host.

use env_logger::{Builder, Env};

/// Filter used when `RUST_LOG` is unset: progress from the compiler crates
/// only, so dependencies stay quiet.
pub const DEFAULT_FILTER: &str = "marduk_sketch=info,marduk_sketchc=info";

/// Install the global logger.
///
/// `RUST_LOG` / `RUST_LOG_STYLE` override the filter and coloring. Fails if a
/// logger is already installed.
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    builder().try_init()
}

fn builder() -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    builder.format_timestamp(None);
    builder
}

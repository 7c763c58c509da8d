//! Log output for the command line tools. The library itself only emits `tracing` events.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter: progress messages from this crate, warnings from everything else.
pub const DEFAULT_FILTER: &str = "warn,volsurf=info";

/// Install a stderr subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Calling this more than once is harmless, later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

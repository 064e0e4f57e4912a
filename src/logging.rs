//! Logging setup.
//!
//! Human-readable `tracing` output on stderr so stdout stays free for
//! command results. `RUST_LOG` overrides the level chosen here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "scalptrader=debug"
    } else {
        "scalptrader=info"
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

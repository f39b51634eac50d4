//! `tracing` subscriber setup for the binary.

use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map `-v` repetitions to a level name; `quiet` wins.
pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// verbosity flags.
pub fn init(verbose: u8, quiet: bool) {
    let level = level_for(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("field_map={}", level)));

    let layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_timer(fmt::time::uptime()))
            .init();
    }

    debug!("logging initialized at level {}", level);
}

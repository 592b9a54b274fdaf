//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise the binary's own target (with `-`
/// replaced by `_`) and the `learnlink_server` library are logged at
/// `default_level`, and `tower_http` request traces at `debug`.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={level},learnlink_server={level},tower_http=debug",
            bin_name.replace('-', "_"),
            level = default_level,
        ))
    });

    // try_init so tests and repeated calls do not panic
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(true)
        .try_init();
}

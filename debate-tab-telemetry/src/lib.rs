use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
pub use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_LOG_LEVEL: &str = "info,debate_tab_engine=debug";

/// Installs the global subscriber: a `fmt` layer filtered by `RUST_LOG`, or by
/// [`DEFAULT_LOG_LEVEL`] when that is unset or invalid.
pub fn setup_telemetry() -> Result<(), TryInitError> {
    setup_telemetry_with(DEFAULT_LOG_LEVEL)
}

pub fn setup_telemetry_with(default_directives: &str) -> Result<(), TryInitError> {
    // log output goes to stderr, stdout is reserved for results
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(
            stderr_log.with_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_directives)),
            ),
        )
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        setup_telemetry_with("debug").unwrap();
        tracing::info!("telemetry installed");
        assert!(setup_telemetry().is_err());
    }
}

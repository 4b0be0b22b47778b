use tracing_subscriber::{EnvFilter, fmt};

/// Installs the stderr subscriber used by the `xer-check` binary.
///
/// `RUST_LOG` overrides `default_level`, e.g. `RUST_LOG=xer_schedule=debug`.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

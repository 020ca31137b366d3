// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Directives used when `RUST_LOG` is unset: chain lifecycle at `info`,
/// rejected and dropped transactions from the pipeline at `debug`.
pub const DEFAULT_FILTER: &str = "info,execution=debug";

/// Installs the global `tracing` subscriber with [`DEFAULT_FILTER`].
pub fn init_tracing() -> Result<(), anyhow::Error> {
    init_tracing_with_filter(DEFAULT_FILTER)
}

/// Installs the global `tracing` subscriber for structured JSON logging on
/// stderr and routes `log` records through it.
///
/// `RUST_LOG` takes precedence over `default_filter`. Fails if a global
/// subscriber or logger is already installed, or if `default_filter` does
/// not parse.
pub fn init_tracing_with_filter(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    let json = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(false)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(Registry::default().with(filter).with(json))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_only_once() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        init_tracing().unwrap();
        tracing::debug!(target: "execution", event = "tracing_installed");
        assert!(init_tracing_with_filter("warn").is_err());
    }
}

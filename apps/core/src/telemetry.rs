use crate::config::LogFormat;
use crate::error::AppError;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Installs the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` (default `info`). Logs go to stderr so the REPL
/// output on stdout stays clean.
pub fn init_telemetry(format: LogFormat) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = Registry::default().with(filter);

    let result = match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
            tracing::subscriber::set_global_default(registry.with(fmt_layer))
        }
        LogFormat::Json => {
            let bunyan = BunyanFormattingLayer::new(
                env!("CARGO_PKG_NAME").to_string(),
                std::io::stderr,
            );
            tracing::subscriber::set_global_default(registry.with(JsonStorageLayer).with(bunyan))
        }
    };

    result.map_err(|e| AppError::Internal(format!("Failed to install tracing subscriber: {}", e)))
}

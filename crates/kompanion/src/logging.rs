use kompanion_core::config::{LogFormat, LogSettings};
use kompanion_core::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber and route `log` records into it.
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr so command results on stdout stay machine-readable.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    tracing_log::LogTracer::init()
        .map_err(|e| Error::Other(format!("Failed to bridge log records: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match settings.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
    };
    installed.map_err(|e| Error::Other(format!("Failed to install log subscriber: {}", e)))
}

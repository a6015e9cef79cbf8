//! tracing subscriber setup.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::error::LoggingError;

/// map a configured level name to a tracing level.
///
/// unknown names fall back to `info`.
pub fn parse_log_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// install a global fmt subscriber at `level`.
///
/// fails if a global subscriber is already installed.
pub fn init_logging(level: &str) -> Result<(), LoggingError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

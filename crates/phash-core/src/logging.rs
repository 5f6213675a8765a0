use log::{error, info, LevelFilter};
use std::io::Write;
use std::path::Path;

/// Environment variable that overrides the configured log level
pub const LOG_ENV_VAR: &str = "PHASH_LOG";

/// Initialize the logger with timestamp, log level, and module path.
/// Logs go to stderr so hash output on stdout stays machine readable.
pub fn init_logger(level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    let level = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(level);

    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] [{}:{}] - {}",
                buf.timestamp_seconds(),
                record.level(),
                record.module_path().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init()?;

    info!("Logging initialised at level {}", level);
    Ok(())
}

/// Log hash computation error
pub fn log_hash_error(path: &Path, error: &dyn std::error::Error) {
    error!(
        "Hash computation failed - Path: {}, Error: {}",
        path.display(),
        error
    );
}


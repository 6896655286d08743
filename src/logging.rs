//! Logger bootstrap.
//!
//! Data-quality problems (numeral fallbacks, clamped days, collisions) are
//! logged at `warn`, progress at `info`, per-entry detail at `debug`.
//! `RUST_LOG` overrides the level given on the command line.

use flexi_logger::{Logger, LoggerHandle};
use log::debug;

use crate::error::{DiaryError, Result};

const SUPPORTED_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Start logging to stderr. The returned handle must be kept alive for
/// the duration of the run.
pub fn init_logging(level: &str) -> Result<LoggerHandle> {
    let level = normalize_level(level)?;
    let handle = Logger::try_with_env_or_str(level)
        .map_err(|err| DiaryError::Logging(format!("invalid log level `{level}`: {err}")))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| DiaryError::Logging(format!("failed to start logger: {err}")))?;
    debug!("event=logging_init level={level}");
    Ok(handle)
}

fn normalize_level(level: &str) -> Result<&'static str> {
    let lowered = level.trim().to_ascii_lowercase();
    SUPPORTED_LEVELS
        .iter()
        .copied()
        .find(|l| *l == lowered)
        .ok_or_else(|| {
            DiaryError::Logging(format!(
                "unsupported log level `{level}` (expected one of {})",
                SUPPORTED_LEVELS.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level_accepts_known_levels() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warn ").unwrap(), "warn");
    }

    #[test]
    fn test_normalize_level_rejects_unknown() {
        assert!(normalize_level("verbose").is_err());
        assert!(normalize_level("").is_err());
    }
}

//! Logging initialisation via tracing-subscriber.
//!
//! Log output goes to stderr so the console REPL on stdout stays readable.
//! Call [`init`] once with [`BOOTSTRAP_LEVEL`] before config is loaded, then
//! [`reload`] once the configured level is known.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::reload::{self, Handle};
use tracing_subscriber::{Registry, fmt, prelude::*};

use crate::error::AppError;

/// Level used until `config/default.toml` has been read.
pub const BOOTSTRAP_LEVEL: &str = "info";

/// Handle for swapping the active filter after startup.
pub struct LogHandle(Handle<EnvFilter, Registry>);

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when it is set and valid; otherwise `level`
/// is used.
pub fn init(level: &str) -> Result<LogHandle, AppError> {
    let filter = build_filter(level, false)?;
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(LogHandle(handle))
}

/// Swap in the configured level.
///
/// With `prefer_level` (a `-v` flag was given) `level` wins over `RUST_LOG`;
/// otherwise a valid `RUST_LOG` still takes precedence, as at [`init`].
pub fn reload(handle: &LogHandle, level: &str, prefer_level: bool) -> Result<(), AppError> {
    let filter = build_filter(level, prefer_level)?;
    handle
        .0
        .reload(filter)
        .map_err(|e| AppError::Logger(format!("failed to reload filter: {e}")))
}

fn build_filter(level: &str, prefer_level: bool) -> Result<EnvFilter, AppError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(level, prefer_level, rust_log.as_deref())
}

/// `rust_log` is the raw `RUST_LOG` value, passed in so tests need not touch
/// the environment.
fn filter_from(level: &str, prefer_level: bool, rust_log: Option<&str>) -> Result<EnvFilter, AppError> {
    let from_env = || {
        rust_log
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "RUST_LOG not set".to_string())
            .and_then(|v| EnvFilter::try_new(v).map_err(|e| e.to_string()))
    };

    if prefer_level {
        match EnvFilter::try_new(level) {
            Ok(filter) => Ok(filter),
            Err(level_err) => from_env().map_err(|env_err| {
                AppError::Logger(format!(
                    "invalid log level '{level}': {level_err}; RUST_LOG unusable: {env_err}"
                ))
            }),
        }
    } else {
        from_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
    }
}

/// Parse a log level string into a [`LevelFilter`], returning an error on
/// unrecognised values. Used to validate `[app] log_level` at config load.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_levels_parse() {
        for l in &["error", "warn", "info", "debug", "trace"] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
    }

    #[test]
    fn invalid_level_errors() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
        assert!(parse_level("INFO_LEVEL").is_err());
    }

    #[test]
    fn preferred_level_builds_filter() {
        assert!(build_filter("debug", true).is_ok());
        assert!(build_filter("thomas_raw=trace,reqwest=warn", true).is_ok());
    }

    #[test]
    fn rust_log_wins_unless_level_preferred() {
        assert_eq!(filter_from("info", false, Some("trace")).unwrap().to_string(), "trace");
        assert_eq!(filter_from("info", true, Some("trace")).unwrap().to_string(), "info");
    }

    #[test]
    fn configured_level_used_when_rust_log_absent_or_invalid() {
        assert_eq!(filter_from("debug", false, None).unwrap().to_string(), "debug");
        assert_eq!(filter_from("debug", false, Some("  ")).unwrap().to_string(), "debug");
        assert_eq!(filter_from("warn", false, Some("thomas_raw=loud")).unwrap().to_string(), "warn");
    }

    #[test]
    fn init_succeeds_or_already_init() {
        // Another test in the same process may have installed a subscriber first.
        match init(BOOTSTRAP_LEVEL) {
            Ok(handle) => assert!(reload(&handle, "debug", true).is_ok()),
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}

//! Command-line flags.
//!
//! ```text
//! thomas-raw [--mode dev|prod] [-f|--config <PATH>] [-v...]
//! ```
//!
//! `--mode` falls back to `$THOMAS_RAW_MODE`, then production.

use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::credential::Mode;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// `None` when neither the flag nor the env var was given.
    pub mode: Option<Mode>,
    pub config_path: PathBuf,
    pub log_level: Option<&'static str>,
    pub help: bool,
}

pub const USAGE: &str = "\
Usage: thomas-raw [OPTIONS]

Options:
  -h, --help                 Print help
  -m, --mode <dev|prod>      Credential source: ./secret (dev) or API_KEY secret store (prod)
  -f, --config <PATH>        Path to configuration file (default: config/default.toml)
  -v, -vv, -vvv, -vvvv       Increase logging verbosity";

/// Parse flags (without the program name). `env_mode` is the value of
/// `$THOMAS_RAW_MODE`, passed in so tests need not touch the environment.
pub fn parse<I>(args: I, env_mode: Option<&str>) -> Result<CliArgs, AppError>
where
    I: IntoIterator<Item = String>,
{
    let mut verbosity = 0u8;
    let mut mode = None;
    let mut config_path = None;
    let mut help = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if let Some(value) = arg.strip_prefix("--mode=") {
            mode = Some(value.parse::<Mode>()?);
            continue;
        }

        match arg.as_str() {
            "-h" | "--help" => help = true,
            "-m" | "--mode" => {
                let value = iter
                    .next()
                    .ok_or_else(|| AppError::Config("--mode requires dev or prod".into()))?;
                mode = Some(value.parse::<Mode>()?);
            }
            "-f" | "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| AppError::Config("-f/--config requires a path argument".into()))?;
                config_path = Some(PathBuf::from(path));
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            other => return Err(AppError::Config(format!("unexpected argument '{other}'"))),
        }
    }

    if mode.is_none() {
        mode = env_mode.map(str::parse::<Mode>).transpose()?;
    }

    // -v → warn, -vv → info, -vvv → debug, -vvvv+ → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    Ok(CliArgs {
        mode,
        config_path: config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        log_level,
        help,
    })
}

//! API credential resolution.
//!
//! The key is resolved exactly once at startup and moved into the LLM
//! provider. Two sources, picked by [`Mode`]:
//!
//! ```text
//! development  →  plaintext file ([credentials] secret_file, default ./secret)
//! production   →  managed secret store keyed by API_KEY:
//!                   1. API_KEY in the process environment (.env is loaded first)
//!                   2. API_KEY in the TOML secrets file ([credentials] secrets_file)
//! ```
//!
//! Any missing source is a startup-fatal `AppError::Config`.

use std::{env, fmt, fs, path::Path, str::FromStr};

use serde::Deserialize;
use tracing::{debug, info};

use crate::{config::CredentialsConfig, error::AppError};

/// Fixed identifier of the key in the managed secret store.
pub const SECRET_KEY_NAME: &str = "API_KEY";

/// Env var consulted when `--mode` is not passed on the command line.
pub const MODE_ENV_VAR: &str = "THOMAS_RAW_MODE";

/// Runtime mode — governs the credential source and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Mode::Development),
            "prod" | "production" => Ok(Mode::Production),
            other => Err(AppError::Config(format!(
                "unknown mode '{other}' (expected 'dev' or 'prod')"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("dev"),
            Mode::Production => f.write_str("prod"),
        }
    }
}

/// Opaque API secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Deserialize)]
struct SecretsFile {
    #[serde(rename = "API_KEY")]
    api_key: Option<String>,
}

/// Resolve the API key for `mode`, reading `API_KEY` from the real
/// environment in production.
pub fn resolve(mode: Mode, config: &CredentialsConfig) -> Result<Credential, AppError> {
    let env_key = env::var(SECRET_KEY_NAME).ok();
    resolve_with(mode, config, env_key.as_deref())
}

/// Internal resolver — tests pass the environment value directly.
pub fn resolve_with(
    mode: Mode,
    config: &CredentialsConfig,
    env_key: Option<&str>,
) -> Result<Credential, AppError> {
    let credential = match mode {
        Mode::Development => read_secret_file(&config.secret_file)?,
        Mode::Production => match non_blank(env_key) {
            Some(key) => {
                debug!("credential: using {SECRET_KEY_NAME} from environment");
                Credential::new(key)
            }
            None => read_secret_store(&config.secrets_file)?,
        },
    };
    info!(%mode, "credential resolved");
    Ok(credential)
}

fn read_secret_file(path: &Path) -> Result<Credential, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("cannot read secret file {}: {e}", path.display()))
    })?;
    non_blank(Some(raw.as_str()))
        .map(Credential::new)
        .ok_or_else(|| AppError::Config(format!("secret file {} is empty", path.display())))
}

fn read_secret_store(path: &Path) -> Result<Credential, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!(
            "secret store unconfigured: {SECRET_KEY_NAME} not in environment and cannot read {}: {e}",
            path.display()
        ))
    })?;
    let parsed: SecretsFile = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;
    non_blank(parsed.api_key.as_deref())
        .map(Credential::new)
        .ok_or_else(|| {
            AppError::Config(format!("{SECRET_KEY_NAME} missing from {}", path.display()))
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

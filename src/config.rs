//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or the path given with `--config`), then
//! applies `THOMAS_RAW_EXPORT_DIR` and `THOMAS_RAW_LOG_LEVEL` env overrides.
//! The API key never lives here; see [`crate::credential`].

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{error::AppError, logger};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Gemini `generateContent` provider configuration (`[llm.gemini]`).
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, without the `/models/...` suffix.
    pub api_base_url: String,
    pub model: String,
    /// Sampling temperature for chat and photo requests.
    pub temperature: f32,
    /// Sampling temperature for budget tables.
    pub budget_temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"gemini"` or `"dummy"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub gemini: GeminiConfig,
}

/// Where the credential provider looks for the API key.
#[derive(Debug, Clone)]
pub struct CredentialsConfig {
    /// Plaintext key file read in development mode.
    pub secret_file: PathBuf,
    /// TOML secret store read in production mode when `API_KEY` is not in
    /// the environment.
    pub secrets_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum turns retained; older turns are evicted first.
    pub max_turns: usize,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    /// Directory export documents are written to (already expanded, no `~`).
    pub export_dir: PathBuf,
    /// Directory holding optional prompt template overrides.
    pub prompts_dir: PathBuf,
    pub llm: LlmConfig,
    pub session: SessionConfig,
    pub credentials: CredentialsConfig,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    app: RawApp,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    session: RawSession,
    #[serde(default)]
    credentials: RawCredentials,
}

#[derive(Deserialize)]
struct RawApp {
    name: String,
    log_level: String,
    #[serde(default = "default_export_dir")]
    export_dir: String,
    #[serde(default = "default_prompts_dir")]
    prompts_dir: String,
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    gemini: RawGeminiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), gemini: RawGeminiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawGeminiConfig {
    #[serde(default = "default_gemini_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_gemini_model")]
    model: String,
    #[serde(default = "default_chat_temperature")]
    temperature: f32,
    #[serde(default = "default_budget_temperature")]
    budget_temperature: f32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawGeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_gemini_api_base_url(),
            model: default_gemini_model(),
            temperature: default_chat_temperature(),
            budget_temperature: default_budget_temperature(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawSession {
    #[serde(default = "default_max_turns")]
    max_turns: usize,
}

impl Default for RawSession {
    fn default() -> Self {
        Self { max_turns: default_max_turns() }
    }
}

#[derive(Deserialize)]
struct RawCredentials {
    #[serde(default = "default_secret_file")]
    secret_file: String,
    #[serde(default = "default_secrets_file")]
    secrets_file: String,
}

impl Default for RawCredentials {
    fn default() -> Self {
        Self { secret_file: default_secret_file(), secrets_file: default_secrets_file() }
    }
}

fn default_export_dir() -> String { "exports".to_string() }
fn default_prompts_dir() -> String { "config/prompts".to_string() }
fn default_llm_provider() -> String { "gemini".to_string() }
fn default_gemini_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_gemini_model() -> String { "gemini-2.0-flash".to_string() }
fn default_chat_temperature() -> f32 { 0.7 }
fn default_budget_temperature() -> f32 { 0.5 }
fn default_timeout_seconds() -> u64 { 60 }
fn default_max_turns() -> usize { 50 }
fn default_secret_file() -> String { "secret".to_string() }
fn default_secrets_file() -> String { ".secrets/secrets.toml".to_string() }

/// Load config from `path`, then apply env-var overrides.
pub fn load(path: &Path) -> Result<Config, AppError> {
    let export_dir_override = env::var("THOMAS_RAW_EXPORT_DIR").ok();
    let log_level_override = env::var("THOMAS_RAW_LOG_LEVEL").ok();
    load_from(path, export_dir_override.as_deref(), log_level_override.as_deref())
}

/// Internal loader — accepts explicit overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    export_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let app = parsed.app;
    let log_level = log_level_override.unwrap_or(&app.log_level).to_string();
    logger::parse_level(&log_level)
        .map_err(|e| AppError::Config(format!("[app] log_level: {e}")))?;

    if parsed.session.max_turns == 0 {
        return Err(AppError::Config("[session] max_turns must be at least 1".into()));
    }

    let gemini = parsed.llm.gemini;

    Ok(Config {
        app_name: app.name,
        log_level,
        export_dir: expand_home(export_dir_override.unwrap_or(&app.export_dir)),
        prompts_dir: expand_home(&app.prompts_dir),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            gemini: GeminiConfig {
                api_base_url: gemini.api_base_url.trim_end_matches('/').to_string(),
                model: gemini.model,
                temperature: gemini.temperature,
                budget_temperature: gemini.budget_temperature,
                timeout_seconds: gemini.timeout_seconds,
            },
        },
        session: SessionConfig { max_turns: parsed.session.max_turns },
        credentials: CredentialsConfig {
            secret_file: expand_home(&parsed.credentials.secret_file),
            secrets_file: expand_home(&parsed.credentials.secrets_file),
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for tests — dummy LLM, unreachable endpoint, no key files.
#[cfg(test)]
impl Config {
    pub fn test_default(work_dir: &Path) -> Self {
        Self {
            app_name: "test".into(),
            log_level: "info".into(),
            export_dir: work_dir.join("exports"),
            prompts_dir: work_dir.join("prompts"),
            llm: LlmConfig {
                provider: "dummy".into(),
                gemini: GeminiConfig {
                    api_base_url: "http://localhost:0/v1beta".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    budget_temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            session: SessionConfig { max_turns: default_max_turns() },
            credentials: CredentialsConfig {
                secret_file: work_dir.join("secret"),
                secrets_file: work_dir.join("secrets.toml"),
            },
        }
    }
}

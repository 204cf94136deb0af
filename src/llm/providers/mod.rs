//! LLM provider implementations.
//!
//! `build(config, credential)` is the factory — called once at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;

use crate::config::LlmConfig;
use crate::credential::Credential;
use crate::error::AppError;
use crate::llm::LlmProvider;

/// Construct a `LlmProvider` from config and the resolved credential.
///
/// The credential is moved into the provider; nothing re-reads the key
/// source after this point.
pub fn build(config: &LlmConfig, credential: Credential) -> Result<LlmProvider, AppError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider::new())),
        "gemini" => {
            let p = gemini::GeminiProvider::new(&config.gemini, credential)?;
            Ok(LlmProvider::Gemini(p))
        }
        other => Err(AppError::Config(format!("unknown llm provider: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn builds_configured_provider() {
        let mut cfg = Config::test_default(std::path::Path::new("/tmp")).llm;
        let p = build(&cfg, Credential::new("k")).unwrap();
        assert_eq!(p.name(), "dummy");

        cfg.provider = "gemini".into();
        let p = build(&cfg, Credential::new("k")).unwrap();
        assert_eq!(p.name(), "gemini");
    }

    #[test]
    fn unknown_provider_is_config_error() {
        let mut cfg = Config::test_default(std::path::Path::new("/tmp")).llm;
        cfg.provider = "palm".into();
        let err = build(&cfg, Credential::new("k")).unwrap_err();
        assert!(err.to_string().contains("unknown llm provider: palm"));
    }
}

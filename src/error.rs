//! Application-wide error types.

use thiserror::Error;

use crate::agents::budget::BudgetError;
use crate::export::ExportError;
use crate::llm::GatewayError;
use crate::prompt::TemplateError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unreadable configuration, including the API credential.
    /// Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Budget(#[from] BudgetError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GatewayErrorKind;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("config error"));
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn gateway_error_is_transparent() {
        let e: AppError = GatewayError::new(GatewayErrorKind::RateLimit, "slow down").into();
        assert_eq!(e.to_string(), "rate limited: slow down");
    }

    #[test]
    fn template_error_converts() {
        let e: AppError = TemplateError::MissingField {
            template: "budget".into(),
            field: "days".into(),
        }
        .into();
        assert!(matches!(e, AppError::Template(_)));
        assert!(e.to_string().contains("days"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}

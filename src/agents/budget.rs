//! Budget Buddy — one-shot budget table for a destination.
//!
//! The request is validated locally first; an invalid range or duration is
//! rejected without spending a gateway call. The reply replaces the
//! session's `budget` artifact and is not added to the chat turns.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use super::TravelAgent;
use crate::error::AppError;
use crate::llm::CompletionRequest;
use crate::session::BUDGET_ARTIFACT;

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 30;

/// Activities offered by the budget form; free text is accepted too.
pub const ACTIVITY_CHOICES: [&str; 6] = [
    "Sightseeing",
    "Adventure Sports",
    "Food Tours",
    "Shopping",
    "Cultural Tours",
    "Relaxation",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("minimum budget ({min}) exceeds maximum budget ({max})")]
    RangeInverted { min: u64, max: u64 },
    #[error("trip duration must be between 1 and 30 days, got {0}")]
    DaysOutOfRange(u32),
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("unknown travel style '{0}' (expected Budget, Mid-range or Luxury)")]
    UnknownStyle(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelStyle {
    #[default]
    Budget,
    MidRange,
    Luxury,
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TravelStyle::Budget => "Budget",
            TravelStyle::MidRange => "Mid-range",
            TravelStyle::Luxury => "Luxury",
        })
    }
}

impl FromStr for TravelStyle {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '_'], "-").as_str() {
            "budget" => Ok(TravelStyle::Budget),
            "mid-range" | "midrange" | "mid" => Ok(TravelStyle::MidRange),
            "luxury" => Ok(TravelStyle::Luxury),
            _ => Err(BudgetError::UnknownStyle(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetRequest {
    /// One or more destinations, comma separated.
    pub destination: String,
    pub days: u32,
    pub style: TravelStyle,
    pub activities: Vec<String>,
    /// Currency code the table is priced in (e.g. `USD`, `INR`).
    pub currency: String,
    pub min_budget: u64,
    pub max_budget: u64,
}

impl Default for BudgetRequest {
    fn default() -> Self {
        Self {
            destination: "Bali".into(),
            days: 7,
            style: TravelStyle::Budget,
            activities: vec!["Sightseeing".into()],
            currency: "USD".into(),
            min_budget: 0,
            max_budget: 5000,
        }
    }
}

impl BudgetRequest {
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.destination.trim().is_empty() {
            return Err(BudgetError::MissingField("destination"));
        }
        if self.currency.trim().is_empty() {
            return Err(BudgetError::MissingField("currency"));
        }
        if !(MIN_DAYS..=MAX_DAYS).contains(&self.days) {
            return Err(BudgetError::DaysOutOfRange(self.days));
        }
        if self.min_budget > self.max_budget {
            return Err(BudgetError::RangeInverted { min: self.min_budget, max: self.max_budget });
        }
        Ok(())
    }

    /// Template fields for the `budget` prompt.
    pub fn fields(&self) -> HashMap<&'static str, String> {
        let activities = if self.activities.is_empty() {
            "no specific activities".to_string()
        } else {
            self.activities.join(", ")
        };
        HashMap::from([
            ("destination", self.destination.trim().to_string()),
            ("days", self.days.to_string()),
            ("style", self.style.to_string()),
            ("activities", activities),
            ("currency", self.currency.trim().to_string()),
            ("min_budget", self.min_budget.to_string()),
            ("max_budget", self.max_budget.to_string()),
        ])
    }
}

impl TravelAgent {
    pub async fn budget(&mut self, request: &BudgetRequest) -> Result<String, AppError> {
        request.validate()?;

        let prompt = self.templates.budget.render(&request.fields())?;
        debug!(
            destination = %request.destination,
            days = request.days,
            currency = %request.currency,
            "budget: requesting table"
        );

        let table = self
            .provider
            .complete(&CompletionRequest::new(&prompt).with_temperature(self.budget_temperature))
            .await?;

        self.session.record_artifact(BUDGET_ARTIFACT, table.clone());
        info!(session_id = %self.session.id(), "budget: table recorded");
        Ok(table)
    }
}

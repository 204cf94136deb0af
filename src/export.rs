//! Trip export — turns the session into a plain-text summary document.
//!
//! Layout:
//!
//! ```text
//! # Travel Summary
//!
//! ## Chat Conversation          (chat selected, at least one turn)
//! **User**: ...
//!
//! **Assistant**: ...
//!
//! ## Budget Estimate            (budget selected, budget artifact present)
//! <table>
//!
//! ## Photo Spot & Itinerary     (itinerary selected, itinerary artifact present)
//! <text>
//! ```
//!
//! A selected section with nothing to show is left out, not an error.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::session::{BUDGET_ARTIFACT, ITINERARY_ARTIFACT, Session};

pub const HEADER: &str = "# Travel Summary\n\n";
pub const DEFAULT_STEM: &str = "my_trip_plan";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export file name '{0}'")]
    InvalidStem(String),
    #[error("cannot write export {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Chat,
    Budget,
    Itinerary,
}

impl Section {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chat" => Some(Section::Chat),
            "budget" => Some(Section::Budget),
            "itinerary" | "photo" => Some(Section::Itinerary),
            _ => None,
        }
    }
}

/// Which sections to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub chat: bool,
    pub budget: bool,
    pub itinerary: bool,
}

impl Selection {
    /// Chat and budget — what the export screen ticks by default.
    pub fn standard() -> Self {
        Self { chat: true, budget: true, itinerary: false }
    }

    pub fn with(mut self, section: Section) -> Self {
        match section {
            Section::Chat => self.chat = true,
            Section::Budget => self.budget = true,
            Section::Itinerary => self.itinerary = true,
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        !(self.chat || self.budget || self.itinerary)
    }
}

impl FromIterator<Section> for Selection {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        iter.into_iter().fold(Selection::default(), Selection::with)
    }
}

/// Build the export document. Deterministic for a given session state.
pub fn assemble(selection: Selection, session: &Session) -> String {
    let mut content = String::from(HEADER);

    if selection.chat && !session.is_empty() {
        content.push_str("## Chat Conversation\n");
        for turn in session.history_as_context() {
            content.push_str(&format!("**{}**: {}\n\n", turn.role().title(), turn.text()));
        }
    }

    if selection.budget {
        if let Some(budget) = session.artifact(BUDGET_ARTIFACT) {
            content.push_str("## Budget Estimate\n");
            content.push_str(budget);
            content.push_str("\n\n");
        }
    }

    if selection.itinerary {
        if let Some(itinerary) = session.artifact(ITINERARY_ARTIFACT) {
            content.push_str("## Photo Spot & Itinerary\n");
            content.push_str(itinerary);
            content.push_str("\n\n");
        }
    }

    content
}

/// Write `content` to `<dir>/<stem>.txt`, creating `dir` if needed.
///
/// The stem must be a plain file name: non-blank, no path separators, not
/// `.` or `..`. A trailing `.txt` is accepted and not doubled.
pub fn write(dir: &Path, stem: &str, content: &str) -> Result<PathBuf, ExportError> {
    let stem = validate_stem(stem)?;
    let path = dir.join(format!("{stem}.txt"));

    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, content))
        .map_err(|source| ExportError::Write { path: path.clone(), source })?;

    info!(path = %path.display(), bytes = content.len(), "export written");
    Ok(path)
}

fn validate_stem(stem: &str) -> Result<&str, ExportError> {
    let trimmed = stem.trim();
    let trimmed = trimmed.strip_suffix(".txt").unwrap_or(trimmed);
    let bad = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed.chars().any(char::is_control);
    if bad {
        return Err(ExportError::InvalidStem(stem.to_string()));
    }
    Ok(trimmed)
}

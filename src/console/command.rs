//! Console line grammar.
//!
//! ```text
//! <text>                                    chat with Mr. Thomas
//! /budget key=value; key=value; ...         Budget Buddy (keys below)
//! /where <photo path>                       Where Is It?
//! /history                                  show the conversation so far
//! /export [name] [chat] [budget] [itinerary] [name=<any file name>]
//! /help
//! /quit
//! ```
//!
//! Budget keys: `destination`, `days`, `style`, `activities` (comma
//! separated), `currency`, `min`, `max`. Omitted keys keep the form
//! defaults.

use std::path::PathBuf;

use crate::agents::budget::{BudgetRequest, TravelStyle};
use crate::error::AppError;
use crate::export::{DEFAULT_STEM, Section, Selection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Budget(BudgetRequest),
    Where(PathBuf),
    History,
    Export { stem: String, selection: Selection },
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

pub fn parse(line: &str) -> Result<Command, AppError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Nothing);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Chat(line.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "budget" => parse_budget(args).map(Command::Budget),
        "where" => {
            if args.is_empty() {
                Err(AppError::InvalidInput("usage: /where <photo path>".into()))
            } else {
                Ok(Command::Where(PathBuf::from(args)))
            }
        }
        "history" => Ok(Command::History),
        "export" => parse_export(args),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(AppError::InvalidInput(format!("unknown command '/{other}' (try /help)"))),
    }
}

fn parse_budget(args: &str) -> Result<BudgetRequest, AppError> {
    let mut req = BudgetRequest::default();
    for pair in args.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim()))
            .ok_or_else(|| AppError::InvalidInput(format!("expected key=value, got '{pair}'")))?;

        match key.as_str() {
            "destination" | "dest" => req.destination = value.to_string(),
            "days" => req.days = parse_number(&key, value)?,
            "style" => req.style = value.parse::<TravelStyle>()?,
            "activities" => {
                req.activities = value
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect();
            }
            "currency" => req.currency = value.to_ascii_uppercase(),
            "min" | "min_budget" => req.min_budget = parse_number(&key, value)?,
            "max" | "max_budget" => req.max_budget = parse_number(&key, value)?,
            other => return Err(AppError::InvalidInput(format!("unknown budget field '{other}'"))),
        }
    }
    Ok(req)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("{key} must be a whole number, got '{value}'")))
}

fn parse_export(args: &str) -> Result<Command, AppError> {
    // `name=` takes the rest of the line, so any file name fits.
    let (args, mut stem) = match args.split_once("name=") {
        Some((before, name)) if before.is_empty() || before.ends_with(char::is_whitespace) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::InvalidInput("name= needs a file name".into()));
            }
            (before, Some(name))
        }
        _ => (args, None),
    };

    let mut selection = Selection::default();
    for token in args.split_whitespace() {
        match Section::parse(token) {
            Some(section) => selection = selection.with(section),
            None if stem.is_none() => stem = Some(token),
            None => {
                return Err(AppError::InvalidInput(format!(
                    "unexpected '{token}': usage /export [name] [chat] [budget] [itinerary] [name=<file name>]"
                )));
            }
        }
    }
    if selection.is_empty() {
        selection = Selection::standard();
    }
    Ok(Command::Export { stem: stem.unwrap_or(DEFAULT_STEM).to_string(), selection })
}

pub const HELP: &str = "\
Commands:
  <message>                                 chat with Mr. Thomas
  /budget destination=Bali, Tokyo; days=7; style=Mid-range;
          activities=Sightseeing, Food Tours; currency=INR; min=500; max=1500
  /where <photo.jpg|photo.png>              identify a spot and get an itinerary
  /history                                  show the conversation so far
  /export [name] [chat] [budget] [itinerary] [name=<file name>]
                                            save a summary as <name>.txt
  /help                                     this text
  /quit                                     leave";

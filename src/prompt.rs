//! Named-placeholder prompt templates.
//!
//! Templates use `{{name}}` placeholders. Every placeholder that appears in
//! the text is required: [`PromptTemplate::render`] fails with
//! [`TemplateError::MissingField`] if any of them has no value. Values are
//! inserted verbatim in a single pass, so a value that itself contains
//! `{{...}}` is never expanded again.
//!
//! The built-in texts can be overridden per template by dropping a
//! `<name>.txt` file into the prompts directory (`config/prompts/` by
//! default). Missing files fall back to the built-in text.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template '{template}' is missing required field '{field}'")]
    MissingField { template: String, field: String },
}

/// Chat persona for Mr. Thomas. Placeholder: `user_input`.
pub const TRAVEL_CHAT: &str = "travel_chat";
/// Budget table request. Placeholders: `destination`, `days`, `style`,
/// `activities`, `currency`, `min_budget`, `max_budget`.
pub const BUDGET: &str = "budget";
/// Photo spot detection instruction sent alongside an image.
pub const SPOT_DETECT: &str = "spot_detect";

const TRAVEL_CHAT_TEXT: &str = "\
You are a professional travel planner AI. Based on the user's request, respond with a detailed itinerary, travel tips, and estimated cost. Always be friendly and informative.

User request: {{user_input}}

Structure your response like this:
- **Destination Overview**
- **Best Time to Visit**
- **Day-by-Day Itinerary**
- **Budget Estimate**
- **Travel Tips**

Make sure it's clear, practical, within 250 words and sounds like a helpful travel agent.

DO NOT USE LATEX IN YOUR RESPONSE. ONLY USE MARKDOWN.";

const BUDGET_TEXT: &str = "\
You are a travel budgeting assistant. DO NOT USE LATEX ANYWHERE JUST USE MARKDOWN.

Plan a travel budget for a trip to {{destination}} for {{days}} days.
The user prefers a {{style}} travel experience.
Activities planned: {{activities}}.
The total must stay between {{min_budget}} and {{max_budget}} {{currency}}.

Keep the response brief apart from the table, there should not be more than 150 words.

Output a table with the following format, with every amount in {{currency}}:

| Category      | Estimated Cost ({{currency}}) |
|---------------|-------------------------------|
| Flights       | ...                           |
| Accommodation | ...                           |
| Food          | ...                           |
| Activities    | ...                           |
| Transport     | ...                           |
| Misc          | ...                           |
| **Total**     | **...**                       |";

const SPOT_DETECT_TEXT: &str = "\
What famous landmark or tourist spot is shown in this image? Also suggest nearby attractions \
and a short sample itinerary for visiting them. DO NOT USE LATEX. ONLY USE MARKDOWN.";

/// An immutable template with its required placeholder names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    text: String,
    required: Vec<String>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut required: Vec<String> = Vec::new();
        for segment in parse(&text) {
            if let Segment::Field(field) = segment {
                if !required.iter().any(|r| r == field) {
                    required.push(field.to_string());
                }
            }
        }
        Self { name: name.into(), text, required }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of first appearance.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Substitute every placeholder from `fields`. Extra fields are ignored.
    pub fn render(&self, fields: &HashMap<&str, String>) -> Result<String, TemplateError> {
        if let Some(missing) = self.required.iter().find(|r| !fields.contains_key(r.as_str())) {
            return Err(TemplateError::MissingField {
                template: self.name.clone(),
                field: missing.clone(),
            });
        }

        let mut out = String::with_capacity(self.text.len());
        for segment in parse(&self.text) {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                // Presence checked above.
                Segment::Field(f) => out.push_str(fields.get(f).map(String::as_str).unwrap_or_default()),
            }
        }
        Ok(out)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Field(&'a str),
}

/// Split `text` into literal runs and `{{name}}` fields. Braces that do not
/// enclose a valid identifier are kept as literal text.
fn parse(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else { break };
        let name = after_open[..close].trim();
        if is_identifier(name) {
            if open > 0 {
                segments.push(Segment::Literal(&rest[..open]));
            }
            segments.push(Segment::Field(name));
        } else {
            segments.push(Segment::Literal(&rest[..open + 2 + close + 2]));
        }
        rest = &after_open[close + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The fixed set of templates the agents use, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Templates {
    pub chat: PromptTemplate,
    pub budget: PromptTemplate,
    pub spot: PromptTemplate,
}

impl Templates {
    /// Built-in texts only.
    pub fn builtin() -> Self {
        Self {
            chat: PromptTemplate::new(TRAVEL_CHAT, TRAVEL_CHAT_TEXT),
            budget: PromptTemplate::new(BUDGET, BUDGET_TEXT),
            spot: PromptTemplate::new(SPOT_DETECT, SPOT_DETECT_TEXT),
        }
    }

    /// Built-in texts, each replaced by `<prompts_dir>/<name>.txt` when that
    /// file exists and is non-empty.
    pub fn load(prompts_dir: &Path) -> Self {
        Self {
            chat: load_one(prompts_dir, TRAVEL_CHAT, TRAVEL_CHAT_TEXT),
            budget: load_one(prompts_dir, BUDGET, BUDGET_TEXT),
            spot: load_one(prompts_dir, SPOT_DETECT, SPOT_DETECT_TEXT),
        }
    }
}

fn load_one(prompts_dir: &Path, name: &str, fallback: &str) -> PromptTemplate {
    let path = prompts_dir.join(format!("{name}.txt"));
    match fs::read_to_string(&path) {
        Ok(text) if !text.trim().is_empty() => {
            debug!(template = name, path = %path.display(), "prompt: loaded override");
            PromptTemplate::new(name, text.trim())
        }
        _ => {
            debug!(template = name, "prompt: no override at {} — using built-in", path.display());
            PromptTemplate::new(name, fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fields<'a>(pairs: &[(&'a str, &str)]) -> HashMap<&'a str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn required_fields_in_first_appearance_order() {
        let t = PromptTemplate::new("t", "{{b}} and {{a}} then {{b}} again");
        assert_eq!(t.required(), ["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn render_substitutes_every_placeholder() {
        let t = PromptTemplate::new("t", "Trip to {{ place }} for {{days}} days");
        let out = t.render(&fields(&[("place", "Kyoto"), ("days", "5")])).unwrap();
        assert_eq!(out, "Trip to Kyoto for 5 days");
    }

    #[test]
    fn render_missing_field_fails() {
        let t = PromptTemplate::new("budget", "{{destination}} {{days}}");
        let err = t.render(&fields(&[("destination", "Bali")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingField { template: "budget".into(), field: "days".into() }
        );
    }

    #[test]
    fn values_are_not_reexpanded() {
        let t = PromptTemplate::new("t", "Q: {{q}}");
        let out = t
            .render(&fields(&[("q", "what is {{secret}}?"), ("secret", "leaked")]))
            .unwrap();
        assert_eq!(out, "Q: what is {{secret}}?");
    }

    #[test]
    fn non_identifier_braces_are_literal() {
        let t = PromptTemplate::new("t", "json {{ \"a\": 1 }} and {{x}}");
        assert_eq!(t.required(), ["x".to_string()]);
        let out = t.render(&fields(&[("x", "y")])).unwrap();
        assert_eq!(out, "json {{ \"a\": 1 }} and y");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        let t = PromptTemplate::new("t", "open {{name");
        assert!(t.required().is_empty());
        assert_eq!(t.render(&HashMap::new()).unwrap(), "open {{name");
    }

    #[test]
    fn builtin_chat_template_has_single_field() {
        let t = Templates::builtin();
        assert_eq!(t.chat.required(), ["user_input".to_string()]);
        assert!(t.spot.required().is_empty());
        assert_eq!(t.budget.required().len(), 7);
    }

    #[test]
    fn builtin_budget_renders_currency_and_destinations() {
        let t = Templates::builtin();
        let out = t
            .budget
            .render(&fields(&[
                ("destination", "Bali, Tokyo"),
                ("days", "7"),
                ("style", "Mid-range"),
                ("activities", "Sightseeing, Food Tours"),
                ("currency", "INR"),
                ("min_budget", "500"),
                ("max_budget", "1500"),
            ]))
            .unwrap();
        assert!(out.contains("Bali, Tokyo"));
        assert!(out.contains("INR"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn load_prefers_override_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("travel_chat.txt"), "Custom: {{user_input}}\n").unwrap();
        let t = Templates::load(dir.path());
        assert_eq!(t.chat.text(), "Custom: {{user_input}}");
        assert_eq!(t.budget, Templates::builtin().budget);
    }

    #[test]
    fn load_skips_blank_override() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("spot_detect.txt"), "   \n").unwrap();
        let t = Templates::load(dir.path());
        assert_eq!(t.spot, Templates::builtin().spot);
    }
}

//! Tests for prompt loading from config/prompts

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thomas_raw::prompt::{BUDGET, SPOT_DETECT, TRAVEL_CHAT, Templates};

fn prompts_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/prompts")
}

#[test]
fn test_prompt_files_exist() {
    for name in [TRAVEL_CHAT, BUDGET, SPOT_DETECT] {
        let path = prompts_dir().join(format!("{name}.txt"));
        assert!(fs::metadata(&path).is_ok(), "{name}.txt prompt file missing");
    }
}

#[test]
fn test_chat_prompt_template_vars() {
    let text = fs::read_to_string(prompts_dir().join("travel_chat.txt")).unwrap();
    assert!(text.contains("{{user_input}}"), "travel_chat.txt should contain {{user_input}} variable");
}

#[test]
fn test_budget_prompt_template_vars() {
    let text = fs::read_to_string(prompts_dir().join("budget.txt")).unwrap();
    for var in ["destination", "days", "style", "activities", "currency", "min_budget", "max_budget"] {
        assert!(text.contains(&format!("{{{{{var}}}}}")), "budget.txt should contain {{{{{var}}}}}");
    }
}

#[test]
fn test_shipped_prompts_match_builtin_fields() {
    let shipped = Templates::load(&prompts_dir());
    let builtin = Templates::builtin();
    assert_eq!(shipped.chat.required(), builtin.chat.required());
    assert_eq!(shipped.budget.required(), builtin.budget.required());
    assert!(shipped.spot.required().is_empty());
}

#[test]
fn test_shipped_spot_prompt_renders_without_fields() {
    let t = Templates::load(&prompts_dir());
    let text = t.spot.render(&HashMap::new()).unwrap();
    assert!(text.contains("landmark"));
}

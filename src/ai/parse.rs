//! Best-effort extraction of suggestions from free-form vendor text.
//! Nothing in here fails: anything unusable becomes `Unparsed` or is skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{AiSuggestion, TaskCategorization};
use crate::database::models::TaskPriority;

pub const MAX_SUGGESTION_TAGS: usize = 10;

static LABELLED_TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)title[:\-]?\s*(.+)").expect("valid title regex"));
static NUMBERED_TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[\.\)]\s*(.+)").expect("valid numbered regex"));
static DESCRIPTION_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)description[:\-]?\s*").expect("valid description regex"));
static PRIORITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)priority[:\-]?\s*(low|medium|high)").expect("valid priority regex"));
static TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)tags[:\-]?\s*\[(.+)\]").expect("valid tags regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Vec<AiSuggestion>),
    Unparsed,
}

impl ParseOutcome {
    fn from_vec(suggestions: Vec<AiSuggestion>) -> Self {
        if suggestions.is_empty() { ParseOutcome::Unparsed } else { ParseOutcome::Parsed(suggestions) }
    }
}

/// JSON array first, then labelled/numbered line triplets.
pub fn parse_suggestions(raw: &str) -> ParseOutcome {
    match json_slice(raw, '[', ']').and_then(|s| serde_json::from_str::<Value>(s).ok()) {
        Some(Value::Array(items)) => ParseOutcome::from_vec(items.iter().filter_map(suggestion_from_json).collect()),
        _ => ParseOutcome::from_vec(parse_lines(raw)),
    }
}

/// `{tags, priority}` from the first `{` to the last `}`.
pub fn parse_categorization(raw: &str) -> Option<TaskCategorization> {
    let Value::Object(map) = serde_json::from_str::<Value>(json_slice(raw, '{', '}')?).ok()? else {
        return None;
    };
    let tags = match map.get("tags") {
        Some(Value::Array(items)) => clean_tags(items.iter().filter_map(Value::as_str)),
        _ => vec![],
    };
    Some(TaskCategorization { tags, priority: priority_from_json(map.get("priority")) })
}

fn json_slice(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (start < end).then(|| &raw[start..=end])
}

fn first_non_empty<'a>(item: &'a Value, keys: &[&str]) -> &'a str {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

fn priority_from_json(value: Option<&Value>) -> TaskPriority {
    value.and_then(Value::as_str).map(TaskPriority::parse_lenient).unwrap_or_default()
}

fn clean_tags<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<String> {
    tags.map(|t| t.trim().trim_matches(|c: char| c == '"' || c == '\'').trim())
        .filter(|t| !t.is_empty())
        .take(MAX_SUGGESTION_TAGS)
        .map(str::to_string)
        .collect()
}

fn suggestion_from_json(item: &Value) -> Option<AiSuggestion> {
    if !item.is_object() {
        return None;
    }
    let title = first_non_empty(item, &["title", "task"]);
    if title.is_empty() {
        return None;
    }
    let tags = match item.get("tags") {
        Some(Value::Array(items)) => clean_tags(items.iter().filter_map(Value::as_str)),
        Some(Value::String(single)) => clean_tags(std::iter::once(single.as_str())),
        _ => vec![],
    };
    Some(AiSuggestion {
        title: title.to_string(),
        description: first_non_empty(item, &["description", "desc"]).to_string(),
        priority: priority_from_json(item.get("priority")),
        tags,
    })
}

fn parse_lines(raw: &str) -> Vec<AiSuggestion> {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut suggestions = Vec::new();

    for chunk in lines.chunks(3) {
        let head = chunk[0].trim();
        let Some(caps) = LABELLED_TITLE_RE.captures(head).or_else(|| NUMBERED_TITLE_RE.captures(head)) else {
            continue;
        };
        let title = caps[1].trim();
        if title.is_empty() {
            continue;
        }

        let description = chunk
            .get(1)
            .map(|l| DESCRIPTION_LABEL_RE.replace(l, "").trim().to_string())
            .unwrap_or_default();
        let meta = chunk.get(2).copied().unwrap_or("");
        let priority = PRIORITY_RE
            .captures(meta)
            .map(|c| TaskPriority::parse_lenient(&c[1]))
            .unwrap_or_default();
        let tags = TAGS_RE.captures(meta).map(|c| clean_tags(c[1].split(','))).unwrap_or_default();

        suggestions.push(AiSuggestion { title: title.to_string(), description, priority, tags });
    }

    suggestions
}

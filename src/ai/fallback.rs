use once_cell::sync::Lazy;
use regex::Regex;

use super::prompt::Theme;
use super::{AiSuggestion, TaskCategorization};
use crate::database::models::TaskPriority;

pub const MAX_FALLBACK_SUGGESTIONS: usize = 3;

fn suggestion(title: &str, description: &str, priority: TaskPriority, tags: &[&str]) -> AiSuggestion {
    AiSuggestion {
        title: title.to_string(),
        description: description.to_string(),
        priority,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Static suggestions used whenever the vendor gives nothing usable.
pub fn fallback_suggestions(themes: &[Theme]) -> Vec<AiSuggestion> {
    let mut suggestions = Vec::new();

    if themes.contains(&Theme::Work) {
        suggestions.push(suggestion(
            "Review weekly goals",
            "Take time to review and adjust your weekly objectives",
            TaskPriority::Medium,
            &["work", "planning"],
        ));
    }
    if themes.contains(&Theme::Personal) {
        suggestions.push(suggestion(
            "Schedule personal time",
            "Block time for self-care and relaxation",
            TaskPriority::High,
            &["personal", "wellness"],
        ));
    }
    suggestions.push(suggestion(
        "Review and prioritize tasks",
        "Take a moment to review your task list and prioritize",
        TaskPriority::Medium,
        &["planning", "review"],
    ));

    suggestions.truncate(MAX_FALLBACK_SUGGESTIONS);
    suggestions
}

static URGENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(urgent|asap|important|critical)\b").expect("valid urgent regex"));

/// Keyword rules, in tag order. `urgent` is handled separately since it also
/// raises the priority.
static TAG_RULES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("work", r"\b(work|job|office|meeting|project)\b"),
        ("personal", r"\b(personal|family|home|health)\b"),
        ("shopping", r"\b(shopping|buy|purchase)\b"),
        ("learning", r"\b(learn|study|read|course)\b"),
    ]
    .into_iter()
    .map(|(tag, pattern)| (tag, Regex::new(pattern).expect("valid tag rule regex")))
    .collect()
});

pub fn categorize_fallback(title: &str, description: &str) -> TaskCategorization {
    let text = format!("{} {}", title, description).to_lowercase();
    let mut tags = Vec::new();
    let mut priority = TaskPriority::Medium;

    if URGENT_RE.is_match(&text) {
        priority = TaskPriority::High;
        tags.push("urgent".to_string());
    }
    for (tag, re) in TAG_RULES.iter() {
        if re.is_match(&text) {
            tags.push(tag.to_string());
        }
    }
    if tags.is_empty() {
        tags.push("general".to_string());
    }

    TaskCategorization { tags, priority }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_follows_themes() {
        let titles = |themes: &[Theme]| -> Vec<String> { fallback_suggestions(themes).into_iter().map(|s| s.title).collect() };

        assert_eq!(titles(&[]), vec!["Review and prioritize tasks"]);
        assert_eq!(titles(&[Theme::Work]), vec!["Review weekly goals", "Review and prioritize tasks"]);
        assert_eq!(
            titles(&[Theme::Work, Theme::Personal]),
            vec!["Review weekly goals", "Schedule personal time", "Review and prioritize tasks"]
        );

        let personal = fallback_suggestions(&[Theme::Personal]);
        assert_eq!(personal[0].priority, TaskPriority::High);
        assert_eq!(personal[0].tags, vec!["personal", "wellness"]);
    }

    #[test]
    fn categorizes_by_keywords() {
        let c = categorize_fallback("URGENT: finish project report", "for the office");
        assert_eq!(c.priority, TaskPriority::High);
        assert_eq!(c.tags, vec!["urgent", "work"]);

        let c = categorize_fallback("Buy groceries", "for the family dinner, read recipe");
        assert_eq!(c.priority, TaskPriority::Medium);
        assert_eq!(c.tags, vec!["personal", "shopping", "learning"]);

        let c = categorize_fallback("Water plants", "");
        assert_eq!(c.tags, vec!["general"]);
        assert_eq!(c.priority, TaskPriority::Medium);
    }
}

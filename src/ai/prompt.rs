use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::database::models::Task;

/// Tasks rendered into the suggestion prompt.
pub const PROMPT_TASK_SAMPLE: usize = 10;
pub const COMMON_TAG_LIMIT: usize = 5;

static WORK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(work|job|office|meeting|project|deadline)\b").expect("valid work regex"));
static PERSONAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(personal|family|home|health|wellness)\b").expect("valid personal regex"));

/// Coarse topic detected across a user's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Work,
    Personal,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Work => "work",
            Theme::Personal => "personal",
        }
    }
}

/// Themes present in the lower-cased titles and descriptions, work first.
pub fn analyze_task_themes(tasks: &[Task]) -> Vec<Theme> {
    let corpus = tasks
        .iter()
        .map(|t| format!("{} {}", t.title, t.description))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut themes = Vec::new();
    if WORK_RE.is_match(&corpus) {
        themes.push(Theme::Work);
    }
    if PERSONAL_RE.is_match(&corpus) {
        themes.push(Theme::Personal);
    }
    themes
}

/// Most frequent tags, ties broken by first appearance.
pub fn extract_common_tags(tasks: &[Task]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for tag in tasks.iter().flat_map(|t| t.tags.iter()) {
        let count = counts.entry(tag.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(tag.as_str());
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among equal counts.
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen.into_iter().take(COMMON_TAG_LIMIT).map(str::to_string).collect()
}

fn render_task(task: &Task) -> String {
    let mut line = format!("- {}", task.title);
    if !task.description.is_empty() {
        line.push_str(": ");
        line.push_str(&task.description);
    }
    if !task.tags.is_empty() {
        line.push_str(&format!(" [{}]", task.tags.join(", ")));
    }
    line
}

pub fn build_suggestion_prompt(tasks: &[Task], themes: &[Theme], user_context: Option<&str>) -> String {
    let task_lines = tasks.iter().take(PROMPT_TASK_SAMPLE).map(render_task).collect::<Vec<_>>().join("\n");
    let theme_names = themes.iter().map(Theme::as_str).collect::<Vec<_>>().join(", ");
    let common_tags = extract_common_tags(tasks).join(", ");
    let context_line = match user_context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("User context: {}", context),
        None => String::new(),
    };

    format!(
        r#"Based on the user's existing tasks, suggest 3-5 relevant new tasks that would help them be more productive and organized.

Existing tasks:
{tasks}

Common themes: {themes}
Common tags: {tags}

{context}

Respond with a JSON array in exactly this shape:
[
  {{
    "title": "Task title",
    "description": "Brief description",
    "priority": "low|medium|high",
    "tags": ["tag1", "tag2"]
  }}
]

Make the suggestions:
- Relevant to their existing work patterns
- Actionable and specific
- Varied in priority levels
- Tagged appropriately"#,
        tasks = if task_lines.is_empty() { "No existing tasks".to_string() } else { task_lines },
        themes = if theme_names.is_empty() { "general".to_string() } else { theme_names },
        tags = if common_tags.is_empty() { "none".to_string() } else { common_tags },
        context = context_line,
    )
}

pub fn build_categorize_prompt(title: &str, description: &str) -> String {
    format!(
        r#"Categorize this task and determine its priority:

Title: {title}
Description: {description}

Return a JSON object with:
{{
  "tags": ["tag1", "tag2"],
  "priority": "low|medium|high"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TaskDraft;
    use chrono::Utc;
    use uuid::Uuid;

    fn task(title: &str, description: &str, tags: &[&str]) -> Task {
        Task::from_draft(
            Uuid::new_v4(),
            TaskDraft {
                title: title.into(),
                description: description.into(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn detects_themes_on_word_boundaries() {
        assert_eq!(analyze_task_themes(&[task("Team MEETING", "", &[])]), vec![Theme::Work]);
        assert_eq!(analyze_task_themes(&[task("Call family", "and plan project", &[])]), vec![Theme::Work, Theme::Personal]);
        assert!(analyze_task_themes(&[task("Homework", "networking", &[])]).is_empty());
        assert!(analyze_task_themes(&[]).is_empty());
    }

    #[test]
    fn common_tags_by_frequency_then_first_seen() {
        let tasks = vec![
            task("a", "", &["x", "y"]),
            task("b", "", &["z", "y"]),
            task("c", "", &["w", "v", "u"]),
            task("d", "", &["z"]),
        ];
        assert_eq!(extract_common_tags(&tasks), vec!["y", "z", "x", "w", "v"]);
    }

    #[test]
    fn prompt_samples_ten_tasks_and_includes_context() {
        let tasks: Vec<Task> = (0..12).map(|i| task(&format!("Task {}", i), "", &[])).collect();
        let prompt = build_suggestion_prompt(&tasks, &[], Some("moving house"));
        assert!(prompt.contains("- Task 9"));
        assert!(!prompt.contains("- Task 10"));
        assert!(prompt.contains("Common themes: general"));
        assert!(prompt.contains("Common tags: none"));
        assert!(prompt.contains("User context: moving house"));
    }

    #[test]
    fn prompt_renders_description_and_tags() {
        let prompt = build_suggestion_prompt(&[task("Buy milk", "2 litres", &["shopping", "home"])], &[Theme::Personal], None);
        assert!(prompt.contains("- Buy milk: 2 litres [shopping, home]"));
        assert!(prompt.contains("Common themes: personal"));
        assert!(!prompt.contains("User context"));

        let empty = build_suggestion_prompt(&[], &[], None);
        assert!(empty.contains("No existing tasks"));
    }
}

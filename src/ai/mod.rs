//! AI task suggestions and categorization.
//!
//! The service never fails: vendor errors and unusable replies are logged at
//! `warn` and replaced by the static heuristics in [`fallback`].

pub mod client;
pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod vendor;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::database::models::{Task, TaskPriority};

pub use client::{GenAiClient, TextGenerator, VendorError};
pub use parse::ParseOutcome;
pub use vendor::VendorKind;

pub const MAX_SUGGESTIONS: usize = 5;

/// Tasks loaded as context for a suggestion request.
pub const SUGGESTION_CONTEXT_TASKS: i32 = 20;

/// A proposed task. Transient until the client posts it back as a real task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSuggestion {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCategorization {
    pub tags: Vec<String>,
    pub priority: TaskPriority,
}

#[derive(Clone)]
pub struct SuggestionService {
    generator: Arc<dyn TextGenerator>,
}

impl SuggestionService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Between one and five suggestions based on `tasks` (newest first).
    pub async fn generate_task_suggestions(&self, tasks: &[Task], user_context: Option<&str>) -> Vec<AiSuggestion> {
        let themes = prompt::analyze_task_themes(tasks);
        let prompt = prompt::build_suggestion_prompt(tasks, &themes, user_context);

        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Suggestion vendor call failed, using fallback: {}", e);
                return fallback::fallback_suggestions(&themes);
            }
        };

        match parse::parse_suggestions(&reply) {
            ParseOutcome::Parsed(mut suggestions) => {
                debug!("Vendor returned {} suggestions", suggestions.len());
                suggestions.truncate(MAX_SUGGESTIONS);
                suggestions
            }
            ParseOutcome::Unparsed => {
                warn!("Could not parse vendor reply ({} chars), using fallback", reply.len());
                fallback::fallback_suggestions(&themes)
            }
        }
    }

    pub async fn categorize_task(&self, title: &str, description: &str) -> TaskCategorization {
        let prompt = prompt::build_categorize_prompt(title, description);
        match self.generator.generate(&prompt).await {
            Ok(reply) => parse::parse_categorization(&reply).unwrap_or_else(|| {
                warn!("Could not parse categorization reply, using keyword fallback");
                fallback::categorize_fallback(title, description)
            }),
            Err(e) => {
                warn!("Categorization vendor call failed, using keyword fallback: {}", e);
                fallback::categorize_fallback(title, description)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TaskDraft;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Replays a canned reply and records the prompt it was given.
    struct Canned {
        reply: Result<String, ()>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, prompt: &str) -> Result<String, VendorError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|_| VendorError::MissingApiKey)
        }
    }

    fn canned_service(reply: Result<&str, ()>) -> (SuggestionService, Arc<Canned>) {
        let canned = Arc::new(Canned { reply: reply.map(str::to_string), seen: Mutex::new(vec![]) });
        (SuggestionService::new(canned.clone()), canned)
    }

    fn task(title: &str) -> Task {
        Task::from_draft(Uuid::new_v4(), TaskDraft { title: title.into(), ..Default::default() }, Utc::now())
    }

    #[tokio::test]
    async fn caps_json_suggestions_at_five() {
        let items: Vec<_> = (0..7).map(|i| serde_json::json!({"title": format!("Idea {}", i)})).collect();
        let reply = serde_json::to_string(&items).unwrap();
        let (service, _) = canned_service(Ok(&reply));

        let suggestions = service.generate_task_suggestions(&[], None).await;
        assert_eq!(suggestions.len(), 5);
        assert!(suggestions.iter().all(|s| s.priority == TaskPriority::Medium));
        assert_eq!(suggestions[0].title, "Idea 0");
    }

    #[tokio::test]
    async fn unparseable_reply_uses_fallback() {
        let (service, _) = canned_service(Ok("Sorry, I can't do that."));
        let suggestions = service.generate_task_suggestions(&[task("Prepare meeting notes")], None).await;
        assert!(!suggestions.is_empty() && suggestions.len() <= 3);
        assert_eq!(suggestions[0].title, "Review weekly goals");
    }

    #[tokio::test]
    async fn vendor_failure_uses_fallback() {
        let (service, _) = canned_service(Err(()));
        let suggestions = service.generate_task_suggestions(&[], None).await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Review and prioritize tasks");
    }

    #[tokio::test]
    async fn forwards_context_into_prompt() {
        let (service, canned) = canned_service(Ok("[]"));
        service.generate_task_suggestions(&[task("Buy milk")], Some("new baby")).await;
        let prompt = canned.seen.lock().unwrap()[0].clone();
        assert!(prompt.contains("- Buy milk"));
        assert!(prompt.contains("User context: new baby"));
    }

    #[tokio::test]
    async fn categorize_prefers_vendor_then_keywords() {
        let (service, _) = canned_service(Ok(r#"{"tags": ["errand"], "priority": "low"}"#));
        let c = service.categorize_task("Buy stamps", "").await;
        assert_eq!(c, TaskCategorization { tags: vec!["errand".into()], priority: TaskPriority::Low });

        let (service, _) = canned_service(Err(()));
        let c = service.categorize_task("Buy stamps", "").await;
        assert_eq!(c.tags, vec!["shopping"]);
    }
}

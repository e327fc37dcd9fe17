use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::filter::{Condition, FilterRecord, FilterValue};

pub const TASKS_TABLE: &str = "tasks";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid status '{}', expected one of todo, in_progress, completed", s))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    /// Lenient parse used for vendor output: case-insensitive, anything
    /// unrecognized becomes `Medium`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().to_ascii_lowercase().parse().unwrap_or_default()
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| format!("Invalid priority '{}', expected one of low, medium, high", s))
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored task. Always owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub ai_suggested: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The user-editable part of a task, already validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub ai_suggested: bool,
}

impl Task {
    pub fn from_draft(user_id: Uuid, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
            tags: draft.tags,
            ai_suggested: draft.ai_suggested,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field. Identity, owner and `created_at` stay.
    /// Replace the editable fields. `ai_suggested` records where the task
    /// came from and is fixed at creation.
    pub fn apply(&mut self, draft: TaskDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.description = draft.description;
        self.status = draft.status;
        self.priority = draft.priority;
        self.due_date = draft.due_date;
        self.tags = draft.tags;
        self.updated_at = now;
    }
}

impl FilterRecord for Task {
    fn field(&self, column: &str) -> Option<FilterValue> {
        Some(match column {
            "id" => FilterValue::Uuid(self.id),
            "user_id" => FilterValue::Uuid(self.user_id),
            "title" => FilterValue::Text(self.title.clone()),
            "description" => FilterValue::Text(self.description.clone()),
            "status" => FilterValue::Text(self.status.as_str().to_string()),
            "priority" => FilterValue::Text(self.priority.as_str().to_string()),
            "due_date" => return self.due_date.map(FilterValue::Timestamp),
            "tags" => FilterValue::TextArray(self.tags.clone()),
            "ai_suggested" => FilterValue::Bool(self.ai_suggested),
            "created_at" => FilterValue::Timestamp(self.created_at),
            "updated_at" => FilterValue::Timestamp(self.updated_at),
            _ => return None,
        })
    }
}

/// Row shape of the `tasks` table. Enum columns are stored as text.
#[derive(Debug, FromRow)]
pub struct TaskRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub ai_suggested: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = DatabaseError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse().map_err(|e| DatabaseError::CorruptRecord(format!("task {}: {}", row.id, e)))?,
            priority: row.priority.parse().map_err(|e| DatabaseError::CorruptRecord(format!("task {}: {}", row.id, e)))?,
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            tags: row.tags,
            ai_suggested: row.ai_suggested,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Listing parameters for a single owner's tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
    pub limit: Option<i32>,
}

impl TaskQuery {
    /// Conditions for this query. The owner predicate is always first and
    /// always present.
    pub fn conditions(&self, owner: Uuid) -> Vec<Condition> {
        let mut conditions = vec![Condition::eq("user_id", FilterValue::Uuid(owner))];

        if let Some(status) = self.status {
            conditions.push(Condition::eq("status", FilterValue::Text(status.as_str().to_string())));
        }
        if let Some(priority) = self.priority {
            conditions.push(Condition::eq("priority", FilterValue::Text(priority.as_str().to_string())));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            conditions.push(Condition::or(vec![
                Condition::contains_ignore_case("title", search),
                Condition::contains_ignore_case("description", search),
            ]));
        }

        conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("done".parse::<TaskStatus>().is_err());
        assert_eq!(TaskPriority::parse_lenient(" HIGH "), TaskPriority::High);
        assert_eq!(TaskPriority::parse_lenient("urgent"), TaskPriority::Medium);
    }

    #[test]
    fn serializes_camel_case() {
        let task = Task::from_draft(Uuid::new_v4(), TaskDraft { title: "Write".into(), ..Default::default() }, Utc::now());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["status"], "todo");
        assert_eq!(value["priority"], "medium");
        assert!(value.get("userId").is_some());
        assert!(value.get("aiSuggested").is_some());
        assert!(value["dueDate"].is_null());
    }

    #[test]
    fn query_always_scopes_by_owner() {
        let owner = Uuid::new_v4();
        let conditions = TaskQuery::default().conditions(owner);
        assert_eq!(conditions, vec![Condition::eq("user_id", FilterValue::Uuid(owner))]);

        let query = TaskQuery { search: Some(String::new()), ..Default::default() };
        assert_eq!(query.conditions(owner).len(), 1);

        let query = TaskQuery {
            status: Some(TaskStatus::Completed),
            priority: Some(TaskPriority::High),
            search: Some("milk".into()),
            limit: None,
        };
        let conditions = query.conditions(owner);
        assert_eq!(conditions.len(), 4);
        assert_eq!(conditions[0], Condition::eq("user_id", FilterValue::Uuid(owner)));
    }

    #[test]
    fn apply_keeps_identity() {
        let owner = Uuid::new_v4();
        let created = Utc::now();
        let mut task = Task::from_draft(owner, TaskDraft { title: "a".into(), ..Default::default() }, created);
        let id = task.id;
        let later = created + chrono::Duration::seconds(5);
        task.apply(TaskDraft { title: "b".into(), status: TaskStatus::Completed, ..Default::default() }, later);

        assert_eq!(task.id, id);
        assert_eq!(task.user_id, owner);
        assert_eq!(task.created_at, created);
        assert_eq!(task.updated_at, later);
        assert_eq!(task.title, "b");
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn apply_keeps_ai_origin() {
        let draft = TaskDraft { title: "Stretch".into(), ai_suggested: true, ..Default::default() };
        let mut task = Task::from_draft(Uuid::new_v4(), draft, Utc::now());
        task.apply(TaskDraft { title: "Stretch daily".into(), ..Default::default() }, Utc::now());
        assert!(task.ai_suggested);

        let mut manual = Task::from_draft(Uuid::new_v4(), TaskDraft { title: "a".into(), ..Default::default() }, Utc::now());
        manual.apply(TaskDraft { title: "a".into(), ai_suggested: true, ..Default::default() }, Utc::now());
        assert!(!manual.ai_suggested);
    }
}

//! Request payload validation.
//!
//! Validators take the raw JSON document so that wrong types, missing fields
//! and out-of-range values all surface as one [`ValidationError`] with a
//! per-field message, instead of a serde rejection.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::database::models::{TaskDraft, TaskPriority, TaskStatus};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const MAX_TAGS: usize = 10;
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Field name to message. Only the first failure per field is kept.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationError {
    fields: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.add(field, message);
        err
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn into_field_errors(self) -> BTreeMap<String, String> {
        self.fields
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationError> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.fields.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Decode a request body. Malformed JSON and non-object documents are
/// validation failures on the `body` field.
pub fn parse_json_body(bytes: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::single("body", "Request body must be a JSON object")),
        Err(_) => Err(ValidationError::single("body", "Request body must be valid JSON")),
    }
}

/// Task schema shared by create and full-replacement update.
pub fn validate_task(body: &Map<String, Value>) -> Result<TaskDraft, ValidationError> {
    let mut errors = ValidationError::default();
    let mut draft = TaskDraft::default();

    match optional_str(body, "title", "Title", &mut errors) {
        Some(raw) => {
            let title = raw.trim();
            if title.is_empty() {
                errors.add("title", "Title is required");
            } else if title.chars().count() > TITLE_MAX_CHARS {
                errors.add("title", format!("Title must not exceed {} characters", TITLE_MAX_CHARS));
            } else {
                draft.title = title.to_string();
            }
        }
        None => errors.add("title", "Title is required"),
    }

    if let Some(raw) = optional_str(body, "description", "Description", &mut errors) {
        let description = raw.trim();
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.add("description", format!("Description must not exceed {} characters", DESCRIPTION_MAX_CHARS));
        } else {
            draft.description = description.to_string();
        }
    }

    if let Some(raw) = optional_str(body, "status", "Status", &mut errors) {
        match raw.parse::<TaskStatus>() {
            Ok(status) => draft.status = status,
            Err(e) => errors.add("status", e),
        }
    }

    if let Some(raw) = optional_str(body, "priority", "Priority", &mut errors) {
        match raw.parse::<TaskPriority>() {
            Ok(priority) => draft.priority = priority,
            Err(e) => errors.add("priority", e),
        }
    }

    if let Some(raw) = optional_str(body, "dueDate", "Due date", &mut errors) {
        match parse_due_date(raw) {
            Ok(due) => draft.due_date = due,
            Err(e) => errors.add("dueDate", e),
        }
    }

    match body.get("tags") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            if items.len() > MAX_TAGS {
                errors.add("tags", format!("Maximum {} tags allowed", MAX_TAGS));
            } else {
                let tags: Option<Vec<String>> = items.iter().map(|v| v.as_str().map(|s| s.trim().to_string())).collect();
                match tags {
                    Some(tags) => draft.tags = tags,
                    None => errors.add("tags", "Tags must be strings"),
                }
            }
        }
        Some(_) => errors.add("tags", "Tags must be an array of strings"),
    }

    match body.get("aiSuggested") {
        None | Some(Value::Null) => {}
        Some(Value::Bool(b)) => draft.ai_suggested = *b,
        Some(_) => errors.add("aiSuggested", "aiSuggested must be a boolean"),
    }

    errors.into_result(draft)
}

/// Accepts RFC 3339 instants or bare `YYYY-MM-DD` dates (midnight UTC).
/// Empty strings clear the date.
pub fn parse_due_date(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| format!("Invalid due date '{}', expected RFC 3339 or YYYY-MM-DD", raw))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn validate_registration(body: &Map<String, Value>) -> Result<Registration, ValidationError> {
    let mut errors = ValidationError::default();

    let name = optional_str(body, "name", "Name", &mut errors).map(str::trim).unwrap_or_default();
    let name_len = name.chars().count();
    if name_len < NAME_MIN_CHARS {
        errors.add("name", format!("Name must be at least {} characters", NAME_MIN_CHARS));
    } else if name_len > NAME_MAX_CHARS {
        errors.add("name", format!("Name must not exceed {} characters", NAME_MAX_CHARS));
    }

    let email = validate_email(body, &mut errors);

    let password = optional_str(body, "password", "Password", &mut errors).unwrap_or_default();
    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add("password", format!("Password must be at least {} characters", PASSWORD_MIN_CHARS));
    }

    errors.into_result(Registration {
        name: name.to_string(),
        email,
        password: password.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Login {
    pub email: String,
    pub password: String,
}

pub fn validate_login(body: &Map<String, Value>) -> Result<Login, ValidationError> {
    let mut errors = ValidationError::default();
    let email = validate_email(body, &mut errors);
    let password = optional_str(body, "password", "Password", &mut errors).unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result(Login { email, password: password.to_string() })
}

/// Title and description for a categorization request.
pub fn validate_categorize(body: &Map<String, Value>) -> Result<(String, String), ValidationError> {
    let mut errors = ValidationError::default();
    let title = optional_str(body, "title", "Title", &mut errors).map(str::trim).unwrap_or_default();
    if title.is_empty() {
        errors.add("title", "Title is required");
    }
    let description = optional_str(body, "description", "Description", &mut errors).map(str::trim).unwrap_or_default();
    errors.into_result((title.to_string(), description.to_string()))
}

fn validate_email(body: &Map<String, Value>, errors: &mut ValidationError) -> String {
    let email = optional_str(body, "email", "Email", errors)
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();
    if !EMAIL_RE.is_match(&email) {
        errors.add("email", "Please provide a valid email address");
    }
    email
}

/// A string field that may be absent or null. Any other JSON type is recorded
/// as an error and treated as absent.
fn optional_str<'a>(body: &'a Map<String, Value>, key: &str, label: &str, errors: &mut ValidationError) -> Option<&'a str> {
    match body.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.add(key, format!("{} must be a string", label));
            None
        }
    }
}

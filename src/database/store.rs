use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, Task, TaskDraft, TaskQuery, User, TASKS_TABLE, USERS_TABLE};
use crate::filter::{Condition, Filter, FilterValue};

/// Owner-scoped task persistence. Every read and write takes the caller's id;
/// a task owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, owner: Uuid, draft: TaskDraft) -> Result<Task, DatabaseError>;

    /// Newest first.
    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>, DatabaseError>;

    async fn get_task(&self, owner: Uuid, id: Uuid) -> Result<Task, DatabaseError>;

    async fn update_task(&self, owner: Uuid, id: Uuid, draft: TaskDraft) -> Result<Task, DatabaseError>;

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

pub(crate) fn task_filter(owner: Uuid, query: &TaskQuery) -> Result<Filter, DatabaseError> {
    let mut filter = Filter::new(TASKS_TABLE)?
        .where_clause(query.conditions(owner))?
        .order("created_at desc")?;
    if let Some(limit) = query.limit {
        filter = filter.limit(limit, None)?;
    }
    Ok(filter)
}

pub(crate) fn task_by_id_filter(owner: Uuid, id: Uuid) -> Result<Filter, DatabaseError> {
    Ok(Filter::new(TASKS_TABLE)?.where_clause(vec![
        Condition::eq("id", FilterValue::Uuid(id)),
        Condition::eq("user_id", FilterValue::Uuid(owner)),
    ])?)
}

pub(crate) fn user_by_email_filter(email: &str) -> Result<Filter, DatabaseError> {
    Ok(Filter::new(USERS_TABLE)?
        .where_clause(vec![Condition::eq("email", FilterValue::Text(email.to_string()))])?
        .limit(1, None)?)
}

pub(crate) fn task_not_found(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("task {}", id))
}

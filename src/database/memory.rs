use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, Task, TaskDraft, TaskQuery, User};
use crate::database::store::{task_by_id_filter, task_filter, task_not_found, user_by_email_filter, TaskStore, UserStore};
use crate::filter::filter_where::FilterWhere;
use crate::filter::{Filter, FilterRecord};

/// In-process stores for tests and `--in-memory` runs. Queries go through the
/// same filters as [`PgStore`](crate::database::PgStore), evaluated in-process.
#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<Vec<Task>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn position_of<R: FilterRecord>(records: &[R], filter: &Filter) -> Option<usize> {
    records.iter().position(|r| FilterWhere::matches(filter.conditions(), r))
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, owner: Uuid, draft: TaskDraft) -> Result<Task, DatabaseError> {
        let task = Task::from_draft(owner, draft, Utc::now());
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>, DatabaseError> {
        let filter = task_filter(owner, query)?;
        let tasks = self.tasks.read().await;
        // Reverse insertion order so equal timestamps still list newest first.
        Ok(filter.apply(tasks.iter().rev().cloned()))
    }

    async fn get_task(&self, owner: Uuid, id: Uuid) -> Result<Task, DatabaseError> {
        let filter = task_by_id_filter(owner, id)?;
        let tasks = self.tasks.read().await;
        filter.apply(tasks.iter().cloned()).into_iter().next().ok_or_else(|| task_not_found(id))
    }

    async fn update_task(&self, owner: Uuid, id: Uuid, draft: TaskDraft) -> Result<Task, DatabaseError> {
        let filter = task_by_id_filter(owner, id)?;
        let mut tasks = self.tasks.write().await;
        let index = position_of(&tasks, &filter).ok_or_else(|| task_not_found(id))?;
        let task = &mut tasks[index];
        task.apply(draft, Utc::now());
        Ok(task.clone())
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let filter = task_by_id_filter(owner, id)?;
        let mut tasks = self.tasks.write().await;
        let index = position_of(&tasks, &filter).ok_or_else(|| task_not_found(id))?;
        tasks.remove(index);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Conflict(format!("email {} already registered", new_user.email)));
        }
        let user = User::from_new(new_user, Utc::now());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let filter = user_by_email_filter(email)?;
        let users = self.users.read().await;
        Ok(filter.apply(users.iter().cloned()).into_iter().next())
    }
}

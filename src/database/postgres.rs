use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewUser, Task, TaskDraft, TaskQuery, TaskRow, User};
use crate::database::query_builder::{bind_param_query, bind_param_query_as, QueryBuilder};
use crate::database::store::{task_by_id_filter, task_filter, task_not_found, user_by_email_filter, TaskStore, UserStore};

const INSERT_TASK: &str = r#"INSERT INTO "tasks"
    ("id", "user_id", "title", "description", "status", "priority", "due_date", "tags", "ai_suggested", "created_at", "updated_at")
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    RETURNING *"#;

const UPDATE_TASK_SET: &str = r#"UPDATE "tasks" SET
    "title" = $1, "description" = $2, "status" = $3, "priority" = $4,
    "due_date" = $5, "tags" = $6, "updated_at" = $7"#;

/// Number of values bound by `UPDATE_TASK_SET` ahead of the WHERE clause.
const UPDATE_SET_PARAMS: usize = 7;

const INSERT_USER: &str = r#"INSERT INTO "users" ("id", "name", "email", "password_hash", "created_at")
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *"#;

/// PostgreSQL-backed stores sharing one lazily connected pool.
#[derive(Clone)]
pub struct PgStore {
    manager: Arc<DatabaseManager>,
}

impl PgStore {
    pub fn new(manager: Arc<DatabaseManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, owner: Uuid, draft: TaskDraft) -> Result<Task, DatabaseError> {
        let pool = self.manager.pool().await?;
        let task = Task::from_draft(owner, draft, Utc::now());

        let row = sqlx::query_as::<_, TaskRow>(INSERT_TASK)
            .bind(task.id)
            .bind(task.user_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(task.priority.as_str())
            .bind(task.due_date)
            .bind(task.tags.as_slice())
            .bind(task.ai_suggested)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(pool)
            .await?;

        Task::try_from(row)
    }

    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>, DatabaseError> {
        let pool = self.manager.pool().await?;
        let rows = QueryBuilder::<TaskRow>::new(task_filter(owner, query)?)
            .select_all(pool)
            .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn get_task(&self, owner: Uuid, id: Uuid) -> Result<Task, DatabaseError> {
        let pool = self.manager.pool().await?;
        QueryBuilder::<TaskRow>::new(task_by_id_filter(owner, id)?)
            .select_optional(pool)
            .await?
            .ok_or_else(|| task_not_found(id))
            .and_then(Task::try_from)
    }

    async fn update_task(&self, owner: Uuid, id: Uuid, draft: TaskDraft) -> Result<Task, DatabaseError> {
        let pool = self.manager.pool().await?;
        let where_sql = task_by_id_filter(owner, id)?.to_where_sql(UPDATE_SET_PARAMS)?;
        let sql = format!("{} WHERE {} RETURNING *", UPDATE_TASK_SET, where_sql.query);
        debug!("update task sql: {}", sql);

        let mut q = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.status.as_str())
            .bind(draft.priority.as_str())
            .bind(draft.due_date)
            .bind(draft.tags.as_slice())
            .bind(Utc::now());
        for param in where_sql.params.iter() {
            q = bind_param_query_as(q, param);
        }

        q.fetch_optional(pool)
            .await?
            .ok_or_else(|| task_not_found(id))
            .and_then(Task::try_from)
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let pool = self.manager.pool().await?;
        let where_sql = task_by_id_filter(owner, id)?.to_where_sql(0)?;
        let sql = format!(r#"DELETE FROM "tasks" WHERE {}"#, where_sql.query);

        let mut q = sqlx::query(&sql);
        for param in where_sql.params.iter() {
            q = bind_param_query(q, param);
        }

        if q.execute(pool).await?.rows_affected() == 0 {
            return Err(task_not_found(id));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.manager.health_check().await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let pool = self.manager.pool().await?;
        let user = User::from_new(new_user, Utc::now());

        sqlx::query_as::<_, User>(INSERT_USER)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DatabaseError::Conflict(format!("email {} already registered", user.email))
                }
                other => DatabaseError::Sqlx(other),
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let pool = self.manager.pool().await?;
        QueryBuilder::<User>::new(user_by_email_filter(email)?)
            .select_optional(pool)
            .await
    }
}

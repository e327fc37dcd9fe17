pub mod task;
pub mod user;

pub use task::{Task, TaskDraft, TaskPriority, TaskQuery, TaskRow, TaskStatus, TASKS_TABLE};
pub use user::{NewUser, User, USERS_TABLE};

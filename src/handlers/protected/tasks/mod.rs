pub mod record;
pub mod schema;

use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::error::ApiError;

// Re-export handler functions for use in routing
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;
pub use schema::get as schema_get;
pub use schema::post as schema_post;

/// Ids that are not UUIDs can never match a task, so they are "not found".
pub(crate) fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::task_not_found())
}

/// Store misses become the shared task 404; everything else maps as usual.
pub(crate) fn task_error(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::NotFound(_) => ApiError::task_not_found(),
        other => other.into(),
    }
}

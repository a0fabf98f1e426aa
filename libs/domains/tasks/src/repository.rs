use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TaskResult;
use crate::models::{Location, NewLocation, Task, TaskFilter, TaskInput};

/// Repository trait for Task persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task; timestamps are set by the store
    async fn create(&self, input: TaskInput) -> TaskResult<Task>;

    /// Get a task by ID, trashed or not, with its location
    async fn get_by_id(&self, id: i32) -> TaskResult<Option<Task>>;

    /// Persist every mutable field of `task` and refresh `updated_at`
    async fn save(&self, task: Task) -> TaskResult<Task>;

    /// Remove the row; false when nothing matched
    async fn delete(&self, id: i32) -> TaskResult<bool>;

    /// List tasks matching the filter, in the filter's order
    async fn list(&self, filter: TaskFilter) -> TaskResult<Vec<Task>>;

    /// Count tasks matching the filter; sort and limit are ignored
    async fn count(&self, filter: TaskFilter) -> TaskResult<u64>;

    /// `updated_at` of completed, active tasks changed at or after `since`
    async fn completed_since(&self, since: DateTime<Utc>) -> TaskResult<Vec<DateTime<Utc>>>;
}

/// Repository trait for Location persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, input: NewLocation) -> TaskResult<Location>;

    async fn get_by_id(&self, id: i32) -> TaskResult<Option<Location>>;

    /// Exact, case-sensitive match; the oldest wins when names repeat
    async fn find_by_name(&self, name: &str) -> TaskResult<Option<Location>>;

    /// All locations, by name
    async fn list(&self) -> TaskResult<Vec<Location>>;
}

use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::{TaskError, TaskResult};
use crate::sla::SlaStatus;

/// Task priority levels
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TaskPriority {
    #[sea_orm(string_value = "High")]
    High,
    #[sea_orm(string_value = "Medium")]
    Medium,
    /// Default priority
    #[default]
    #[sea_orm(string_value = "Low")]
    Low,
}

/// Task category
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TaskCategory {
    #[default]
    #[sea_orm(string_value = "Personal")]
    Personal,
    #[sea_orm(string_value = "Work")]
    Work,
    #[sea_orm(string_value = "School")]
    School,
    #[sea_orm(string_value = "Urgent")]
    Urgent,
}

/// A place a task happens at. Names are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub description: String,
}

/// Input for creating a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub name: String,
    pub address: String,
    pub description: String,
}

/// Task entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub location: Option<Location>,
    pub is_completed: bool,
    /// In the trash when true
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every save
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Move to the trash. Completion is left alone.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Bring back from the trash. Idempotent.
    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    pub fn toggle_complete(&mut self) {
        self.is_completed = !self.is_completed;
    }

    /// Only trashed tasks may be destroyed; an active task is "not found"
    /// from the point of view of permanent deletion.
    pub fn ensure_in_trash(&self) -> TaskResult<()> {
        if self.is_deleted {
            Ok(())
        } else {
            Err(TaskError::NotFound(self.id))
        }
    }

    pub fn sla_status(&self, now: DateTime<Utc>) -> SlaStatus {
        SlaStatus::compute(self.is_completed, self.due_date, now)
    }

    /// Overwrite the editable fields with submitted values.
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.due_date = input.due_date;
        self.priority = input.priority;
        self.category = input.category;
        self.location = input.location;
    }
}

/// Validated data for a new task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub location: Option<Location>,
}

/// Ordering for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskSort {
    /// Most recently created first
    #[default]
    Newest,
    /// Soonest due first, missing due dates last
    Urgency,
    /// Most recently changed first
    Updated,
}

impl TaskSort {
    /// Unknown or missing values fall back to [`TaskSort::Newest`].
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("urgency") => TaskSort::Urgency,
            Some("updated") => TaskSort::Updated,
            _ => TaskSort::Newest,
        }
    }
}

/// Completion filter for the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    /// Unknown or missing values fall back to [`StatusFilter::All`].
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("completed") => StatusFilter::Completed,
            Some("pending") => StatusFilter::Pending,
            _ => StatusFilter::All,
        }
    }

    pub fn is_completed(self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Completed => Some(true),
            StatusFilter::Pending => Some(false),
        }
    }

    pub fn page_title(self) -> &'static str {
        match self {
            StatusFilter::All => "All Tasks",
            StatusFilter::Completed => "Completed Tasks",
            StatusFilter::Pending => "In Progress Tasks",
        }
    }
}

/// Query filters for listing and counting tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskFilter {
    pub is_deleted: bool,
    pub is_completed: Option<bool>,
    pub sort: TaskSort,
    pub limit: Option<u64>,
}

impl TaskFilter {
    /// Tasks not in the trash
    pub fn active() -> Self {
        Self::default()
    }

    /// Tasks in the trash
    pub fn trash() -> Self {
        Self {
            is_deleted: true,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.is_completed = status.is_completed();
        self
    }

    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }

    pub fn sorted(mut self, sort: TaskSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

//! Tasks Domain
//!
//! Personal task tracking: tasks with due dates, priorities, categories and
//! optional locations, a soft-delete trash, and a dashboard with a rolling
//! completion chart.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← Routes, form extraction, redirects
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Lifecycle rules, form validation, page shaping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (traits + SeaORM implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, filters, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{SqlLocationRepository, SqlTaskRepository, TaskService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let service = TaskService::new(
//!     SqlTaskRepository::new(db.clone()),
//!     SqlLocationRepository::new(db),
//! );
//! let router = domain_tasks::handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod dashboard;
pub mod entity;
pub mod error;
pub mod form;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod sla;
pub mod store;

// Re-export commonly used types
pub use dashboard::{DashboardPage, TaskFormPage, TaskListPage, TaskView, TrashPage};
pub use error::{TaskError, TaskResult};
pub use form::{FormErrors, TaskForm};
pub use handlers::ApiDoc;
pub use models::{
    Location, NewLocation, StatusFilter, Task, TaskCategory, TaskFilter, TaskInput,
    TaskPriority, TaskSort,
};
pub use repository::{LocationRepository, TaskRepository};
pub use service::TaskService;
pub use sla::SlaStatus;
pub use store::{SqlLocationRepository, SqlTaskRepository};

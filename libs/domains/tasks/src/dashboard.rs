//! Page view models and the dashboard completion histogram.

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::form::{FormErrors, TaskForm};
use crate::models::{Location, StatusFilter, Task, TaskSort};
use crate::sla::SlaStatus;

/// Days covered by the completion chart, today included
pub const HISTOGRAM_DAYS: u64 = 7;

/// Tasks shown in the dashboard's recent list
pub const RECENT_TASKS: u64 = 5;

/// A task as listed on a page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub sla_status: SlaStatus,
}

impl TaskView {
    pub fn new(task: Task, now: DateTime<Utc>) -> Self {
        let sla_status = task.sla_status(now);
        Self { task, sla_status }
    }

    pub fn list(tasks: Vec<Task>, now: DateTime<Utc>) -> Vec<Self> {
        tasks.into_iter().map(|task| Self::new(task, now)).collect()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardPage {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    pub recent_tasks: Vec<TaskView>,
    /// Short weekday names, oldest day first
    pub chart_labels: Vec<String>,
    /// Completions per day, aligned with `chart_labels`
    pub chart_data: Vec<u64>,
    pub current_sort: TaskSort,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskListPage {
    pub tasks: Vec<TaskView>,
    pub page_title: String,
    pub current_status: StatusFilter,
    pub current_sort: TaskSort,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrashPage {
    pub tasks: Vec<TaskView>,
}

/// Create or edit form, with any errors from the last submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskFormPage {
    pub page_title: String,
    pub page_subtitle: String,
    pub btn_text: String,
    pub form: TaskForm,
    pub errors: FormErrors,
    /// Choices for the location dropdown
    pub locations: Vec<Location>,
}

impl TaskFormPage {
    pub fn create(form: TaskForm, errors: FormErrors, locations: Vec<Location>) -> Self {
        Self {
            page_title: "New Task".to_string(),
            page_subtitle: "What do you need to get done?".to_string(),
            btn_text: "Create Task".to_string(),
            form,
            errors,
            locations,
        }
    }

    pub fn edit(form: TaskForm, errors: FormErrors, locations: Vec<Location>) -> Self {
        Self {
            page_title: "Edit Task".to_string(),
            page_subtitle: "Update your plans.".to_string(),
            btn_text: "Save Changes".to_string(),
            form,
            errors,
            locations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

/// First instant of the oldest histogram day, in `now`'s time zone.
///
/// Falls back to a plain seven-day window when local midnight does not exist.
pub fn histogram_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    now.date_naive()
        .checked_sub_days(Days::new(HISTOGRAM_DAYS - 1))
        .and_then(|day| {
            now.timezone()
                .from_local_datetime(&day.and_time(NaiveTime::MIN))
                .earliest()
        })
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc) - chrono::Duration::days(HISTOGRAM_DAYS as i64))
}

/// Count completion timestamps per local calendar day for the seven days
/// ending on `now`'s date, oldest first. Timestamps outside the window are
/// ignored.
pub fn completion_histogram<Tz: TimeZone>(completed: &[DateTime<Utc>], now: &DateTime<Tz>) -> Histogram {
    let tz = now.timezone();
    let today = now.date_naive();
    let days: Vec<_> = (0..HISTOGRAM_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect();

    let mut data = vec![0u64; days.len()];
    for stamp in completed {
        let day = stamp.with_timezone(&tz).date_naive();
        if let Some(index) = days.iter().position(|d| *d == day) {
            data[index] += 1;
        }
    }

    Histogram {
        labels: days.iter().map(|d| d.format("%a").to_string()).collect(),
        data,
    }
}

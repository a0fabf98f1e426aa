//! Service-level status of a task relative to its due date.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

/// Derived urgency label; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum SlaStatus {
    /// Completed, regardless of due date
    Done,
    /// Past due
    Late,
    /// Due within 24 hours
    Urgent,
    /// Due within 3 days
    Warning,
    Safe,
}

impl SlaStatus {
    /// First matching rule wins. All bounds are exclusive.
    pub fn compute(is_completed: bool, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if is_completed {
            SlaStatus::Done
        } else if due_date < now {
            SlaStatus::Late
        } else if due_date < now + Duration::hours(24) {
            SlaStatus::Urgent
        } else if due_date < now + Duration::days(3) {
            SlaStatus::Warning
        } else {
            SlaStatus::Safe
        }
    }
}

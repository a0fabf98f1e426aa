//! Task form: raw submitted values, field validation and cleaning.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{NewLocation, Task, TaskCategory, TaskPriority};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATETIME: &str = "Enter a valid date/time.";
pub const INVALID_LOCATION: &str =
    "Select a valid choice. That choice is not one of the available choices.";

const TITLE_MAX: usize = 200;
const LOCATION_NAME_MAX: usize = 100;
const LOCATION_ADDRESS_MAX: usize = 255;

/// Naive formats accepted for `due_date`, as sent by `datetime-local` inputs
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Submitted task form. Every field is the raw string the browser posted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct TaskForm {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DDTHH:MM[:SS]` in server local time, or RFC 3339
    #[validate(custom(function = "validate_due_date"))]
    pub due_date: String,
    /// High, Medium or Low; empty means Low
    #[validate(custom(function = "validate_priority"))]
    pub priority: String,
    /// Personal, Work, School or Urgent; empty means Personal
    #[validate(custom(function = "validate_category"))]
    pub category: String,
    /// Id of an existing location, or empty
    #[validate(custom(function = "validate_location"))]
    pub location: String,
    /// Reused when a location with this exact name exists, created otherwise
    #[validate(custom(function = "validate_location_name"))]
    pub new_location_name: String,
    #[validate(custom(function = "validate_location_address"))]
    pub new_location_address: String,
}

/// Field name to error messages, keyed in alphabetical order. Serializes as a plain map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "errors in {}", fields.join(", "))
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .clone()
                    .unwrap_or_else(|| error.code.clone());
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

/// Form values after validation, before location resolution
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    /// Dropdown selection; existence is checked by the service
    pub location_id: Option<i32>,
    pub new_location: Option<NewLocation>,
}

impl TaskForm {
    /// Prefill from an existing task, rendering the due date in `tz`.
    pub fn from_task<Tz: TimeZone>(task: &Task, tz: &Tz) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task
                .due_date
                .with_timezone(tz)
                .format("%Y-%m-%dT%H:%M")
                .to_string(),
            priority: task.priority.to_string(),
            category: task.category.to_string(),
            location: task
                .location
                .as_ref()
                .map(|l| l.id.to_string())
                .unwrap_or_default(),
            new_location_name: String::new(),
            new_location_address: String::new(),
        }
    }

    /// The dropdown id, when the field holds one.
    pub fn location_id(&self) -> Option<i32> {
        self.location.trim().parse().ok()
    }

    /// Validate every field and normalize values.
    ///
    /// Naive due dates are read as wall-clock time in `tz`. A wall-clock time
    /// that `tz` skips is rejected; a repeated one resolves to the earlier
    /// instant.
    pub fn clean<Tz: TimeZone>(&self, tz: &Tz) -> Result<CleanedTask, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        let due_date = if errors.get("due_date").is_some() {
            None
        } else {
            let resolved = resolve_due_date(self.due_date.trim(), tz);
            if resolved.is_none() {
                errors.add(
                    "due_date",
                    format!(
                        "{} couldn't be interpreted in the server time zone; it may be ambiguous or it may not exist.",
                        self.due_date.trim()
                    ),
                );
            }
            resolved
        };

        let due_date = match due_date {
            Some(due_date) if errors.is_empty() => due_date,
            _ => return Err(errors),
        };

        let new_location_name = self.new_location_name.trim();
        let new_location = (!new_location_name.is_empty()).then(|| NewLocation {
            name: new_location_name.to_string(),
            address: self.new_location_address.trim().to_string(),
            description: String::new(),
        });

        Ok(CleanedTask {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            due_date,
            priority: parse_choice(&self.priority).unwrap_or_default(),
            category: parse_choice(&self.category).unwrap_or_default(),
            location_id: self.location_id(),
            new_location,
        })
    }
}

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(error("required", REQUIRED));
    }
    check_max_length(title, TITLE_MAX)
}

fn validate_location_name(name: &str) -> Result<(), ValidationError> {
    check_max_length(name.trim(), LOCATION_NAME_MAX)
}

fn validate_location_address(address: &str) -> Result<(), ValidationError> {
    check_max_length(address.trim(), LOCATION_ADDRESS_MAX)
}

/// Counts characters, not bytes.
fn check_max_length(value: &str, max: usize) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length > max {
        return Err(error(
            "max_length",
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, length
            ),
        ));
    }
    Ok(())
}

fn validate_due_date(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(error("required", REQUIRED));
    }
    if parse_naive(value).is_none() && DateTime::parse_from_rfc3339(value).is_err() {
        return Err(error("invalid", INVALID_DATETIME));
    }
    Ok(())
}

fn validate_priority(value: &str) -> Result<(), ValidationError> {
    validate_choice::<TaskPriority>(value)
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    validate_choice::<TaskCategory>(value)
}

fn validate_choice<T: FromStr>(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_choice::<T>(value).is_some() {
        Ok(())
    } else {
        Err(error(
            "invalid_choice",
            format!(
                "Select a valid choice. {} is not one of the available choices.",
                value.trim()
            ),
        ))
    }
}

fn validate_location(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.parse::<i32>().is_ok() {
        Ok(())
    } else {
        Err(error("invalid_choice", INVALID_LOCATION))
    }
}

fn parse_choice<T: FromStr>(value: &str) -> Option<T> {
    T::from_str(value.trim()).ok()
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn resolve_due_date<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    if let Some(naive) = parse_naive(value) {
        return tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc));
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn form() -> TaskForm {
        TaskForm {
            title: "  Write report ".to_string(),
            due_date: "2025-03-14T09:30".to_string(),
            ..TaskForm::default()
        }
    }

    #[test]
    fn test_clean_applies_defaults_and_trims() {
        let cleaned = form().clean(&Utc).unwrap();
        assert_eq!(cleaned.title, "Write report");
        assert_eq!(cleaned.description, "");
        assert_eq!(cleaned.priority, TaskPriority::Low);
        assert_eq!(cleaned.category, TaskCategory::Personal);
        assert_eq!(cleaned.location_id, None);
        assert_eq!(cleaned.new_location, None);
        assert_eq!(
            cleaned.due_date,
            Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_naive_due_date_is_local_to_timezone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let cleaned = form().clean(&tz).unwrap();
        assert_eq!(
            cleaned.due_date,
            Utc.with_ymd_and_hms(2025, 3, 14, 7, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_due_date_formats() {
        for value in [
            "2025-03-14T09:30:15",
            "2025-03-14 09:30",
            "2025-03-14T09:30:00+00:00",
            "2025-03-14T09:30:00Z",
        ] {
            let mut form = form();
            form.due_date = value.to_string();
            assert!(form.clean(&Utc).is_ok(), "{value} should parse");
        }
    }

    #[test]
    fn test_required_fields() {
        let errors = TaskForm::default().clean(&Utc).unwrap_err();
        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("due_date"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_whitespace_title_is_required() {
        let mut form = form();
        form.title = "   ".to_string();
        let errors = form.clean(&Utc).unwrap_err();
        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_title_length_limit() {
        let mut form = form();
        form.title = "x".repeat(200);
        assert!(form.clean(&Utc).is_ok());

        form.title = "x".repeat(201);
        let errors = form.clean(&Utc).unwrap_err();
        assert!(errors.get("title").unwrap()[0].contains("at most 200"));
    }

    #[test]
    fn test_invalid_choices_and_dates() {
        let mut form = form();
        form.priority = "Critical".to_string();
        form.category = "work".to_string();
        form.location = "library".to_string();
        form.due_date = "next tuesday".to_string();

        let errors = form.clean(&Utc).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["category", "due_date", "location", "priority"]);
        assert_eq!(errors.get("due_date"), Some(&[INVALID_DATETIME.to_string()][..]));
        assert_eq!(errors.get("location"), Some(&[INVALID_LOCATION.to_string()][..]));
    }

    #[test]
    fn test_new_location_fields() {
        let mut form = form();
        form.priority = "High".to_string();
        form.location = "3".to_string();
        form.new_location_name = " Library ".to_string();
        form.new_location_address = "1 Main St".to_string();

        let cleaned = form.clean(&Utc).unwrap();
        assert_eq!(cleaned.priority, TaskPriority::High);
        assert_eq!(cleaned.location_id, Some(3));
        let location = cleaned.new_location.unwrap();
        assert_eq!(location.name, "Library");
        assert_eq!(location.address, "1 Main St");

        let mut form = self::form();
        form.new_location_name = "n".repeat(101);
        let errors = form.clean(&Utc).unwrap_err();
        assert!(errors.get("new_location_name").is_some());
    }

    #[test]
    fn test_form_errors_serialize_keyed_by_field_name() {
        let mut errors = FormErrors::default();
        errors.add("title", REQUIRED);
        errors.add("due_date", REQUIRED);
        errors.add("category", "Select a valid choice.");

        let json = serde_json::to_string(&errors).unwrap();
        let category = json.find("\"category\"").unwrap();
        let due_date = json.find("\"due_date\"").unwrap();
        let title = json.find("\"title\"").unwrap();
        assert!(category < due_date && due_date < title, "{json}");
    }

    #[test]
    fn test_location_limits_apply_to_trimmed_values() {
        let mut form = form();
        form.new_location_name = format!("  {}  ", "n".repeat(100));
        form.new_location_address = format!(" {} ", "a".repeat(255));

        let location = form.clean(&Utc).unwrap().new_location.unwrap();
        assert_eq!(location.name.chars().count(), 100);
        assert_eq!(location.address.chars().count(), 255);

        let mut form = self::form();
        form.new_location_name = format!(" {} ", "n".repeat(101));
        form.new_location_address = "a".repeat(256);
        let errors = form.clean(&Utc).unwrap_err();
        assert_eq!(
            errors.get("new_location_name").unwrap(),
            ["Ensure this value has at most 100 characters (it has 101).".to_string()]
        );
        assert_eq!(
            errors.get("new_location_address").unwrap(),
            ["Ensure this value has at most 255 characters (it has 256).".to_string()]
        );
    }

    #[test]
    fn test_from_task_round_trips_through_clean() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let due = Utc.with_ymd_and_hms(2025, 6, 1, 18, 45, 0).unwrap();
        let task = Task {
            id: 9,
            title: "Dentist".to_string(),
            description: "Bring forms".to_string(),
            due_date: due,
            priority: TaskPriority::Medium,
            category: TaskCategory::Personal,
            location: None,
            is_completed: false,
            is_deleted: false,
            created_at: due,
            updated_at: due,
        };

        let form = TaskForm::from_task(&task, &tz);
        assert_eq!(form.due_date, "2025-06-01T13:45");
        assert_eq!(form.priority, "Medium");

        let cleaned = form.clean(&tz).unwrap();
        assert_eq!(cleaned.due_date, due);
        assert_eq!(cleaned.description, "Bring forms");
    }

    #[test]
    fn test_form_errors_serialize_as_map() {
        let mut errors = FormErrors::default();
        errors.add("title", REQUIRED);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"title": [REQUIRED]}));
    }
}

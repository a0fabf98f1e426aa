use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::instrument;

use crate::dashboard::{
    completion_histogram, histogram_start, DashboardPage, TaskFormPage, TaskListPage, TaskView,
    TrashPage, RECENT_TASKS,
};
use crate::error::{TaskError, TaskResult};
use crate::form::{FormErrors, TaskForm, INVALID_LOCATION};
use crate::models::{Location, NewLocation, StatusFilter, Task, TaskFilter, TaskInput, TaskSort};
use crate::repository::{LocationRepository, TaskRepository};

/// Service layer for task and location business logic
pub struct TaskService<T: TaskRepository, L: LocationRepository> {
    tasks: Arc<T>,
    locations: Arc<L>,
}

impl<T: TaskRepository, L: LocationRepository> TaskService<T, L> {
    pub fn new(tasks: T, locations: L) -> Self {
        Self {
            tasks: Arc::new(tasks),
            locations: Arc::new(locations),
        }
    }

    /// Counts, recent tasks and the completion chart for active tasks
    #[instrument(skip(self, now))]
    pub async fn dashboard<Tz: TimeZone>(
        &self,
        sort: TaskSort,
        now: &DateTime<Tz>,
    ) -> TaskResult<DashboardPage> {
        let total_tasks = self.tasks.count(TaskFilter::active()).await?;
        let completed_tasks = self.tasks.count(TaskFilter::active().completed(true)).await?;
        let recent = self
            .tasks
            .list(TaskFilter::active().sorted(sort).limit(RECENT_TASKS))
            .await?;
        let completed = self.tasks.completed_since(histogram_start(now)).await?;
        let histogram = completion_histogram(&completed, now);

        Ok(DashboardPage {
            total_tasks,
            completed_tasks,
            pending_tasks: total_tasks.saturating_sub(completed_tasks),
            recent_tasks: TaskView::list(recent, now.with_timezone(&Utc)),
            chart_labels: histogram.labels,
            chart_data: histogram.data,
            current_sort: sort,
        })
    }

    #[instrument(skip(self, now))]
    pub async fn task_list(
        &self,
        status: StatusFilter,
        sort: TaskSort,
        now: DateTime<Utc>,
    ) -> TaskResult<TaskListPage> {
        let tasks = self
            .tasks
            .list(TaskFilter::active().with_status(status).sorted(sort))
            .await?;

        Ok(TaskListPage {
            tasks: TaskView::list(tasks, now),
            page_title: status.page_title().to_string(),
            current_status: status,
            current_sort: sort,
        })
    }

    #[instrument(skip(self, now))]
    pub async fn trash(&self, now: DateTime<Utc>) -> TaskResult<TrashPage> {
        let tasks = self.tasks.list(TaskFilter::trash()).await?;
        Ok(TrashPage {
            tasks: TaskView::list(tasks, now),
        })
    }

    /// Get a task by ID, trashed or not
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: i32) -> TaskResult<Task> {
        self.tasks
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// Create page, optionally carrying a rejected submission
    pub async fn create_page(&self, form: TaskForm, errors: FormErrors) -> TaskResult<TaskFormPage> {
        let locations = self.locations.list().await?;
        Ok(TaskFormPage::create(form, errors, locations))
    }

    /// Edit page for a rejected submission
    pub async fn edit_page(&self, form: TaskForm, errors: FormErrors) -> TaskResult<TaskFormPage> {
        let locations = self.locations.list().await?;
        Ok(TaskFormPage::edit(form, errors, locations))
    }

    /// Edit page prefilled from the stored task
    #[instrument(skip(self, tz), fields(task_id = %id))]
    pub async fn edit_page_for<Tz: TimeZone>(&self, id: i32, tz: &Tz) -> TaskResult<TaskFormPage>
    where
        Tz::Offset: Display,
    {
        let task = self.get_task(id).await?;
        self.edit_page(TaskForm::from_task(&task, tz), FormErrors::default())
            .await
    }

    /// Validate the form and insert a new task
    #[instrument(skip(self, form, tz), fields(task_title = %form.title))]
    pub async fn create_task<Tz: TimeZone>(&self, form: &TaskForm, tz: &Tz) -> TaskResult<Task> {
        let input = self.validate_form(form, tz).await?;
        self.tasks.create(input).await
    }

    /// Validate the form and update the task in place
    #[instrument(skip(self, form, tz), fields(task_id = %id))]
    pub async fn update_task<Tz: TimeZone>(
        &self,
        id: i32,
        form: &TaskForm,
        tz: &Tz,
    ) -> TaskResult<Task> {
        let mut task = self.get_task(id).await?;
        let input = self.validate_form(form, tz).await?;
        task.apply(input);
        self.tasks.save(task).await
    }

    /// Move a task to the trash
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn soft_delete(&self, id: i32) -> TaskResult<Task> {
        let mut task = self.get_task(id).await?;
        task.soft_delete();
        self.tasks.save(task).await
    }

    /// Bring a task back from the trash
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn restore(&self, id: i32) -> TaskResult<Task> {
        let mut task = self.get_task(id).await?;
        task.restore();
        self.tasks.save(task).await
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn toggle_complete(&self, id: i32) -> TaskResult<Task> {
        let mut task = self.get_task(id).await?;
        task.toggle_complete();
        self.tasks.save(task).await
    }

    /// Destroy a trashed task. Active tasks are left untouched.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn permanently_delete(&self, id: i32) -> TaskResult<()> {
        let task = self.get_task(id).await?;
        task.ensure_in_trash()?;

        if !self.tasks.delete(id).await? {
            return Err(TaskError::NotFound(id));
        }

        Ok(())
    }

    /// Reuse the oldest location with this exact name, or create it
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn get_or_create_location(&self, input: NewLocation) -> TaskResult<Location> {
        if let Some(existing) = self.locations.find_by_name(&input.name).await? {
            tracing::debug!(location_id = existing.id, "Reusing location");
            return Ok(existing);
        }
        self.locations.create(input).await
    }

    /// Run every check, then resolve the location. Nothing is written
    /// unless the whole form is valid.
    async fn validate_form<Tz: TimeZone>(&self, form: &TaskForm, tz: &Tz) -> TaskResult<TaskInput> {
        let cleaned = form.clean(tz);

        let selected = match form.location_id() {
            Some(id) => self.locations.get_by_id(id).await?,
            None => None,
        };
        let unknown_location = form.location_id().is_some() && selected.is_none();

        let cleaned = match cleaned {
            Ok(cleaned) if !unknown_location => cleaned,
            Ok(_) => {
                let mut errors = FormErrors::default();
                errors.add("location", INVALID_LOCATION);
                return Err(TaskError::Validation(errors));
            }
            Err(mut errors) => {
                if unknown_location && errors.get("location").is_none() {
                    errors.add("location", INVALID_LOCATION);
                }
                return Err(TaskError::Validation(errors));
            }
        };

        let location = match cleaned.new_location {
            Some(new_location) => Some(self.get_or_create_location(new_location).await?),
            None => selected,
        };

        Ok(TaskInput {
            title: cleaned.title,
            description: cleaned.description,
            due_date: cleaned.due_date,
            priority: cleaned.priority,
            category: cleaned.category,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::REQUIRED;
    use crate::models::{TaskCategory, TaskPriority};
    use crate::repository::{MockLocationRepository, MockTaskRepository};
    use chrono::Duration;

    fn task(id: i32) -> Task {
        let now = Utc::now();
        Task {
            id,
            title: format!("Task {id}"),
            description: String::new(),
            due_date: now + Duration::days(10),
            priority: TaskPriority::Low,
            category: TaskCategory::Personal,
            location: None,
            is_completed: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn library(id: i32) -> Location {
        Location {
            id,
            name: "Library".to_string(),
            address: "1 Main St".to_string(),
            description: String::new(),
        }
    }

    fn valid_form() -> TaskForm {
        TaskForm {
            title: "Return books".to_string(),
            due_date: "2025-05-01T10:00".to_string(),
            ..TaskForm::default()
        }
    }

    fn echo_create(tasks: &mut MockTaskRepository) {
        tasks.expect_create().returning(|input| {
            let mut created = task(1);
            created.title = input.title;
            created.location = input.location;
            Ok(created)
        });
    }

    #[tokio::test]
    async fn test_dashboard_counts_and_pending() {
        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_count()
            .withf(|filter| filter.is_completed.is_none())
            .returning(|_| Ok(5));
        tasks
            .expect_count()
            .withf(|filter| filter.is_completed == Some(true))
            .returning(|_| Ok(2));
        tasks
            .expect_list()
            .withf(|filter| {
                !filter.is_deleted
                    && filter.sort == TaskSort::Urgency
                    && filter.limit == Some(RECENT_TASKS)
            })
            .returning(|_| Ok(vec![task(1), task(2)]));
        tasks
            .expect_completed_since()
            .returning(|_| Ok(vec![Utc::now()]));

        let service = TaskService::new(tasks, MockLocationRepository::new());
        let page = service
            .dashboard(TaskSort::Urgency, &Utc::now())
            .await
            .unwrap();

        assert_eq!(page.total_tasks, 5);
        assert_eq!(page.completed_tasks, 2);
        assert_eq!(page.pending_tasks, 3);
        assert_eq!(page.recent_tasks.len(), 2);
        assert_eq!(page.chart_data.len(), 7);
        assert_eq!(*page.chart_data.last().unwrap(), 1);
        assert_eq!(page.current_sort, TaskSort::Urgency);
    }

    #[tokio::test]
    async fn test_task_list_applies_status_filter() {
        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_list()
            .withf(|filter| {
                !filter.is_deleted && filter.is_completed == Some(false) && filter.limit.is_none()
            })
            .returning(|_| Ok(vec![task(3)]));

        let service = TaskService::new(tasks, MockLocationRepository::new());
        let page = service
            .task_list(StatusFilter::Pending, TaskSort::Newest, Utc::now())
            .await
            .unwrap();

        assert_eq!(page.page_title, "In Progress Tasks");
        assert_eq!(page.tasks.len(), 1);
        assert_eq!(page.current_status, StatusFilter::Pending);
    }

    #[tokio::test]
    async fn test_get_task_not_found() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|_| Ok(None));

        let service = TaskService::new(tasks, MockLocationRepository::new());
        let result = service.get_task(42).await;

        assert!(matches!(result, Err(TaskError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_soft_delete_saves_trashed_task() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|id| Ok(Some(task(id))));
        tasks
            .expect_save()
            .withf(|task| task.is_deleted && !task.is_completed)
            .times(1)
            .returning(Ok);

        let service = TaskService::new(tasks, MockLocationRepository::new());
        let trashed = service.soft_delete(7).await.unwrap();

        assert!(trashed.is_deleted);
    }

    #[tokio::test]
    async fn test_permanent_delete_of_active_task_is_not_found() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|id| Ok(Some(task(id))));
        tasks.expect_delete().times(0);

        let service = TaskService::new(tasks, MockLocationRepository::new());
        let result = service.permanently_delete(7).await;

        assert!(matches!(result, Err(TaskError::NotFound(7))));
    }

    #[tokio::test]
    async fn test_permanent_delete_of_trashed_task() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|id| {
            let mut trashed = task(id);
            trashed.soft_delete();
            Ok(Some(trashed))
        });
        tasks.expect_delete().times(1).returning(|_| Ok(true));

        let service = TaskService::new(tasks, MockLocationRepository::new());
        assert!(service.permanently_delete(7).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_task_reuses_location_by_name() {
        let mut tasks = MockTaskRepository::new();
        echo_create(&mut tasks);
        let mut locations = MockLocationRepository::new();
        locations
            .expect_find_by_name()
            .withf(|name| name == "Library")
            .returning(|_| Ok(Some(library(4))));
        locations.expect_create().times(0);

        let mut form = valid_form();
        form.new_location_name = "Library".to_string();
        form.new_location_address = "ignored".to_string();

        let service = TaskService::new(tasks, locations);
        let created = service.create_task(&form, &Utc).await.unwrap();

        assert_eq!(created.location, Some(library(4)));
    }

    #[tokio::test]
    async fn test_create_task_creates_missing_location() {
        let mut tasks = MockTaskRepository::new();
        echo_create(&mut tasks);
        let mut locations = MockLocationRepository::new();
        locations.expect_find_by_name().returning(|_| Ok(None));
        locations
            .expect_create()
            .withf(|input| input.name == "Library" && input.address == "1 Main St")
            .times(1)
            .returning(|_| Ok(library(9)));

        let mut form = valid_form();
        form.new_location_name = "Library".to_string();
        form.new_location_address = "1 Main St".to_string();

        let service = TaskService::new(tasks, locations);
        let created = service.create_task(&form, &Utc).await.unwrap();

        assert_eq!(created.location.map(|l| l.id), Some(9));
    }

    #[tokio::test]
    async fn test_new_location_overrides_dropdown() {
        let mut tasks = MockTaskRepository::new();
        echo_create(&mut tasks);
        let mut locations = MockLocationRepository::new();
        locations.expect_get_by_id().returning(|id| {
            Ok(Some(Location {
                name: "Office".to_string(),
                ..library(id)
            }))
        });
        locations
            .expect_find_by_name()
            .returning(|_| Ok(Some(library(4))));

        let mut form = valid_form();
        form.location = "2".to_string();
        form.new_location_name = "Library".to_string();

        let service = TaskService::new(tasks, locations);
        let created = service.create_task(&form, &Utc).await.unwrap();

        assert_eq!(created.location, Some(library(4)));
    }

    #[tokio::test]
    async fn test_unknown_dropdown_location_writes_nothing() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_create().times(0);
        let mut locations = MockLocationRepository::new();
        locations.expect_get_by_id().returning(|_| Ok(None));
        locations.expect_create().times(0);

        let mut form = valid_form();
        form.location = "99".to_string();
        form.new_location_name = "Gym".to_string();

        let service = TaskService::new(tasks, locations);
        let result = service.create_task(&form, &Utc).await;

        match result {
            Err(TaskError::Validation(errors)) => {
                assert_eq!(errors.get("location"), Some(&[INVALID_LOCATION.to_string()][..]));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_field_and_location_errors_are_reported_together() {
        let mut locations = MockLocationRepository::new();
        locations.expect_get_by_id().returning(|_| Ok(None));

        let form = TaskForm {
            location: "99".to_string(),
            ..TaskForm::default()
        };

        let service = TaskService::new(MockTaskRepository::new(), locations);
        let Err(TaskError::Validation(errors)) = service.create_task(&form, &Utc).await else {
            panic!("expected validation error");
        };

        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert!(errors.get("due_date").is_some());
        assert!(errors.get("location").is_some());
    }

    #[tokio::test]
    async fn test_update_missing_task_is_not_found_before_validation() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|_| Ok(None));
        tasks.expect_save().times(0);

        let service = TaskService::new(tasks, MockLocationRepository::new());
        let result = service.update_task(5, &TaskForm::default(), &Utc).await;

        assert!(matches!(result, Err(TaskError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_update_task_keeps_flags() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|id| {
            let mut done = task(id);
            done.is_completed = true;
            Ok(Some(done))
        });
        tasks.expect_save().times(1).returning(Ok);

        let mut form = valid_form();
        form.priority = "High".to_string();

        let service = TaskService::new(tasks, MockLocationRepository::new());
        let updated = service.update_task(5, &form, &Utc).await.unwrap();

        assert_eq!(updated.title, "Return books");
        assert_eq!(updated.priority, TaskPriority::High);
        assert!(updated.is_completed);
        assert_eq!(updated.location, None);
    }

    #[tokio::test]
    async fn test_edit_page_prefills_form() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|id| {
            let mut stored = task(id);
            stored.location = Some(library(4));
            Ok(Some(stored))
        });
        let mut locations = MockLocationRepository::new();
        locations
            .expect_list()
            .returning(|| Ok(vec![library(4)]));

        let service = TaskService::new(tasks, locations);
        let page = service.edit_page_for(3, &Utc).await.unwrap();

        assert_eq!(page.page_title, "Edit Task");
        assert_eq!(page.form.title, "Task 3");
        assert_eq!(page.form.location, "4");
        assert!(page.errors.is_empty());
        assert_eq!(page.locations.len(), 1);
    }
}

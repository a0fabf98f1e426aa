use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use axum_helpers::{ErrorResponse, IdPath};
use chrono::{Local, Utc};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::dashboard::{DashboardPage, TaskFormPage, TaskListPage, TaskView, TrashPage};
use crate::error::{TaskError, TaskResult};
use crate::form::{FormErrors, TaskForm};
use crate::models::{
    Location, StatusFilter, Task, TaskCategory, TaskPriority, TaskSort,
};
use crate::repository::{LocationRepository, TaskRepository};
use crate::service::TaskService;
use crate::sla::SlaStatus;

const TAG: &str = "tasks";
const DASHBOARD: &str = "/";
const TRASH: &str = "/trash/";

/// OpenAPI documentation for the task pages
#[derive(OpenApi)]
#[openapi(
    paths(
        dashboard,
        create_form,
        create_task,
        edit_form,
        update_task,
        task_list,
        soft_delete,
        trash,
        restore,
        delete_forever,
        toggle_complete,
    ),
    components(schemas(
        DashboardPage,
        TaskListPage,
        TrashPage,
        TaskFormPage,
        TaskView,
        Task,
        Location,
        TaskForm,
        FormErrors,
        TaskPriority,
        TaskCategory,
        TaskSort,
        StatusFilter,
        SlaStatus,
        ErrorResponse,
    )),
    tags(
        (name = TAG, description = "Task tracking pages")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SortQuery {
    /// newest, urgency or updated; anything else means newest
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// all, completed or pending; anything else means all
    pub status: Option<String>,
    /// newest, urgency or updated; anything else means newest
    pub sort: Option<String>,
}

/// Create the task router with every page and action
pub fn router<T, L>(service: TaskService<T, L>) -> Router
where
    T: TaskRepository + 'static,
    L: LocationRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(dashboard))
        .route("/create/", get(create_form).post(create_task))
        .route("/update/{id}/", get(edit_form).post(update_task))
        .route("/tasks/", get(task_list))
        // GET is kept for old links
        .route("/delete/{id}/", get(soft_delete).post(soft_delete))
        .route("/trash/", get(trash))
        .route("/restore/{id}/", get(restore))
        .route("/delete-forever/{id}/", get(delete_forever))
        .route("/complete/{id}/", get(toggle_complete))
        .with_state(shared_service)
}

type Service<T, L> = State<Arc<TaskService<T, L>>>;

/// Counts, recent tasks and the 7-day completion chart
#[utoipa::path(
    get,
    path = "/",
    tag = TAG,
    params(SortQuery),
    responses(
        (status = 200, description = "Dashboard page", body = DashboardPage),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn dashboard<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    Query(query): Query<SortQuery>,
) -> TaskResult<Json<DashboardPage>> {
    let sort = TaskSort::parse(query.sort.as_deref());
    let page = service.dashboard(sort, &Local::now()).await?;
    Ok(Json(page))
}

/// Empty create form
#[utoipa::path(
    get,
    path = "/create/",
    tag = TAG,
    responses(
        (status = 200, description = "Create form", body = TaskFormPage)
    )
)]
async fn create_form<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
) -> TaskResult<Json<TaskFormPage>> {
    let page = service
        .create_page(TaskForm::default(), FormErrors::default())
        .await?;
    Ok(Json(page))
}

/// Submit a new task
#[utoipa::path(
    post,
    path = "/create/",
    tag = TAG,
    request_body(content = TaskForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created, redirects to the dashboard"),
        (status = 422, description = "Form re-rendered with errors", body = TaskFormPage)
    )
)]
async fn create_task<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    Form(form): Form<TaskForm>,
) -> TaskResult<Response> {
    match service.create_task(&form, &Local).await {
        Ok(_) => Ok(Redirect::to(DASHBOARD).into_response()),
        Err(TaskError::Validation(errors)) => {
            let page = service.create_page(form, errors).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Edit form prefilled from the stored task
#[utoipa::path(
    get,
    path = "/update/{id}/",
    tag = TAG,
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Edit form", body = TaskFormPage),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
async fn edit_form<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    IdPath(id): IdPath,
) -> TaskResult<Json<TaskFormPage>> {
    let page = service.edit_page_for(id, &Local).await?;
    Ok(Json(page))
}

/// Submit changes to a task
#[utoipa::path(
    post,
    path = "/update/{id}/",
    tag = TAG,
    params(("id" = i32, Path, description = "Task ID")),
    request_body(content = TaskForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Saved, redirects to the dashboard"),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Form re-rendered with errors", body = TaskFormPage)
    )
)]
async fn update_task<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    IdPath(id): IdPath,
    Form(form): Form<TaskForm>,
) -> TaskResult<Response> {
    match service.update_task(id, &form, &Local).await {
        Ok(_) => Ok(Redirect::to(DASHBOARD).into_response()),
        Err(TaskError::Validation(errors)) => {
            let page = service.edit_page(form, errors).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Active tasks, filtered by completion
#[utoipa::path(
    get,
    path = "/tasks/",
    tag = TAG,
    params(TaskListQuery),
    responses(
        (status = 200, description = "Task list page", body = TaskListPage)
    )
)]
async fn task_list<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    Query(query): Query<TaskListQuery>,
) -> TaskResult<Json<TaskListPage>> {
    let status = StatusFilter::parse(query.status.as_deref());
    let sort = TaskSort::parse(query.sort.as_deref());
    let page = service.task_list(status, sort, Utc::now()).await?;
    Ok(Json(page))
}

/// Move a task to the trash
#[utoipa::path(
    post,
    path = "/delete/{id}/",
    tag = TAG,
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 303, description = "Trashed, redirects to the dashboard"),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
async fn soft_delete<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    IdPath(id): IdPath,
) -> TaskResult<Redirect> {
    service.soft_delete(id).await?;
    Ok(Redirect::to(DASHBOARD))
}

/// Tasks in the trash, newest first
#[utoipa::path(
    get,
    path = "/trash/",
    tag = TAG,
    responses(
        (status = 200, description = "Trash page", body = TrashPage)
    )
)]
async fn trash<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
) -> TaskResult<Json<TrashPage>> {
    let page = service.trash(Utc::now()).await?;
    Ok(Json(page))
}

/// Bring a task back from the trash
#[utoipa::path(
    get,
    path = "/restore/{id}/",
    tag = TAG,
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 303, description = "Restored, redirects to the trash"),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
async fn restore<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    IdPath(id): IdPath,
) -> TaskResult<Redirect> {
    service.restore(id).await?;
    Ok(Redirect::to(TRASH))
}

/// Destroy a trashed task
#[utoipa::path(
    get,
    path = "/delete-forever/{id}/",
    tag = TAG,
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 303, description = "Deleted, redirects to the trash"),
        (status = 404, description = "Task not found or not in the trash", body = ErrorResponse)
    )
)]
async fn delete_forever<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    IdPath(id): IdPath,
) -> TaskResult<Redirect> {
    service.permanently_delete(id).await?;
    Ok(Redirect::to(TRASH))
}

/// Flip a task between done and not done
#[utoipa::path(
    get,
    path = "/complete/{id}/",
    tag = TAG,
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 303, description = "Toggled, redirects to the dashboard"),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
async fn toggle_complete<T: TaskRepository, L: LocationRepository>(
    State(service): Service<T, L>,
    IdPath(id): IdPath,
) -> TaskResult<Redirect> {
    service.toggle_complete(id).await?;
    Ok(Redirect::to(DASHBOARD))
}

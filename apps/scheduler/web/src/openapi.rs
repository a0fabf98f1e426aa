use axum_helpers::{ErrorResponse, HealthResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(ErrorResponse, HealthResponse)),
    info(
        title = "Scheduler",
        version = "0.1.0",
        description = "Personal task tracker: dashboard, task list, trash and task forms"
    )
)]
struct BaseDoc;

/// Application document: the base info plus every task page
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseDoc::openapi();
        doc.merge(domain_tasks::ApiDoc::openapi());
        doc
    }
}

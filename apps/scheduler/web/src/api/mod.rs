use axum::Router;
use domain_tasks::{SqlLocationRepository, SqlTaskRepository, TaskService};

pub mod health;

/// Creates the page routes, mounted at the root.
///
/// Returns a stateless Router (the task router has its service applied).
pub fn routes(state: &crate::state::AppState) -> Router {
    let service = TaskService::new(
        SqlTaskRepository::new(state.db.clone()),
        SqlLocationRepository::new(state.db.clone()),
    );

    domain_tasks::handlers::router(service)
}

/// Creates a router with the /ready endpoint that pings the database.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

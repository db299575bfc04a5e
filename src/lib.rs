//! Employee admin core.
//!
//! A record client for the employee-management REST API, the list engine and
//! mutation coordinator that back the admin views, and a SQLite-backed
//! reference server for the same API.

pub mod api;
pub mod config;
pub mod db;
pub mod directory;
pub mod engine;
pub mod errors;
pub mod models;
pub mod mutations;
pub mod service;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use db::Repository;

pub use config::Config;
pub use directory::{Directory, LoadStatus, ReloadOrdering};
pub use engine::{EngineSettings, ListEngine, PageBounds};
pub use errors::ServiceError;
pub use models::{Employee, EmployeeDraft, EmployeeId};
pub use mutations::{MutationCoordinator, MutationSettings, MutationState};
pub use service::{EmployeeService, HttpEmployeeService, API_PREFIX};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // The admin UI is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/get-all-employees", get(api::list_employees))
        .route("/get-employee/{id}", get(api::get_employee))
        .route("/create", post(api::create_employee))
        .route("/update-employee/{id}", put(api::update_employee))
        .route("/delete-employee/{id}", delete(api::delete_employee));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest(API_PREFIX, api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod testing;

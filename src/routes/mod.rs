//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the public marketing pages, the gated employee
//! area at `/employee` and its form endpoints, and a health probe. Every
//! page is rendered on the server; forms post back and follow the
//! Post/Redirect/Get pattern so a reload never resubmits.

pub mod auth;
pub mod pages;
pub mod portal;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/services", get(pages::services))
        .route("/expertise", get(pages::expertise))
        .route("/contact", get(pages::contact))
        .route("/employee", get(portal::employee_page))
        .route("/employee/login", post(auth::login))
        .route("/employee/logout", post(auth::logout))
        .route("/employee/leave-requests", post(portal::submit_leave_request))
        .route("/employee/forum-posts", post(portal::submit_forum_post))
        .route("/healthz", get(healthz))
        .fallback(pages::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

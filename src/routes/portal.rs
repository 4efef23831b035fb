//! Employee portal routes.
//!
//! `GET /employee` is the auth gate: without a session it shows the login
//! view, with one it loads and renders the portal. The two form endpoints
//! redirect back to `/employee` after a successful insert; any other outcome
//! re-renders the portal with the submitted draft kept in its form.

use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse, Redirect, Response};

use super::auth::MaybeSession;
use super::pages::MenuQuery;
use crate::backend::Session;
use crate::services::portal::{self as portal_svc, LeaveDraft, PostDraft, SubmitOutcome};
use crate::state::AppState;
use crate::views::EMPLOYEE_PATH;
use crate::views::portal::{render_login, render_portal};

/// `GET /employee`: login view or portal.
pub async fn employee_page(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    menu: MenuQuery,
) -> Html<String> {
    let Some(session) = session else {
        return Html(render_login("", None, menu.is_open()));
    };
    let data = portal_svc::load_portal(state.backend.as_ref(), &session).await;
    Html(render_portal(&data, &LeaveDraft::default(), &PostDraft::default(), menu.is_open()))
}

/// `POST /employee/leave-requests`
pub async fn submit_leave_request(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Form(draft): Form<LeaveDraft>,
) -> Response {
    let Some(session) = session else {
        return Redirect::to(EMPLOYEE_PATH).into_response();
    };
    match portal_svc::submit_leave_request(state.backend.as_ref(), &session, &draft).await {
        SubmitOutcome::Inserted => Redirect::to(EMPLOYEE_PATH).into_response(),
        _ => rerender(&state, &session, &draft, &PostDraft::default()).await.into_response(),
    }
}

/// `POST /employee/forum-posts`
pub async fn submit_forum_post(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Form(draft): Form<PostDraft>,
) -> Response {
    let Some(session) = session else {
        return Redirect::to(EMPLOYEE_PATH).into_response();
    };
    match portal_svc::submit_forum_post(state.backend.as_ref(), &session, &draft).await {
        SubmitOutcome::Inserted => Redirect::to(EMPLOYEE_PATH).into_response(),
        _ => rerender(&state, &session, &LeaveDraft::default(), &draft).await.into_response(),
    }
}

async fn rerender(state: &AppState, session: &Session, leave: &LeaveDraft, post: &PostDraft) -> Html<String> {
    let data = portal_svc::load_portal(state.backend.as_ref(), session).await;
    Html(render_portal(&data, leave, post, false))
}

#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;

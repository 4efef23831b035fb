//! Auth routes: password sign-in and sign-out, plus the session extractor.

use std::convert::Infallible;

use axum::extract::{Form, FromRef, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::backend::{BackendError, Session};
use crate::services::session::current_session;
use crate::state::AppState;
use crate::views::EMPLOYEE_PATH;
use crate::views::portal::{LOGIN_INCOMPLETE, LOGIN_REJECTED, LOGIN_UNAVAILABLE, render_login};

pub const COOKIE_NAME: &str = "portal_session";

// =============================================================================
// SESSION EXTRACTOR
// =============================================================================

/// Session from the cookie, if any.
///
/// Never rejects: a missing, unknown or unrefreshable cookie yields `None`
/// and the handler decides between the login view and a redirect.
pub struct MaybeSession(pub Option<Session>);

impl<S> axum::extract::FromRequestParts<S> for MaybeSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Ok(Self(None));
        }

        let app_state = AppState::from_ref(state);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Ok(Self(current_session(app_state.backend.as_ref(), &app_state.sessions, token, now).await))
    }
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// `POST /employee/login`: sign in and redirect to the portal with a session cookie.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        let html = render_login(email, Some(LOGIN_INCOMPLETE), false);
        return (StatusCode::BAD_REQUEST, Html(html)).into_response();
    }

    let session = match state.backend.sign_in_with_password(email, &form.password).await {
        Ok(session) => session,
        Err(BackendError::InvalidCredentials) => {
            tracing::warn!(email, "sign-in rejected");
            let html = render_login(email, Some(LOGIN_REJECTED), false);
            return (StatusCode::UNAUTHORIZED, Html(html)).into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-in request failed");
            let html = render_login(email, Some(LOGIN_UNAVAILABLE), false);
            return (StatusCode::BAD_GATEWAY, Html(html)).into_response();
        }
    };

    // Signing in again replaces whatever session the browser carried.
    if let Some(previous) = jar.get(COOKIE_NAME) {
        state.sessions.remove(previous.value()).await;
    }

    let user_id = session.user.id;
    let token = state.sessions.create(session).await;
    tracing::info!(%user_id, "signed in");

    let jar = jar.add(session_cookie(token, state.cookie_secure));
    (jar, Redirect::to(EMPLOYEE_PATH)).into_response()
}

/// `POST /employee/logout`: sign out remotely and locally, then clear the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let token = jar.get(COOKIE_NAME).map(|c| c.value().to_owned()).unwrap_or_default();

    if !token.is_empty() {
        if let Some(session) = state.sessions.get(&token).await {
            if let Err(e) = state.backend.sign_out(&session.access_token).await {
                tracing::error!(error = %e, user_id = %session.user.id, "remote sign-out failed");
            }
        }
        state.sessions.remove(&token).await;
    }

    let jar = jar.add(cleared_session_cookie(state.cookie_secure));
    (jar, Redirect::to(EMPLOYEE_PATH)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

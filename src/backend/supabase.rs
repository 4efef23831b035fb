//! Supabase client: auth (GoTrue) and table (PostgREST) calls over HTTP.
//!
//! Every request carries the project's public `apikey`. Auth calls that act
//! on a user and every table call also send `Authorization: Bearer <token>`
//! with the caller's access token, so row-level policies see the employee.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::Backend;
use super::types::{AuthUser, BackendError, Employee, ForumPost, LeaveRequest, NewForumPost, NewLeaveRequest, Session};
use crate::config::BackendConfig;

/// Lifetime assumed when the auth service omits both `expires_at` and `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

const EMPLOYEE_COLUMNS: &str = "id,user_id,name";
const FORUM_POST_COLUMNS: &str = "*,employees(name)";
const NEWEST_FIRST: &str = "created_at.desc";

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Build a client from typed backend config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.url.clone(), anon_key: config.anon_key.clone() })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn with_token(&self, builder: reqwest::RequestBuilder, access_token: &str) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(BackendError::Api { status: status.as_u16(), message: error_message(&body) });
        }
        Ok(body)
    }

    fn select_request(&self, access_token: &str, table: &str, query: &[QueryPair]) -> reqwest::RequestBuilder {
        self.with_token(self.http.get(self.rest_url(table)), access_token).query(query)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        query: &[QueryPair],
    ) -> Result<Vec<T>, BackendError> {
        let body = self.send(self.select_request(access_token, table, query)).await?;
        parse_json(&body)
    }

    async fn insert_one(
        &self,
        access_token: &str,
        table: &str,
        row: &impl serde::Serialize,
    ) -> Result<(), BackendError> {
        let builder = self
            .with_token(self.http.post(self.rest_url(table)), access_token)
            .header("Prefer", "return=minimal")
            .json(&[row]);
        self.send(builder).await?;
        Ok(())
    }

    async fn token_grant(&self, grant_type: &str, body: &serde_json::Value) -> Result<Session, BackendError> {
        let builder = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(body);
        let text = self.send(builder).await?;
        parse_token_response(&text, time::OffsetDateTime::now_utc().unix_timestamp())
    }
}

#[async_trait::async_trait]
impl Backend for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.token_grant("password", &body)
            .await
            .map_err(|e| match e {
                BackendError::Api { status: 400 | 401, .. } => BackendError::InvalidCredentials,
                other => other,
            })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        self.token_grant("refresh_token", &body).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let builder = self.with_token(self.http.post(self.auth_url("logout")), access_token);
        self.send(builder).await?;
        Ok(())
    }

    async fn find_employee(&self, access_token: &str, user_id: Uuid) -> Result<Option<Employee>, BackendError> {
        let rows: Vec<Employee> = self.select(access_token, "employees", &employee_query(user_id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_leave_requests(
        &self,
        access_token: &str,
        employee_id: Uuid,
    ) -> Result<Vec<LeaveRequest>, BackendError> {
        self.select(access_token, "leave_requests", &leave_requests_query(employee_id)).await
    }

    async fn insert_leave_request(&self, access_token: &str, request: &NewLeaveRequest) -> Result<(), BackendError> {
        self.insert_one(access_token, "leave_requests", request).await
    }

    async fn list_forum_posts(&self, access_token: &str) -> Result<Vec<ForumPost>, BackendError> {
        self.select(access_token, "forum_posts", &forum_posts_query()).await
    }

    async fn insert_forum_post(&self, access_token: &str, post: &NewForumPost) -> Result<(), BackendError> {
        self.insert_one(access_token, "forum_posts", post).await
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// One PostgREST query-string parameter.
type QueryPair = (&'static str, String);

/// The signed-in user's employee row, if any.
fn employee_query(user_id: Uuid) -> [QueryPair; 3] {
    [
        ("select", EMPLOYEE_COLUMNS.to_owned()),
        ("user_id", format!("eq.{user_id}")),
        ("limit", "1".to_owned()),
    ]
}

/// One employee's leave requests, newest first.
fn leave_requests_query(employee_id: Uuid) -> [QueryPair; 3] {
    [
        ("select", "*".to_owned()),
        ("employee_id", format!("eq.{employee_id}")),
        ("order", NEWEST_FIRST.to_owned()),
    ]
}

/// Every forum post with its author's name embedded, newest first.
fn forum_posts_query() -> [QueryPair; 2] {
    [("select", FORUM_POST_COLUMNS.to_owned()), ("order", NEWEST_FIRST.to_owned())]
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))
}

/// Decode a token-grant response, deriving the expiry from `expires_in` when
/// the service does not send an absolute `expires_at`.
fn parse_token_response(body: &str, now: i64) -> Result<Session, BackendError> {
    let token: TokenResponse = parse_json(body)?;
    let expires_at = token
        .expires_at
        .unwrap_or_else(|| now + token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS));
    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
        expires_at,
        user: token.user,
    })
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(serde_json::Value::as_str))
        })
        .map_or_else(|| body.trim().to_owned(), str::to_owned)
}

#[cfg(test)]
#[path = "supabase_test.rs"]
mod tests;

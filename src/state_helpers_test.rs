use super::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use time::OffsetDateTime;
use time::macros::{date, datetime};
use uuid::Uuid;

use crate::backend::types::PostAuthor;
use crate::backend::{
    AuthUser, BackendError, Employee, ForumPost, LeaveRequest, LeaveStatus, LeaveType, NewForumPost,
    NewLeaveRequest, Session,
};

pub const TEST_PASSWORD: &str = "correct horse";

// =============================================================================
// MockBackend
// =============================================================================

/// In-memory stand-in for the hosted backend.
///
/// Inserts are recorded and also appended to the listed rows so a following
/// read sees them, like the real tables would.
#[derive(Default)]
pub struct MockBackend {
    pub employee: Mutex<Option<Employee>>,
    pub leave_requests: Mutex<Vec<LeaveRequest>>,
    pub forum_posts: Mutex<Vec<ForumPost>>,
    pub inserted_leave_requests: Mutex<Vec<NewLeaveRequest>>,
    pub inserted_forum_posts: Mutex<Vec<NewForumPost>>,
    pub signed_out_tokens: Mutex<Vec<String>>,
    pub refresh_calls: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_sign_out: AtomicBool,
    pub fail_refresh: AtomicBool,
    /// Fail every refresh after the first, like a rotated refresh token.
    pub single_use_refresh: AtomicBool,
    pub unavailable: AtomicBool,
}

impl MockBackend {
    /// A backend where `dummy_session()`'s user has an employee row.
    #[must_use]
    pub fn with_employee() -> Self {
        let mock = Self::default();
        *mock.employee.lock().unwrap() = Some(dummy_employee());
        mock
    }

    fn api_error() -> BackendError {
        BackendError::Api { status: 503, message: "service unavailable".into() }
    }

    fn check(flag: &AtomicBool) -> Result<(), BackendError> {
        if flag.load(Ordering::SeqCst) { Err(Self::api_error()) } else { Ok(()) }
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Request("connection refused".into()));
        }
        if password != TEST_PASSWORD {
            return Err(BackendError::InvalidCredentials);
        }
        let mut session = dummy_session();
        session.user.email = Some(email.to_owned());
        Ok(session)
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<Session, BackendError> {
        let previous_calls = self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers interleave with the in-flight refresh.
        tokio::task::yield_now().await;
        Self::check(&self.fail_refresh)?;
        if previous_calls > 0 && self.single_use_refresh.load(Ordering::SeqCst) {
            return Err(BackendError::Api { status: 400, message: "Already Used".into() });
        }
        let mut session = dummy_session();
        session.access_token = "refreshed-access".into();
        session.refresh_token = Some("rotated-refresh".into());
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.signed_out_tokens.lock().unwrap().push(access_token.to_owned());
        Self::check(&self.fail_sign_out)
    }

    async fn find_employee(&self, _access_token: &str, user_id: Uuid) -> Result<Option<Employee>, BackendError> {
        Self::check(&self.fail_reads)?;
        Ok(self
            .employee
            .lock()
            .unwrap()
            .clone()
            .filter(|e| e.user_id == user_id))
    }

    async fn list_leave_requests(
        &self,
        _access_token: &str,
        employee_id: Uuid,
    ) -> Result<Vec<LeaveRequest>, BackendError> {
        Self::check(&self.fail_reads)?;
        Ok(self
            .leave_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn insert_leave_request(&self, _access_token: &str, request: &NewLeaveRequest) -> Result<(), BackendError> {
        Self::check(&self.fail_writes)?;
        self.inserted_leave_requests.lock().unwrap().push(request.clone());
        self.leave_requests.lock().unwrap().insert(
            0,
            LeaveRequest {
                id: Uuid::new_v4(),
                employee_id: request.employee_id,
                start_date: request.start_date,
                end_date: request.end_date,
                kind: request.kind.clone(),
                status: request.status.clone(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    async fn list_forum_posts(&self, _access_token: &str) -> Result<Vec<ForumPost>, BackendError> {
        Self::check(&self.fail_reads)?;
        Ok(self.forum_posts.lock().unwrap().clone())
    }

    async fn insert_forum_post(&self, _access_token: &str, post: &NewForumPost) -> Result<(), BackendError> {
        Self::check(&self.fail_writes)?;
        self.inserted_forum_posts.lock().unwrap().push(post.clone());
        let author = self
            .employee
            .lock()
            .unwrap()
            .as_ref()
            .map(|e| PostAuthor { name: e.name.clone() });
        self.forum_posts.lock().unwrap().insert(
            0,
            ForumPost {
                id: Uuid::new_v4(),
                title: post.title.clone(),
                content: post.content.clone(),
                created_at: OffsetDateTime::now_utc(),
                author,
            },
        );
        Ok(())
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

#[must_use]
pub fn dummy_user_id() -> Uuid {
    Uuid::from_u128(0x6c1d_6c62_42bd_4f8a_9d0e_0b4f_3cfa_0c1e)
}

#[must_use]
pub fn dummy_employee_id() -> Uuid {
    Uuid::from_u128(0x0e3a_5a10_77f4_4b8e_8f3c_2a61_90d4_11aa)
}

/// A session that stays valid for the lifetime of any test run.
#[must_use]
pub fn dummy_session() -> Session {
    Session {
        access_token: "access".into(),
        refresh_token: Some("refresh".into()),
        expires_at: i64::MAX / 2,
        user: AuthUser { id: dummy_user_id(), email: Some("marie@rtims.fr".into()) },
    }
}

#[must_use]
pub fn dummy_employee() -> Employee {
    Employee { id: dummy_employee_id(), user_id: dummy_user_id(), name: "Marie Dupont".into() }
}

#[must_use]
pub fn dummy_leave_request(status: LeaveStatus) -> LeaveRequest {
    LeaveRequest {
        id: Uuid::new_v4(),
        employee_id: dummy_employee_id(),
        start_date: date!(2025 - 08 - 04),
        end_date: date!(2025 - 08 - 15),
        kind: LeaveType::PaidLeave,
        status,
        created_at: datetime!(2025-06-02 09:00:00 UTC),
    }
}

#[must_use]
pub fn dummy_forum_post(title: &str, author: Option<&str>) -> ForumPost {
    ForumPost {
        id: Uuid::new_v4(),
        title: title.to_owned(),
        content: "Rendez-vous au 3e étage.".into(),
        created_at: datetime!(2025-06-03 14:15:00 UTC),
        author: author.map(|name| PostAuthor { name: name.to_owned() }),
    }
}

/// Create a test `AppState` around the given mock.
#[must_use]
pub fn test_app_state(backend: Arc<MockBackend>) -> AppState {
    AppState::new(backend, false)
}

/// Create a test `AppState` and sign `dummy_session()` in, returning its cookie token.
pub async fn signed_in_state(backend: Arc<MockBackend>) -> (AppState, String) {
    let state = test_app_state(backend);
    let token = state.sessions.create(dummy_session()).await;
    (state, token)
}

// =============================================================================
// HTTP HELPERS
// =============================================================================

/// `Cookie` header value carrying a session token.
#[must_use]
pub fn session_cookie_header(token: &str) -> String {
    format!("{}={token}", crate::routes::auth::COOKIE_NAME)
}

/// Build an urlencoded form POST, optionally with a session cookie.
#[must_use]
pub fn form_post(uri: &str, body: &str, token: Option<&str>) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header("cookie", session_cookie_header(token));
    }
    builder.body(axum::body::Body::from(body.to_owned())).unwrap()
}

/// Build a GET, optionally with a session cookie.
#[must_use]
pub fn get(uri: &str, token: Option<&str>) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("cookie", session_cookie_header(token));
    }
    builder.body(axum::body::Body::empty()).unwrap()
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

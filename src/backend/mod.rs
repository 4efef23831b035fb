//! Backend: the hosted table store and auth service behind the portal.
//!
//! DESIGN
//! ======
//! Every read, write and credential check is delegated to the backend. The
//! `Backend` trait is the seam route handlers and services depend on; the
//! production implementation is [`supabase::SupabaseClient`], tests plug in a
//! mock. Table calls carry the caller's access token so row-level policies
//! on the backend decide what each employee may see or write.

pub mod supabase;
pub mod types;

use uuid::Uuid;

pub use supabase::SupabaseClient;
pub use types::{
    AuthUser, BackendError, Employee, ForumPost, LeaveRequest, LeaveStatus, LeaveType, NewForumPost,
    NewLeaveRequest, Session,
};

/// Operations the portal needs from the hosted backend.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Exchange an email/password pair for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Trade a refresh token for a fresh session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError>;

    /// Revoke the session identified by `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// Employee row linked to `user_id`, if any.
    async fn find_employee(&self, access_token: &str, user_id: Uuid) -> Result<Option<Employee>, BackendError>;

    /// Leave requests of one employee, newest first.
    async fn list_leave_requests(
        &self,
        access_token: &str,
        employee_id: Uuid,
    ) -> Result<Vec<LeaveRequest>, BackendError>;

    async fn insert_leave_request(&self, access_token: &str, request: &NewLeaveRequest) -> Result<(), BackendError>;

    /// All forum posts with their author's name, newest first.
    async fn list_forum_posts(&self, access_token: &str) -> Result<Vec<ForumPost>, BackendError>;

    async fn insert_forum_post(&self, access_token: &str, post: &NewForumPost) -> Result<(), BackendError>;
}

//! Backend record types: rows and auth payloads owned by the hosted backend.
//!
//! These mirror the `employees`, `leave_requests` and `forum_posts` tables and
//! the auth service's session shape. Nothing here enforces invariants beyond
//! what is needed to build a request; the backend owns validation.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Refresh a session this many seconds before the backend considers it expired.
pub const EXPIRY_MARGIN_SECS: i64 = 30;

/// Author label shown when a forum post has no joined employee row.
pub const ANONYMOUS_AUTHOR: &str = "Anonyme";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend client operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request never produced a response (connect, timeout, TLS).
    #[error("backend request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend error: status {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("backend response parse failed: {0}")]
    Parse(String),

    /// The auth service rejected the email/password pair.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// SESSION
// =============================================================================

/// Identity of the signed-in user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authentication proof issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is rejected.
    pub expires_at: i64,
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token should be refreshed before use at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at - EXPIRY_MARGIN_SECS
    }
}

// =============================================================================
// LEAVE TYPE / STATUS
// =============================================================================

/// Kind of time off. Stored in the backend as its French label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeaveType {
    #[default]
    PaidLeave,
    Rtt,
    Sick,
    /// A label written by another client; kept verbatim.
    Other(String),
}

impl LeaveType {
    /// Every type offered by the submission form, in display order.
    pub const SELECTABLE: [LeaveType; 3] = [LeaveType::PaidLeave, LeaveType::Rtt, LeaveType::Sick];

    /// Stored label, also used as the form option value.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::PaidLeave => "congés payés",
            Self::Rtt => "rtt",
            Self::Sick => "maladie",
            Self::Other(raw) => raw,
        }
    }

    /// Human-facing option text.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::PaidLeave => "Congés payés",
            Self::Rtt => "RTT",
            Self::Sick => "Maladie",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for LeaveType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "congés payés" => Self::PaidLeave,
            "rtt" => Self::Rtt,
            "maladie" => Self::Sick,
            _ => Self::Other(raw),
        }
    }
}

impl From<LeaveType> for String {
    fn from(kind: LeaveType) -> Self {
        kind.label().to_owned()
    }
}

/// Review state of a leave request. Transitions happen outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl LeaveStatus {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for LeaveStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Other(raw),
        }
    }
}

impl From<LeaveStatus> for String {
    fn from(status: LeaveStatus) -> Self {
        status.label().to_owned()
    }
}

// =============================================================================
// ROWS
// =============================================================================

/// Row of the `employees` table linking an auth user to a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

/// Row of the `leave_requests` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
    #[serde(rename = "type")]
    pub kind: LeaveType,
    pub status: LeaveStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Embedded `employees(name)` relation on a forum post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub name: String,
}

/// Row of the `forum_posts` table with its author joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, rename = "employees")]
    pub author: Option<PostAuthor>,
}

impl ForumPost {
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(ANONYMOUS_AUTHOR)
    }
}

// =============================================================================
// INSERT PAYLOADS
// =============================================================================

/// Insert payload for `leave_requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLeaveRequest {
    pub employee_id: Uuid,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
    #[serde(rename = "type")]
    pub kind: LeaveType,
    pub status: LeaveStatus,
}

/// Insert payload for `forum_posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewForumPost {
    pub employee_id: Uuid,
    pub title: String,
    pub content: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

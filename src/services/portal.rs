//! Employee portal workflows: load on page view, insert on form submit.
//!
//! Every workflow looks up the caller's employee row first and then issues
//! one dependent read or insert. Failures follow a best-effort policy: they
//! are logged and the caller keeps its prior state. Nothing is retried or
//! rolled back.

use serde::Deserialize;
use time::Date;
use time::macros::format_description;

use crate::backend::{
    Backend, Employee, ForumPost, LeaveRequest, LeaveStatus, LeaveType, NewForumPost, NewLeaveRequest, Session,
};

/// Everything the portal page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalData {
    pub employee: Option<Employee>,
    pub leave_requests: Vec<LeaveRequest>,
    pub forum_posts: Vec<ForumPost>,
}

/// Result of a form submission.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Inserted,
    /// The draft is missing a required field or has a malformed value.
    Invalid(DraftError),
    /// The signed-in user has no employee row.
    NoEmployee,
    /// The backend lookup or insert failed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("required field {0} is empty")]
    Missing(&'static str),
    #[error("field {field} is not a YYYY-MM-DD date: {value:?}")]
    InvalidDate { field: &'static str, value: String },
}

// =============================================================================
// DRAFTS
// =============================================================================

/// Leave request form as submitted, kept verbatim so it can be re-rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaveDraft {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(rename = "type", default = "default_leave_type")]
    pub kind: String,
}

fn default_leave_type() -> String {
    LeaveType::default().label().to_owned()
}

impl Default for LeaveDraft {
    fn default() -> Self {
        Self { start_date: String::new(), end_date: String::new(), kind: default_leave_type() }
    }
}

struct ValidLeave {
    start_date: Date,
    end_date: Date,
    kind: LeaveType,
}

impl LeaveDraft {
    fn validate(&self) -> Result<ValidLeave, DraftError> {
        let start_date = parse_form_date("start_date", &self.start_date)?;
        let end_date = parse_form_date("end_date", &self.end_date)?;
        let kind = required("type", &self.kind)?;
        Ok(ValidLeave { start_date, end_date, kind: LeaveType::from(kind.to_owned()) })
    }
}

/// Forum post form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl PostDraft {
    fn validate(&self) -> Result<(), DraftError> {
        required("title", &self.title)?;
        required("content", &self.content)?;
        Ok(())
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() { Err(DraftError::Missing(field)) } else { Ok(trimmed) }
}

fn parse_form_date(field: &'static str, value: &str) -> Result<Date, DraftError> {
    let raw = required(field, value)?;
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| DraftError::InvalidDate { field, value: raw.to_owned() })
}

// =============================================================================
// WORKFLOWS
// =============================================================================

/// Fetch the caller's leave requests and the forum feed.
///
/// Each read fails independently into an empty list.
pub async fn load_portal(backend: &dyn Backend, session: &Session) -> PortalData {
    let employee = lookup_employee(backend, session).await.ok().flatten();

    let leave_requests = match &employee {
        Some(employee) => match backend.list_leave_requests(&session.access_token, employee.id).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, employee_id = %employee.id, "fetching leave requests failed");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let forum_posts = match backend.list_forum_posts(&session.access_token).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, "fetching forum posts failed");
            Vec::new()
        }
    };

    PortalData { employee, leave_requests, forum_posts }
}

/// Insert a pending leave request for the caller.
pub async fn submit_leave_request(backend: &dyn Backend, session: &Session, draft: &LeaveDraft) -> SubmitOutcome {
    let valid = match draft.validate() {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, user_id = %session.user.id, "leave request rejected");
            return SubmitOutcome::Invalid(e);
        }
    };

    let employee = match lookup_employee(backend, session).await {
        Ok(Some(employee)) => employee,
        Ok(None) => return SubmitOutcome::NoEmployee,
        Err(()) => return SubmitOutcome::Failed,
    };

    let request = NewLeaveRequest {
        employee_id: employee.id,
        start_date: valid.start_date,
        end_date: valid.end_date,
        kind: valid.kind,
        status: LeaveStatus::Pending,
    };
    match backend.insert_leave_request(&session.access_token, &request).await {
        Ok(()) => {
            tracing::info!(employee_id = %employee.id, kind = request.kind.label(), "leave request submitted");
            SubmitOutcome::Inserted
        }
        Err(e) => {
            tracing::error!(error = %e, employee_id = %employee.id, "submitting leave request failed");
            SubmitOutcome::Failed
        }
    }
}

/// Publish a forum post authored by the caller.
pub async fn submit_forum_post(backend: &dyn Backend, session: &Session, draft: &PostDraft) -> SubmitOutcome {
    if let Err(e) = draft.validate() {
        tracing::warn!(error = %e, user_id = %session.user.id, "forum post rejected");
        return SubmitOutcome::Invalid(e);
    }

    let employee = match lookup_employee(backend, session).await {
        Ok(Some(employee)) => employee,
        Ok(None) => return SubmitOutcome::NoEmployee,
        Err(()) => return SubmitOutcome::Failed,
    };

    let post = NewForumPost { employee_id: employee.id, title: draft.title.clone(), content: draft.content.clone() };
    match backend.insert_forum_post(&session.access_token, &post).await {
        Ok(()) => {
            tracing::info!(employee_id = %employee.id, "forum post published");
            SubmitOutcome::Inserted
        }
        Err(e) => {
            tracing::error!(error = %e, employee_id = %employee.id, "submitting forum post failed");
            SubmitOutcome::Failed
        }
    }
}

/// Employee row of the signed-in user. Failures are logged here; `Err(())`
/// only tells the caller to stop.
async fn lookup_employee(backend: &dyn Backend, session: &Session) -> Result<Option<Employee>, ()> {
    match backend.find_employee(&session.access_token, session.user.id).await {
        Ok(Some(employee)) => Ok(Some(employee)),
        Ok(None) => {
            tracing::warn!(user_id = %session.user.id, "no employee row for user");
            Ok(None)
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, "employee lookup failed");
            Err(())
        }
    }
}

#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;

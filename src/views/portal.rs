//! Employee area: the login view and the portal page.

use std::fmt::Write as _;

use super::{EMPLOYEE_PATH, Nav, escape_html, fill, format_date, layout};
use crate::backend::{ForumPost, LeaveRequest, LeaveStatus, LeaveType};
use crate::services::portal::{LeaveDraft, PortalData, PostDraft};

const LOGIN_TEMPLATE: &str = include_str!("../../templates/login.html");
const PORTAL_TEMPLATE: &str = include_str!("../../templates/portal.html");

const PAGE_TITLE: &str = "Espace Employé";

/// Shown for rejected credentials. Never says which field was wrong.
pub const LOGIN_REJECTED: &str = "Identifiants invalides.";
pub const LOGIN_UNAVAILABLE: &str = "Service momentanément indisponible. Veuillez réessayer.";
pub const LOGIN_INCOMPLETE: &str = "Veuillez saisir votre adresse e-mail et votre mot de passe.";

// =============================================================================
// LOGIN
// =============================================================================

/// Render the sign-in form, keeping the submitted email on a retry.
#[must_use]
pub fn render_login(email: &str, notice: Option<&str>, menu_open: bool) -> String {
    let notice = notice.map(|text| format!(r#"<p class="notice" role="alert">{}</p>"#, escape_html(text)));
    let email = escape_html(email);
    let body = fill(
        LOGIN_TEMPLATE,
        &[("NOTICE", notice.as_deref().unwrap_or_default()), ("EMAIL", email.as_str())],
    );
    layout(PAGE_TITLE, Nav { path: EMPLOYEE_PATH, menu_open, signed_in: false }, &body)
}

// =============================================================================
// PORTAL
// =============================================================================

/// Badge colour class for a leave status. Unknown statuses look pending.
#[must_use]
pub fn status_badge_class(status: &LeaveStatus) -> &'static str {
    match status {
        LeaveStatus::Approved => "badge badge-green",
        LeaveStatus::Rejected => "badge badge-red",
        LeaveStatus::Pending | LeaveStatus::Other(_) => "badge badge-yellow",
    }
}

/// Render the portal with both forms pre-filled from the given drafts.
#[must_use]
pub fn render_portal(data: &PortalData, leave: &LeaveDraft, post: &PostDraft, menu_open: bool) -> String {
    let start_date = escape_html(&leave.start_date);
    let end_date = escape_html(&leave.end_date);
    let type_options = type_options(&leave.kind);
    let leave_requests = leave_request_list(&data.leave_requests);
    let post_title = escape_html(&post.title);
    let post_content = escape_html(&post.content);
    let forum_posts = forum_post_list(&data.forum_posts);

    let body = fill(
        PORTAL_TEMPLATE,
        &[
            ("START_DATE", start_date.as_str()),
            ("END_DATE", end_date.as_str()),
            ("TYPE_OPTIONS", type_options.as_str()),
            ("LEAVE_REQUESTS", leave_requests.as_str()),
            ("POST_TITLE", post_title.as_str()),
            ("POST_CONTENT", post_content.as_str()),
            ("FORUM_POSTS", forum_posts.as_str()),
        ],
    );
    layout(PAGE_TITLE, Nav { path: EMPLOYEE_PATH, menu_open, signed_in: true }, &body)
}

fn type_options(selected: &str) -> String {
    let mut out = String::new();
    for kind in &LeaveType::SELECTABLE {
        let marker = if kind.label() == selected { " selected" } else { "" };
        let _ = write!(
            out,
            r#"<option value="{}"{marker}>{}</option>"#,
            escape_html(kind.label()),
            escape_html(kind.display_name())
        );
    }
    out
}

fn leave_request_list(requests: &[LeaveRequest]) -> String {
    let mut out = String::new();
    for request in requests {
        let _ = write!(
            out,
            concat!(
                r#"<div class="item"><div class="item-head"><span>{kind}</span>"#,
                r#"<span class="{badge}">{status}</span></div>"#,
                r#"<div class="muted">Du {start} au {end}</div></div>"#,
            ),
            kind = escape_html(request.kind.label()),
            badge = status_badge_class(&request.status),
            status = escape_html(request.status.label()),
            start = format_date(request.start_date),
            end = format_date(request.end_date),
        );
    }
    out
}

fn forum_post_list(posts: &[ForumPost]) -> String {
    let mut out = String::new();
    for post in posts {
        let _ = write!(
            out,
            concat!(
                r#"<div class="item"><div class="item-head"><h4>{title}</h4>"#,
                r#"<span class="muted">{created}</span></div>"#,
                r#"<p class="muted">{content}</p>"#,
                r#"<div class="muted">Par {author}</div></div>"#,
            ),
            title = escape_html(&post.title),
            created = format_date(post.created_at.date()),
            content = escape_html(&post.content),
            author = escape_html(post.author_name()),
        );
    }
    out
}

#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;

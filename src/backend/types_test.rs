use super::*;
use serde_json::json;
use time::macros::{date, datetime};

// =============================================================================
// LeaveType / LeaveStatus
// =============================================================================

#[test]
fn leave_type_known_labels_parse() {
    assert_eq!(LeaveType::from("congés payés".to_owned()), LeaveType::PaidLeave);
    assert_eq!(LeaveType::from("rtt".to_owned()), LeaveType::Rtt);
    assert_eq!(LeaveType::from("maladie".to_owned()), LeaveType::Sick);
}

#[test]
fn leave_type_unknown_label_is_preserved() {
    let kind = LeaveType::from("formation".to_owned());
    assert_eq!(kind, LeaveType::Other("formation".into()));
    assert_eq!(kind.label(), "formation");
    assert_eq!(kind.display_name(), "formation");
}

#[test]
fn leave_type_defaults_to_paid_leave() {
    assert_eq!(LeaveType::default(), LeaveType::PaidLeave);
    assert_eq!(LeaveType::default().display_name(), "Congés payés");
}

#[test]
fn leave_type_serializes_as_label() {
    assert_eq!(serde_json::to_value(LeaveType::Rtt).unwrap(), json!("rtt"));
    assert_eq!(serde_json::to_value(LeaveType::PaidLeave).unwrap(), json!("congés payés"));
}

#[test]
fn leave_status_unknown_label_is_preserved() {
    let status: LeaveStatus = serde_json::from_value(json!("cancelled")).unwrap();
    assert_eq!(status, LeaveStatus::Other("cancelled".into()));
    assert_eq!(status.label(), "cancelled");
}

#[test]
fn leave_status_default_is_pending() {
    assert_eq!(LeaveStatus::default(), LeaveStatus::Pending);
    assert_eq!(serde_json::to_value(LeaveStatus::default()).unwrap(), json!("pending"));
}

// =============================================================================
// Session
// =============================================================================

fn session_expiring_at(expires_at: i64) -> Session {
    Session {
        access_token: "access".into(),
        refresh_token: Some("refresh".into()),
        expires_at,
        user: AuthUser { id: Uuid::nil(), email: None },
    }
}

#[test]
fn session_not_expired_well_before_deadline() {
    assert!(!session_expiring_at(1_000).is_expired_at(500));
}

#[test]
fn session_expired_inside_margin() {
    let session = session_expiring_at(1_000);
    assert!(session.is_expired_at(1_000 - EXPIRY_MARGIN_SECS));
    assert!(session.is_expired_at(2_000));
}

// =============================================================================
// Row decoding
// =============================================================================

#[test]
fn leave_request_decodes_backend_row() {
    let row = json!({
        "id": "6c1d6c62-42bd-4f8a-9d0e-0b4f3cfa0c1e",
        "employee_id": "00000000-0000-0000-0000-000000000000",
        "start_date": "2025-07-01",
        "end_date": "2025-07-15",
        "type": "congés payés",
        "status": "approved",
        "created_at": "2025-06-01T08:30:00.123456+00:00"
    });
    let request: LeaveRequest = serde_json::from_value(row).unwrap();
    assert_eq!(request.start_date, date!(2025 - 07 - 01));
    assert_eq!(request.end_date, date!(2025 - 07 - 15));
    assert_eq!(request.kind, LeaveType::PaidLeave);
    assert_eq!(request.status, LeaveStatus::Approved);
    assert_eq!(request.created_at.date(), date!(2025 - 06 - 01));
}

#[test]
fn forum_post_decodes_joined_author() {
    let row = json!({
        "id": "6c1d6c62-42bd-4f8a-9d0e-0b4f3cfa0c1e",
        "employee_id": "00000000-0000-0000-0000-000000000000",
        "title": "Pot de départ",
        "content": "Vendredi 17h",
        "created_at": "2025-06-01T08:30:00Z",
        "employees": { "name": "Claire" }
    });
    let post: ForumPost = serde_json::from_value(row).unwrap();
    assert_eq!(post.author_name(), "Claire");
    assert_eq!(post.created_at, datetime!(2025-06-01 08:30:00 UTC));
}

#[test]
fn forum_post_without_author_is_anonymous() {
    let row = json!({
        "id": "6c1d6c62-42bd-4f8a-9d0e-0b4f3cfa0c1e",
        "title": "t",
        "content": "c",
        "created_at": "2025-06-01T08:30:00Z",
        "employees": null
    });
    let post: ForumPost = serde_json::from_value(row).unwrap();
    assert_eq!(post.author_name(), ANONYMOUS_AUTHOR);
}

#[test]
fn new_leave_request_serializes_backend_columns() {
    let payload = NewLeaveRequest {
        employee_id: Uuid::nil(),
        start_date: date!(2025 - 12 - 22),
        end_date: date!(2025 - 12 - 31),
        kind: LeaveType::Rtt,
        status: LeaveStatus::Pending,
    };
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["start_date"], "2025-12-22");
    assert_eq!(value["end_date"], "2025-12-31");
    assert_eq!(value["type"], "rtt");
    assert_eq!(value["status"], "pending");
    assert_eq!(value["employee_id"], "00000000-0000-0000-0000-000000000000");
}

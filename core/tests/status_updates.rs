//! Complaint status updates and admin responses.

use chrono::{DateTime, TimeZone, Utc};
use mealdesk_core::{
    account_service::Role,
    classifier::{Classifier, KeywordClassifier},
    complaint_service::{ComplaintService, ComplaintStatus},
    error::DeskError,
    store::DeskStore,
    types::ComplaintId,
};
use std::sync::Arc;

fn test_store() -> DeskStore {
    let store = DeskStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

fn desk_with_one_complaint() -> (ComplaintService, ComplaintId) {
    let store = test_store();
    let classifier: Arc<dyn Classifier> =
        Arc::new(KeywordClassifier::new(&[("cold", "Food Quality Issue")], "Other"));
    let complaints = ComplaintService::new(store.clone(), Some(classifier));
    let riya = store.insert_user("riya", "hash", Role::User, ts(1, 8)).unwrap();
    let receipt = complaints
        .submit(riya, None, "Food arrived cold", ts(2, 12))
        .unwrap();
    (complaints, receipt.complaint_id)
}

/// The status set is flat: an update may move a complaint from any
/// status to any other, including back to Pending.
#[test]
fn any_status_can_follow_any_other() {
    let (complaints, id) = desk_with_one_complaint();

    for status in [
        ComplaintStatus::Resolved,
        ComplaintStatus::Pending,
        ComplaintStatus::NotResponded,
        ComplaintStatus::Verified,
    ] {
        let record = complaints.update_status(id, status, None).unwrap();
        assert_eq!(record.status, status, "update to {status} should stick");
    }
}

#[test]
fn updating_a_missing_complaint_is_not_found() {
    let store = test_store();
    let complaints = ComplaintService::new(store, None);

    let err = complaints
        .update_status(42, ComplaintStatus::Resolved, None)
        .unwrap_err();
    assert!(
        matches!(err, DeskError::ComplaintNotFound { complaint_id: 42 }),
        "expected not-found for id 42, got {err}"
    );
}

#[test]
fn response_is_attached_with_the_status_change() {
    let (complaints, id) = desk_with_one_complaint();

    let record = complaints
        .update_status(id, ComplaintStatus::Resolved, Some("Refund issued"))
        .unwrap();
    assert_eq!(record.status, ComplaintStatus::Resolved);
    assert_eq!(record.admin_response.as_deref(), Some("Refund issued"));
}

/// Leaving the response out of a later update must not erase the one
/// already on file.
#[test]
fn omitted_response_preserves_the_previous_one() {
    let (complaints, id) = desk_with_one_complaint();
    complaints
        .update_status(id, ComplaintStatus::Verified, Some("Checking with the restaurant"))
        .unwrap();

    let record = complaints
        .update_status(id, ComplaintStatus::Resolved, None)
        .unwrap();
    assert_eq!(record.status, ComplaintStatus::Resolved);
    assert_eq!(
        record.admin_response.as_deref(),
        Some("Checking with the restaurant"),
        "an update without a response must leave the stored one alone"
    );
}

#[test]
fn blank_responses_count_as_omitted() {
    let (complaints, id) = desk_with_one_complaint();
    complaints
        .update_status(id, ComplaintStatus::Verified, Some("Checking with the restaurant"))
        .unwrap();

    let record = complaints
        .update_status(id, ComplaintStatus::Resolved, Some("   "))
        .unwrap();
    assert_eq!(
        record.admin_response.as_deref(),
        Some("Checking with the restaurant"),
        "whitespace-only responses should be treated as absent"
    );
}

#[test]
fn responses_are_trimmed_when_stored() {
    let (complaints, id) = desk_with_one_complaint();

    let record = complaints
        .update_status(id, ComplaintStatus::Resolved, Some("  Refund issued  "))
        .unwrap();
    assert_eq!(record.admin_response.as_deref(), Some("Refund issued"));
}

/// Status labels coming off the wire parse strictly. A bad label never
/// produces a status value, so it cannot reach the store, and the
/// record it was aimed at stays as it was.
#[test]
fn unknown_status_labels_are_rejected_at_the_parse_boundary() {
    let (complaints, id) = desk_with_one_complaint();

    for (raw, want) in [
        ("Pending", ComplaintStatus::Pending),
        ("Verified", ComplaintStatus::Verified),
        ("Resolved", ComplaintStatus::Resolved),
        ("Not Responded", ComplaintStatus::NotResponded),
    ] {
        assert_eq!(ComplaintStatus::parse(raw), Some(want));
        assert_eq!(want.as_str(), raw, "wire label should round-trip");
    }
    for raw in ["Escalated", "pending", "NOT RESPONDED", ""] {
        assert_eq!(ComplaintStatus::parse(raw), None, "{raw:?} is not a valid status");
    }

    let record = complaints.get(id).unwrap().unwrap();
    assert_eq!(record.status, ComplaintStatus::Pending, "nothing was updated");
}

#[test]
fn repeating_an_update_changes_nothing() {
    let (complaints, id) = desk_with_one_complaint();

    let first = complaints
        .update_status(id, ComplaintStatus::Resolved, Some("Refund issued"))
        .unwrap();
    let second = complaints
        .update_status(id, ComplaintStatus::Resolved, Some("Refund issued"))
        .unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.admin_response, second.admin_response);
    assert_eq!(first.submitted_at, second.submitted_at);
}

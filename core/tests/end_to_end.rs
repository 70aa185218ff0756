//! Whole-desk walkthrough: accounts, an order, a complaint, an admin
//! resolution, and the listings in between. Uses the shipped artifact.

use chrono::{DateTime, TimeZone, Utc};
use mealdesk_core::{
    account_service::{AccountService, Role},
    classifier::{Classifier, TfidfClassifier},
    complaint_reports::{ComplaintFilter, ComplaintReports, Viewer},
    complaint_service::{ComplaintService, ComplaintStatus},
    config::DeskConfig,
    error::DeskError,
    order_service::OrderService,
    store::DeskStore,
};
use std::sync::Arc;

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

#[test]
fn complaint_desk_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = DeskConfig::default_test();
    let store = DeskStore::open(&config.database_path).unwrap();
    store.migrate().unwrap();

    let classifier: Arc<dyn Classifier> = Arc::new(
        TfidfClassifier::load(
            &config.classifier.vectorizer_path,
            &config.classifier.model_path,
        )
        .unwrap(),
    );

    let accounts = AccountService::new(store.clone());
    let orders = OrderService::new(store.clone());
    let complaints = ComplaintService::new(store.clone(), Some(classifier.clone()));
    let reports = ComplaintReports::new(store.clone());

    // Day 1: the desk boots, the admin account is ensured, a customer signs up.
    accounts.ensure_admin("admin", "admin123", ts(1, 8)).unwrap();
    let riya = accounts.register("riya", "riya-pw", Role::User, ts(1, 9)).unwrap();
    let logged_in = accounts.login("riya", "riya-pw", Some(Role::User)).unwrap();
    assert_eq!(logged_in.user_id, riya.user_id);

    // Day 2: she orders dinner and it shows up cold.
    let order = orders
        .place(riya.user_id, "Spice Route", "Paneer Tikka, Garlic Naan", 18.40, ts(2, 19))
        .unwrap();
    let receipt = complaints
        .submit(riya.user_id, Some(order.order_id), "Food arrived cold", ts(2, 20))
        .unwrap();

    assert_eq!(receipt.status, ComplaintStatus::Pending);
    assert_eq!(receipt.text, "Food arrived cold");
    assert!(
        classifier.labels().contains(&receipt.category),
        "category {:?} must come from the artifact's label set",
        receipt.category
    );

    // She sees exactly her one complaint, with the order attached.
    let hers = reports
        .list(Viewer::User(riya.user_id), &ComplaintFilter::default(), ts(2, 21).date_naive())
        .unwrap();
    assert_eq!(hers.len(), 1);
    assert_eq!(hers[0].username, "riya");
    assert_eq!(hers[0].complaint.complaint_id, receipt.complaint_id);
    let order_context = hers[0].order.as_ref().expect("order context should be attached");
    assert_eq!(order_context.restaurant_name, "Spice Route");

    // Day 3: the admin reviews the queue, resolves it with a response.
    let admin_view = reports
        .list(Viewer::Admin, &ComplaintFilter::default(), ts(3, 9).date_naive())
        .unwrap();
    assert_eq!(admin_view.len(), 1);

    let resolved = complaints
        .update_status(receipt.complaint_id, ComplaintStatus::Resolved, Some("Refund issued"))
        .unwrap();
    assert_eq!(resolved.status, ComplaintStatus::Resolved);
    assert_eq!(resolved.admin_response.as_deref(), Some("Refund issued"));

    // The resolved filter now finds it; the customer sees the response too.
    let filter = ComplaintFilter::from_params(Some("All"), Some("Resolved"), Some("All")).unwrap();
    let resolved_view = reports.list(Viewer::Admin, &filter, ts(3, 9).date_naive()).unwrap();
    assert_eq!(resolved_view.len(), 1);
    assert_eq!(
        resolved_view[0].complaint.admin_response.as_deref(),
        Some("Refund issued")
    );

    let hers_again = reports
        .list(Viewer::User(riya.user_id), &ComplaintFilter::default(), ts(3, 10).date_naive())
        .unwrap();
    assert_eq!(hers_again[0].complaint.status, ComplaintStatus::Resolved);
    assert_eq!(hers_again[0].complaint.admin_response.as_deref(), Some("Refund issued"));

    // Totals reflect the single complaint.
    let counts = reports.category_counts().unwrap();
    assert_eq!(counts.values().sum::<i64>(), 1);
    assert_eq!(counts.get(&receipt.category), Some(&1));
}

/// A desk whose artifact failed to load still serves reads and updates;
/// only intake is refused.
#[test]
fn degraded_desk_still_serves_existing_complaints() {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = DeskStore::in_memory().unwrap();
    store.migrate().unwrap();
    let complaints = ComplaintService::new(store.clone(), None);
    let reports = ComplaintReports::new(store.clone());

    let riya = store.insert_user("riya", "hash", Role::User, ts(1, 8)).unwrap();
    let id = store
        .insert_complaint(
            riya,
            None,
            "Driver was late",
            "Delivery Issue",
            ComplaintStatus::Pending,
            ts(2, 12),
        )
        .unwrap();

    let err = complaints.submit(riya, None, "Food arrived cold", ts(2, 13)).unwrap_err();
    assert!(matches!(err, DeskError::ClassifierUnavailable));

    let listed = reports
        .list(Viewer::User(riya), &ComplaintFilter::default(), ts(2, 13).date_naive())
        .unwrap();
    assert_eq!(listed.len(), 1, "the pre-existing complaint is still visible");

    let updated = complaints
        .update_status(id, ComplaintStatus::NotResponded, None)
        .unwrap();
    assert_eq!(updated.status, ComplaintStatus::NotResponded);
}

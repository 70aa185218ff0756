//! desk-runner: seeds a demo complaint desk database and prints a summary.
//!
//! Usage:
//!   desk-runner --data-dir ./data --seed 42
//!   desk-runner --db demo.db --users 8 --orders 20 --complaints 30

use anyhow::Result;
use chrono::{Duration, Utc};
use mealdesk_core::{
    account_service::{AccountService, Role, UserRecord},
    classifier::{Classifier, TfidfClassifier},
    complaint_reports::{ComplaintFilter, ComplaintReports, Viewer},
    complaint_service::{ComplaintService, ComplaintStatus},
    config::DeskConfig,
    error::DeskError,
    order_service::OrderService,
    store::DeskStore,
    types::{OrderId, UserId},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

const DEMO_PASSWORD: &str = "demo-pass-1";

const RESTAURANTS: &[&str] = &[
    "Spice Route",
    "Golden Wok",
    "Napoli Express",
    "Burger Barn",
    "Chaat Corner",
    "Sakura Sushi",
    "El Toro Loco",
    "The Green Bowl",
];

const MENU_ITEMS: &[&str] = &[
    "Paneer Tikka",
    "Chicken Biryani",
    "Margherita Pizza",
    "Veg Hakka Noodles",
    "Classic Cheeseburger",
    "Falafel Wrap",
    "Pad Thai",
    "Masala Dosa",
    "California Roll",
    "Butter Chicken",
    "Garlic Naan",
    "Mango Lassi",
];

const SAMPLE_COMPLAINTS: &[&str] = &[
    "Food arrived cold",
    "The rider could not find my address and the food arrived cold",
    "App crashed twice while I was paying",
    "I ordered paneer tikka but got chicken instead",
    "The biryani smelled spoiled and we could not eat it",
    "Order shows delivered but nothing arrived",
    "Refund for my cancelled order has still not come through",
    "The tracking screen has been stuck on preparing for an hour",
    "Burger was burnt and the fries were soggy",
    "Delivery took two hours and no one answered my calls",
];

const RESPONSES: &[&str] = &[
    "Refund issued to your original payment method.",
    "We are checking with the restaurant and will update you.",
    "A replacement order has been arranged.",
    "Passed to the delivery partner for review.",
];

const ADVANCED_STATUSES: [ComplaintStatus; 3] = [
    ComplaintStatus::Verified,
    ComplaintStatus::Resolved,
    ComplaintStatus::NotResponded,
];

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let user_count = parse_arg(&args, "--users", 6usize);
    let order_count = parse_arg(&args, "--orders", 12usize);
    let complaint_count = parse_arg(&args, "--complaints", 18usize);
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let config = DeskConfig::load(data_dir)?;
    let db_path = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].to_string())
        .unwrap_or_else(|| config.database_path.clone());

    println!("Meal Desk: desk-runner");
    println!("  seed:       {seed}");
    println!("  users:      {user_count}");
    println!("  orders:     {order_count}");
    println!("  complaints: {complaint_count}");
    println!("  db:         {db_path}");
    println!("  data_dir:   {data_dir}");
    println!();

    let store = DeskStore::open(&db_path)?;
    store.migrate()?;

    let classifier: Option<Arc<dyn Classifier>> = match TfidfClassifier::load(
        &config.classifier.vectorizer_path,
        &config.classifier.model_path,
    ) {
        Ok(loaded) => Some(Arc::new(loaded)),
        Err(e) => {
            log::warn!("classifier artifact unavailable, complaint intake disabled: {e}");
            None
        }
    };

    let accounts = AccountService::new(store.clone());
    let orders = OrderService::new(store.clone());
    let complaints = ComplaintService::new(store.clone(), classifier);
    let reports = ComplaintReports::new(store.clone());

    if let Some(admin) = &config.bootstrap_admin {
        accounts.ensure_admin(&admin.username, &admin.password, Utc::now())?;
    }

    seed_demo(
        &accounts,
        &orders,
        &complaints,
        seed,
        user_count,
        order_count,
        complaint_count,
    )?;

    print_summary(&store, &reports)
}

fn seed_demo(
    accounts: &AccountService,
    orders: &OrderService,
    complaints: &ComplaintService,
    seed: u64,
    user_count: usize,
    order_count: usize,
    complaint_count: usize,
) -> Result<()> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let now = Utc::now();

    let mut users: Vec<UserRecord> = Vec::new();
    for i in 0..user_count {
        let username = format!("demo_user_{:02}", i + 1);
        // Reruns against the same database log the existing account back in.
        let user = match accounts.register(&username, DEMO_PASSWORD, Role::User, now) {
            Ok(user) => user,
            Err(DeskError::DuplicateUsername { .. }) => {
                accounts.login(&username, DEMO_PASSWORD, Some(Role::User))?
            }
            Err(e) => return Err(e.into()),
        };
        users.push(user);
    }
    if users.is_empty() {
        log::warn!("no demo users requested, skipping orders and complaints");
        return Ok(());
    }

    let mut orders_by_user: HashMap<UserId, Vec<OrderId>> = HashMap::new();
    for _ in 0..order_count {
        let user = &users[rng.gen_range(0..users.len())];
        let restaurant = RESTAURANTS[rng.gen_range(0..RESTAURANTS.len())];
        let picked: Vec<&str> = (0..rng.gen_range(1..=3))
            .map(|_| MENU_ITEMS[rng.gen_range(0..MENU_ITEMS.len())])
            .collect();
        let total = (rng.gen_range(8.0..45.0f64) * 100.0).round() / 100.0;
        let placed_at = now - Duration::hours(rng.gen_range(1..240));
        let order = orders.place(user.user_id, restaurant, &picked.join(", "), total, placed_at)?;
        orders_by_user
            .entry(user.user_id)
            .or_default()
            .push(order.order_id);
    }

    if !complaints.classification_available() {
        log::warn!("running degraded, seeding no complaints");
        return Ok(());
    }
    for i in 0..complaint_count {
        let user = &users[rng.gen_range(0..users.len())];
        let order_id = match orders_by_user.get(&user.user_id) {
            Some(ids) if rng.gen_bool(0.7) => Some(ids[rng.gen_range(0..ids.len())]),
            _ => None,
        };
        let text = SAMPLE_COMPLAINTS[rng.gen_range(0..SAMPLE_COMPLAINTS.len())];
        let submitted_at = now - Duration::hours(rng.gen_range(0..72));
        let receipt = complaints.submit(user.user_id, order_id, text, submitted_at)?;
        if i % 3 != 0 {
            let status = ADVANCED_STATUSES[rng.gen_range(0..ADVANCED_STATUSES.len())];
            let response = if rng.gen_bool(0.6) {
                Some(RESPONSES[rng.gen_range(0..RESPONSES.len())])
            } else {
                None
            };
            complaints.update_status(receipt.complaint_id, status, response)?;
        }
    }
    log::info!("seeded {user_count} users, {order_count} orders, {complaint_count} complaints");
    Ok(())
}

fn print_summary(store: &DeskStore, reports: &ComplaintReports) -> Result<()> {
    println!("=== DESK SUMMARY ===");
    println!("  schema version: {}", store.schema_version()?);
    println!("  users:          {}", store.user_count()?);
    println!("  orders:         {}", store.order_count()?);
    println!("  complaints:     {}", store.complaint_count()?);

    println!();
    println!("=== CATEGORY COUNTS ===");
    let counts = reports.category_counts()?;
    if counts.is_empty() {
        println!("  (no complaints on file)");
    } else {
        for (category, count) in &counts {
            println!("  {category:<24} {count}");
        }
    }

    println!();
    println!("=== RECENT COMPLAINTS ===");
    let today = Utc::now().date_naive();
    let listings = reports.list(Viewer::Admin, &ComplaintFilter::default(), today)?;
    for listing in listings.iter().take(8) {
        let c = &listing.complaint;
        println!(
            "  #{:<4} [{:<13}] {:<24} {}: \"{}\"",
            c.complaint_id,
            c.status,
            c.category,
            listing.username,
            truncate(&c.text, 44)
        );
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

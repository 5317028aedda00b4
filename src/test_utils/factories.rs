//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    client::{Client, ClientStatus},
    subscription::{BillingRecord, BillingRecordStatus, SubscriptionData},
    subscription_plan::PlanId,
    user::UserProfile,
};

/// Fixed timestamp for profile and client creation dates.
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

/// Create a test user profile on the basic plan with a unique e-mail.
pub fn create_test_user(overrides: impl FnOnce(&mut UserProfile)) -> UserProfile {
    let id = Uuid::new_v4();
    let mut user = UserProfile {
        id,
        name: "Test Diyetisyen".to_string(),
        email: format!("dyt-{}@example.com", id.simple()),
        subscription: PlanId::Basic,
        created_at: test_datetime(),
    };
    overrides(&mut user);
    user
}

/// Create a basic-plan trial that started at `now` and runs 14 days.
pub fn create_test_subscription(
    now: DateTime<Utc>,
    overrides: impl FnOnce(&mut SubscriptionData),
) -> SubscriptionData {
    let mut subscription = SubscriptionData::new_trial(PlanId::Basic, now, 14);
    overrides(&mut subscription);
    subscription
}

/// Create a paid basic-plan billing record dated `date`.
pub fn create_test_billing_record(
    date: DateTime<Utc>,
    overrides: impl FnOnce(&mut BillingRecord),
) -> BillingRecord {
    let plan = PlanId::Basic.plan();
    let mut record = BillingRecord {
        date,
        amount_cents: plan.price_cents,
        currency: plan.currency.to_string(),
        plan_name: plan.name.to_string(),
        status: BillingRecordStatus::Paid,
        invoice_id: "INV-0000TEST".to_string(),
    };
    overrides(&mut record);
    record
}

/// Create an active test client.
pub fn create_test_client(overrides: impl FnOnce(&mut Client)) -> Client {
    let mut client = Client {
        id: Uuid::new_v4(),
        full_name: "Test Danışan".to_string(),
        email: Some("danisan@example.com".to_string()),
        phone: None,
        notes: None,
        status: ClientStatus::Active,
        created_at: test_datetime(),
        updated_at: None,
    };
    overrides(&mut client);
    client
}

/// Create `count` clients sharing `status`.
pub fn create_test_clients(count: usize, status: ClientStatus) -> Vec<Client> {
    (0..count)
        .map(|i| {
            create_test_client(|c| {
                c.full_name = format!("Danışan {}", i + 1);
                c.status = status;
            })
        })
        .collect()
}

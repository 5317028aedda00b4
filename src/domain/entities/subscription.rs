use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{subscription_plan::PlanId, subscription_status::SubscriptionStatus};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Days-until-expiry values that trigger a renewal reminder.
pub const RENEWAL_REMINDER_DAYS: RangeInclusive<i64> = 1..=2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingRecordStatus {
    Paid,
    Pending,
    Failed,
}

/// One entry of the append-only billing history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecord {
    pub date: DateTime<Utc>,
    pub amount_cents: i64,
    pub currency: String,
    pub plan_name: String,
    pub status: BillingRecordStatus,
    pub invoice_id: String,
}

/// Per-user subscription state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionData {
    pub plan: PlanId,
    pub trial_start_date: DateTime<Utc>,
    pub trial_end_date: DateTime<Utc>,
    pub is_trial_active: bool,
    pub next_billing_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub billing_history: Vec<BillingRecord>,
}

impl SubscriptionData {
    /// A fresh trial starting at `now`. Billing starts when the trial ends.
    pub fn new_trial(plan: PlanId, now: DateTime<Utc>, trial_days: i64) -> Self {
        let trial_end = now + Duration::days(trial_days);
        Self {
            plan,
            trial_start_date: now,
            trial_end_date: trial_end,
            is_trial_active: true,
            next_billing_date: trial_end,
            status: SubscriptionStatus::Trial,
            billing_history: Vec::new(),
        }
    }

    /// The instant the current trial or billing period ends.
    pub fn period_end(&self) -> DateTime<Utc> {
        if self.is_trial_active {
            self.trial_end_date
        } else {
            self.next_billing_date
        }
    }

    /// Whole days until the current period ends, rounded up.
    ///
    /// Negative once the period has lapsed. A remaining 36 hours counts as
    /// 2 days so a reminder stays visible through the final partial day.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        let remaining_ms = (self.period_end() - now).num_milliseconds();
        ceil_div(remaining_ms, MILLIS_PER_DAY)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status.is_expired() || self.days_until_expiry(now) <= 0
    }

    pub fn transition_to(&mut self, next: SubscriptionStatus) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Invalid subscription transition: {} -> {}",
                self.status, next
            ));
        }
        self.status = next;
        Ok(())
    }
}

pub fn in_renewal_window(days_until_expiry: i64) -> bool {
    RENEWAL_REMINDER_DAYS.contains(&days_until_expiry)
}

// Integer division truncates toward zero, which is already the ceiling for
// negative quotients.
fn ceil_div(value: i64, divisor: i64) -> i64 {
    let quotient = value / divisor;
    if value % divisor > 0 {
        quotient + 1
    } else {
        quotient
    }
}

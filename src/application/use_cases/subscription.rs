use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use rand::RngCore;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        subscription::{BillingRecord, BillingRecordStatus, SubscriptionData},
        subscription_plan::{PlanId, SubscriptionPlan, catalog},
        subscription_status::SubscriptionStatus,
    },
    use_cases::{client::ClientRepo, user::UserProfileRepo},
};

/// Persisted subscription state, one record per user.
///
/// A malformed stored record reads back as `None`.
#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<SubscriptionData>>;
    async fn save(&self, user_id: Uuid, subscription: &SubscriptionData) -> AppResult<()>;
}

#[derive(Clone)]
pub struct SubscriptionUseCases {
    repo: Arc<dyn SubscriptionRepo>,
    user_repo: Arc<dyn UserProfileRepo>,
    client_repo: Arc<dyn ClientRepo>,
    trial_days: i64,
}

impl SubscriptionUseCases {
    pub fn new(
        repo: Arc<dyn SubscriptionRepo>,
        user_repo: Arc<dyn UserProfileRepo>,
        client_repo: Arc<dyn ClientRepo>,
        trial_days: i64,
    ) -> Self {
        Self {
            repo,
            user_repo,
            client_repo,
            trial_days,
        }
    }

    pub fn list_plans(&self) -> Vec<&'static SubscriptionPlan> {
        catalog()
    }

    pub async fn get_subscription(&self, user_id: Uuid) -> AppResult<Option<SubscriptionData>> {
        self.repo.get(user_id).await
    }

    /// Billing history, most recent first.
    pub async fn billing_history(&self, user_id: Uuid) -> AppResult<Vec<BillingRecord>> {
        let subscription = self.repo.get(user_id).await?.ok_or(AppError::NotFound)?;
        let mut history = subscription.billing_history;
        history.reverse();
        Ok(history)
    }

    pub async fn start_trial(&self, user_id: Uuid, plan: PlanId) -> AppResult<SubscriptionData> {
        self.start_trial_at(user_id, plan, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn start_trial_at(
        &self,
        user_id: Uuid,
        plan: PlanId,
        now: DateTime<Utc>,
    ) -> AppResult<SubscriptionData> {
        if self.repo.get(user_id).await?.is_some() {
            return Err(AppError::InvalidInput(
                "Subscription already exists for this user".into(),
            ));
        }

        let subscription = SubscriptionData::new_trial(plan, now, self.trial_days);
        self.repo.save(user_id, &subscription).await?;

        tracing::info!(
            user_id = %user_id,
            plan = %plan,
            trial_end = %subscription.trial_end_date,
            "Trial started"
        );
        Ok(subscription)
    }

    pub async fn change_plan(&self, user_id: Uuid, plan: PlanId) -> AppResult<SubscriptionData> {
        self.change_plan_at(user_id, plan, Utc::now()).await
    }

    /// Switches to `plan` and charges its first month.
    ///
    /// Works from any state, including a lapsed subscription. Downgrading below
    /// the current client count is allowed; existing clients stay.
    #[instrument(skip(self))]
    pub async fn change_plan_at(
        &self,
        user_id: Uuid,
        plan: PlanId,
        now: DateTime<Utc>,
    ) -> AppResult<SubscriptionData> {
        let mut subscription = match self.repo.get(user_id).await? {
            Some(existing) => existing,
            None => SubscriptionData::new_trial(plan, now, 0),
        };
        let previous = subscription.plan;

        if !plan.is_upgrade_from(previous) {
            self.warn_if_over_quota(user_id, previous, plan).await?;
        }

        subscription
            .transition_to(SubscriptionStatus::Active)
            .map_err(AppError::InvalidInput)?;
        subscription.plan = plan;
        subscription.is_trial_active = false;
        subscription.next_billing_date = add_billing_month(now)?;
        subscription.billing_history.push(paid_record(plan, now));

        self.repo.save(user_id, &subscription).await?;
        self.user_repo.update_plan(user_id, plan).await?;

        tracing::info!(
            user_id = %user_id,
            from = %previous,
            to = %plan,
            next_billing = %subscription.next_billing_date,
            "Plan changed"
        );
        Ok(subscription)
    }

    async fn warn_if_over_quota(&self, user_id: Uuid, from: PlanId, to: PlanId) -> AppResult<()> {
        let Some(limit) = to.plan().client_quota.limit() else {
            return Ok(());
        };
        if let Some(count) = self.client_repo.count_non_archived(user_id).await? {
            if count > limit as usize {
                tracing::warn!(
                    user_id = %user_id,
                    from = %from,
                    to = %to,
                    count,
                    limit,
                    "Downgrade leaves client count above the new quota"
                );
            }
        }
        Ok(())
    }

    pub async fn renew(&self, user_id: Uuid) -> AppResult<SubscriptionData> {
        self.renew_at(user_id, Utc::now()).await
    }

    /// Rolls the billing cycle forward one month and charges the current plan.
    #[instrument(skip(self))]
    pub async fn renew_at(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<SubscriptionData> {
        let mut subscription = self.repo.get(user_id).await?.ok_or(AppError::NotFound)?;

        subscription
            .transition_to(SubscriptionStatus::Active)
            .map_err(AppError::InvalidInput)?;

        // Early renewals extend the current period instead of discarding it
        let base = subscription.period_end().max(now);
        subscription.is_trial_active = false;
        subscription.next_billing_date = add_billing_month(base)?;
        subscription
            .billing_history
            .push(paid_record(subscription.plan, now));

        self.repo.save(user_id, &subscription).await?;

        tracing::info!(
            user_id = %user_id,
            plan = %subscription.plan,
            next_billing = %subscription.next_billing_date,
            "Subscription renewed"
        );
        Ok(subscription)
    }

    pub async fn sync_status(&self, user_id: Uuid) -> AppResult<bool> {
        self.sync_status_at(user_id, Utc::now()).await
    }

    /// Moves a lapsed trial or billing period to `expired`.
    ///
    /// Returns whether the stored record changed.
    pub async fn sync_status_at(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let Some(mut subscription) = self.repo.get(user_id).await? else {
            return Ok(false);
        };

        if subscription.status.is_expired() || subscription.days_until_expiry(now) > 0 {
            return Ok(false);
        }

        let was_trial = subscription.is_trial_active;
        subscription
            .transition_to(SubscriptionStatus::Expired)
            .map_err(AppError::Internal)?;
        subscription.is_trial_active = false;
        self.repo.save(user_id, &subscription).await?;

        tracing::info!(user_id = %user_id, was_trial, "Subscription expired");
        Ok(true)
    }

    /// Syncs every registered user. One failing user does not stop the sweep.
    #[instrument(skip(self))]
    pub async fn sweep_statuses(&self) -> AppResult<usize> {
        let now = Utc::now();
        let mut expired = 0;
        for user_id in self.user_repo.list_ids().await? {
            match self.sync_status_at(user_id, now).await {
                Ok(true) => expired += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(user_id = %user_id, error = %err, "Subscription sync failed");
                }
            }
        }
        if expired > 0 {
            tracing::info!(expired, "Subscription sweep finished");
        }
        Ok(expired)
    }
}

fn add_billing_month(from: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    from.checked_add_months(Months::new(1))
        .ok_or_else(|| AppError::Internal("Billing date out of range".into()))
}

fn paid_record(plan: PlanId, now: DateTime<Utc>) -> BillingRecord {
    let plan = plan.plan();
    BillingRecord {
        date: now,
        amount_cents: plan.price_cents,
        currency: plan.currency.to_string(),
        plan_name: plan.name.to_string(),
        status: BillingRecordStatus::Paid,
        invoice_id: generate_invoice_id(),
    }
}

fn generate_invoice_id() -> String {
    let mut bytes = [0u8; 4];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    format!("INV-{}", hex::encode_upper(bytes))
}

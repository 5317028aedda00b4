use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::{
        subscription::{SubscriptionData, in_renewal_window},
        subscription_plan::{ClientQuota, SubscriptionPlan},
    },
    use_cases::{client::ClientRepo, subscription::SubscriptionRepo, user::UserProfileRepo},
};

pub const NO_SUBSCRIPTION_MESSAGE: &str =
    "Abonelik bilgisi bulunamadı. Lütfen bir plan seçin.";
pub const EXPIRED_MESSAGE: &str =
    "Aboneliğinizin süresi dolmuş. Danışan eklemek için lütfen aboneliğinizi yenileyin.";
pub const TRIAL_ENDED_MESSAGE: &str =
    "Deneme süreniz sona erdi. Devam etmek için bir plan seçin.";
pub const CLIENT_RECORDS_UNREADABLE_MESSAGE: &str =
    "Danışan kayıtlarınız okunamadı. Lütfen destek ekibiyle iletişime geçin.";

/// Outcome of the add-client gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLimitDecision {
    pub can_add: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ClientLimitDecision {
    pub fn allow() -> Self {
        Self {
            can_add: true,
            message: None,
        }
    }

    pub fn allow_with(message: String) -> Self {
        Self {
            can_add: true,
            message: Some(message),
        }
    }

    pub fn deny(message: impl Into<String>) -> Self {
        Self {
            can_add: false,
            message: Some(message.into()),
        }
    }
}

/// Read-only evaluation of a user's plan, trial window and client quota.
///
/// Absent or unreadable state always resolves to the restrictive outcome.
/// Nothing here writes to the stores.
#[derive(Clone)]
pub struct EntitlementUseCases {
    user_repo: Arc<dyn UserProfileRepo>,
    subscription_repo: Arc<dyn SubscriptionRepo>,
    client_repo: Arc<dyn ClientRepo>,
}

impl EntitlementUseCases {
    pub fn new(
        user_repo: Arc<dyn UserProfileRepo>,
        subscription_repo: Arc<dyn SubscriptionRepo>,
        client_repo: Arc<dyn ClientRepo>,
    ) -> Self {
        Self {
            user_repo,
            subscription_repo,
            client_repo,
        }
    }

    pub async fn check_client_limit(&self, user_id: Uuid) -> AppResult<ClientLimitDecision> {
        self.check_client_limit_at(user_id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn check_client_limit_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<ClientLimitDecision> {
        let profile = self.user_repo.get_by_id(user_id).await?;
        let subscription = self.subscription_repo.get(user_id).await?;

        let (Some(_), Some(subscription)) = (profile, subscription) else {
            tracing::info!(user_id = %user_id, "No subscription information, client add denied");
            return Ok(ClientLimitDecision::deny(NO_SUBSCRIPTION_MESSAGE));
        };

        if subscription.status.is_expired() {
            return Ok(ClientLimitDecision::deny(EXPIRED_MESSAGE));
        }

        let plan = subscription.plan.plan();
        let ClientQuota::Limited(limit) = plan.client_quota else {
            return Ok(ClientLimitDecision::allow());
        };

        let Some(count) = self.client_repo.count_non_archived(user_id).await? else {
            tracing::warn!(user_id = %user_id, "Client list unreadable, client add denied");
            return Ok(ClientLimitDecision::deny(CLIENT_RECORDS_UNREADABLE_MESSAGE));
        };

        if !plan.client_quota.allows_another(count) {
            tracing::info!(
                user_id = %user_id,
                plan = %plan.id,
                count,
                limit,
                "Client quota reached"
            );
            return Ok(ClientLimitDecision::deny(quota_exceeded_message(
                plan, count, limit,
            )));
        }

        let days = subscription.days_until_expiry(now);
        if in_renewal_window(days) {
            return Ok(ClientLimitDecision::allow_with(renewal_reminder_message(
                &subscription,
                days,
            )));
        }

        Ok(ClientLimitDecision::allow())
    }

    pub async fn is_subscription_expired(&self, user_id: Uuid) -> AppResult<bool> {
        self.is_subscription_expired_at(user_id, Utc::now()).await
    }

    pub async fn is_subscription_expired_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(match self.subscription_repo.get(user_id).await? {
            Some(subscription) => subscription.is_expired_at(now),
            None => true,
        })
    }

    /// Banner text for page load, independent of any gated action.
    pub async fn get_subscription_warning(&self, user_id: Uuid) -> AppResult<Option<String>> {
        self.get_subscription_warning_at(user_id, Utc::now()).await
    }

    pub async fn get_subscription_warning_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<String>> {
        let Some(subscription) = self.subscription_repo.get(user_id).await? else {
            return Ok(None);
        };
        Ok(subscription_warning(&subscription, now))
    }
}

pub fn subscription_warning(subscription: &SubscriptionData, now: DateTime<Utc>) -> Option<String> {
    let days = subscription.days_until_expiry(now);
    if subscription.status.is_expired() || days <= 0 {
        // Never billed means the lapse was the trial running out
        let message = if subscription.billing_history.is_empty() {
            TRIAL_ENDED_MESSAGE
        } else {
            EXPIRED_MESSAGE
        };
        return Some(message.to_string());
    }
    if in_renewal_window(days) {
        return Some(renewal_reminder_message(subscription, days));
    }
    None
}

fn quota_exceeded_message(plan: &SubscriptionPlan, count: usize, limit: u32) -> String {
    format!(
        "{} planınızın danışan limitine ulaştınız ({}/{}). Daha fazla danışan eklemek için planınızı yükseltin.",
        plan.name, count, limit
    )
}

fn renewal_reminder_message(subscription: &SubscriptionData, days: i64) -> String {
    if subscription.is_trial_active {
        format!(
            "Deneme sürenizin bitmesine {} gün kaldı. Kesintisiz kullanım için bir plan seçin.",
            days
        )
    } else {
        format!("Aboneliğinizin yenilenmesine {} gün kaldı.", days)
    }
}

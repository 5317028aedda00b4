use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::{KvPersistence, keys},
    app_error::AppResult,
    domain::entities::subscription::SubscriptionData,
    use_cases::subscription::SubscriptionRepo,
};

#[async_trait]
impl SubscriptionRepo for KvPersistence {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<SubscriptionData>> {
        self.read_record(&keys::subscription(user_id), "subscription")
            .await
    }

    async fn save(&self, user_id: Uuid, subscription: &SubscriptionData) -> AppResult<()> {
        self.write_record(&keys::subscription(user_id), subscription)
            .await
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::{KvPersistence, decode_record, keys},
    app_error::{AppError, AppResult},
    domain::entities::{subscription_plan::PlanId, user::UserProfile},
    use_cases::user::UserProfileRepo,
};

impl KvPersistence {
    async fn read_user_index(&self) -> AppResult<Vec<Uuid>> {
        match self.store.get(keys::USERS).await? {
            None => Ok(Vec::new()),
            Some(raw) => decode_record(&raw, "user_index", keys::USERS)
                .ok_or_else(|| AppError::Internal("User index is unreadable".into())),
        }
    }
}

#[async_trait]
impl UserProfileRepo for KvPersistence {
    async fn get_by_id(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        self.read_record(&keys::user(user_id), "user_profile").await
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let user_id: Option<Uuid> = self
            .read_record(&keys::user_email(email), "user_email")
            .await?;
        match user_id {
            Some(user_id) => self.get_by_id(user_id).await,
            None => Ok(None),
        }
    }

    async fn create(&self, profile: &UserProfile) -> AppResult<()> {
        let mut index = self.read_user_index().await?;

        self.write_record(&keys::user(profile.id), profile).await?;
        self.write_record(&keys::user_email(&profile.email), &profile.id)
            .await?;

        if !index.contains(&profile.id) {
            index.push(profile.id);
            self.write_record(keys::USERS, &index).await?;
        }
        Ok(())
    }

    async fn update_plan(&self, user_id: Uuid, plan: PlanId) -> AppResult<()> {
        let mut profile = self.get_by_id(user_id).await?.ok_or(AppError::NotFound)?;
        profile.subscription = plan;
        self.write_record(&keys::user(user_id), &profile).await
    }

    async fn list_ids(&self) -> AppResult<Vec<Uuid>> {
        self.read_user_index().await
    }
}

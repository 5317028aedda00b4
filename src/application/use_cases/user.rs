use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{subscription_plan::PlanId, user::UserProfile},
    use_cases::subscription::SubscriptionUseCases,
    validators::{is_valid_email, is_valid_person_name, normalize_email},
};

#[async_trait]
pub trait UserProfileRepo: Send + Sync {
    async fn get_by_id(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;
    /// Expects an already normalized e-mail.
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
    async fn create(&self, profile: &UserProfile) -> AppResult<()>;
    async fn update_plan(&self, user_id: Uuid, plan: PlanId) -> AppResult<()>;
    async fn list_ids(&self) -> AppResult<Vec<Uuid>>;
}

/// Password-less registration and login by e-mail.
#[derive(Clone)]
pub struct AuthUseCases {
    repo: Arc<dyn UserProfileRepo>,
    subscriptions: Arc<SubscriptionUseCases>,
    // Held from the duplicate-email check until the profile is indexed.
    registration: Arc<Mutex<()>>,
}

impl AuthUseCases {
    pub fn new(repo: Arc<dyn UserProfileRepo>, subscriptions: Arc<SubscriptionUseCases>) -> Self {
        Self {
            repo,
            subscriptions,
            registration: Arc::new(Mutex::new(())),
        }
    }

    /// Creates the profile and starts its trial on `plan` (default basic).
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        plan: Option<PlanId>,
    ) -> AppResult<UserProfile> {
        if !is_valid_person_name(name) {
            return Err(AppError::InvalidInput("Name must be 1-100 characters".into()));
        }
        if !is_valid_email(email) {
            return Err(AppError::InvalidInput("Invalid email".into()));
        }
        let email = normalize_email(email);

        let _guard = self.registration.lock().await;
        if self.repo.get_by_email(&email).await?.is_some() {
            return Err(AppError::InvalidInput("Email is already registered".into()));
        }

        let plan = plan.unwrap_or_default();
        let profile = UserProfile {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email,
            subscription: plan,
            created_at: Utc::now(),
        };
        self.repo.create(&profile).await?;
        self.subscriptions.start_trial(profile.id, plan).await?;

        tracing::info!(user_id = %profile.id, plan = %plan, "User registered");
        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn login(&self, email: &str) -> AppResult<UserProfile> {
        if !is_valid_email(email) {
            return Err(AppError::InvalidCredentials);
        }
        self.repo
            .get_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        self.repo
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

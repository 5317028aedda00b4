//! In-memory wiring of the real use cases for tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;
use secrecy::SecretString;
use time::Duration;
use uuid::Uuid;

use crate::{
    adapters::{
        http::app_state::AppState,
        persistence::{KvPersistence, memory_store::InMemoryKeyValueStore},
    },
    app_error::AppResult,
    application::jwt,
    domain::entities::{client::Client, subscription::SubscriptionData, user::UserProfile},
    infra::{
        config::{AppConfig, StoreBackend},
        setup::build_app_state,
    },
    ports::KeyValueStore,
    use_cases::{
        client::{ClientRepo, ClientUseCases},
        entitlement::EntitlementUseCases,
        subscription::{SubscriptionRepo, SubscriptionUseCases},
        user::{AuthUseCases, UserProfileRepo},
    },
};

pub const TEST_JWT_SECRET: &str = "test-secret-at-least-32-bytes-long!!";

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: SecretString::new(TEST_JWT_SECRET.to_string().into()),
        access_token_ttl: Duration::hours(1),
        cors_origin: "http://localhost:3000".parse().unwrap(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        trial_days: 14,
        subscription_sweep_secs: 3600,
    }
}

/// In-memory store whose reads of keys under `prefix` return the value
/// as of the call, then stall for `delay` before handing it back.
pub struct SlowReadStore {
    inner: InMemoryKeyValueStore,
    prefix: &'static str,
    delay: std::time::Duration,
}

#[async_trait]
impl KeyValueStore for SlowReadStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value = self.inner.get(key).await?;
        if key.starts_with(self.prefix) {
            tokio::time::sleep(self.delay).await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value).await
    }
}

/// One in-memory store with the full use-case graph on top of it.
///
/// # Example
///
/// ```ignore
/// let stores = TestStores::new();
/// let user = create_test_user(|u| u.subscription = PlanId::Basic);
/// stores.seed_user(&user).await;
/// let decision = stores.entitlements().check_client_limit(user.id).await?;
/// ```
pub struct TestStores {
    store: Arc<dyn KeyValueStore>,
    persistence: KvPersistence,
    app_state: AppState,
}

impl TestStores {
    pub fn new() -> Self {
        Self::over(Arc::new(InMemoryKeyValueStore::new()))
    }

    /// Reads of keys starting with `prefix` are delayed, widening the window
    /// between a read and the write that follows it.
    pub fn with_slow_reads(prefix: &'static str, delay: std::time::Duration) -> Self {
        Self::over(Arc::new(SlowReadStore {
            inner: InMemoryKeyValueStore::new(),
            prefix,
            delay,
        }))
    }

    fn over(store: Arc<dyn KeyValueStore>) -> Self {
        let persistence = KvPersistence::new(store.clone());
        let app_state = build_app_state(test_config(), store.clone());
        Self {
            store,
            persistence,
            app_state,
        }
    }

    pub fn app_state(&self) -> AppState {
        self.app_state.clone()
    }

    pub fn auth(&self) -> Arc<AuthUseCases> {
        self.app_state.auth_use_cases.clone()
    }

    pub fn subscriptions(&self) -> Arc<SubscriptionUseCases> {
        self.app_state.subscription_use_cases.clone()
    }

    pub fn entitlements(&self) -> Arc<EntitlementUseCases> {
        self.app_state.entitlement_use_cases.clone()
    }

    pub fn clients(&self) -> Arc<ClientUseCases> {
        self.app_state.client_use_cases.clone()
    }

    pub async fn seed_user(&self, user: &UserProfile) {
        self.persistence.create(user).await.unwrap();
    }

    pub async fn seed_subscription(&self, user_id: Uuid, subscription: &SubscriptionData) {
        self.persistence.save(user_id, subscription).await.unwrap();
    }

    /// Appends `clients` to the user's stored list.
    pub async fn seed_clients(&self, user_id: Uuid, clients: &[Client]) {
        for client in clients {
            self.persistence.insert(user_id, client).await.unwrap();
        }
    }

    /// Writes a raw document, bypassing serialization.
    pub async fn seed_raw(&self, key: &str, value: &str) {
        self.store.set(key, value).await.unwrap();
    }

    pub async fn user_profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.persistence.get_by_id(user_id).await.unwrap()
    }

    pub async fn user_ids(&self) -> Vec<Uuid> {
        self.persistence.list_ids().await.unwrap()
    }

    pub async fn client_count(&self, user_id: Uuid) -> usize {
        self.persistence
            .count_non_archived(user_id)
            .await
            .unwrap()
            .unwrap_or(0)
    }

    /// Session cookie as set by login.
    pub fn session_cookie(&self, user_id: Uuid) -> Cookie<'static> {
        let token = jwt::issue(
            user_id,
            &self.app_state.config.jwt_secret,
            self.app_state.config.access_token_ttl,
        )
        .unwrap();
        Cookie::new("access_token", token)
    }
}

use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{
        client::ClientUseCases, entitlement::EntitlementUseCases,
        subscription::SubscriptionUseCases, user::AuthUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub entitlement_use_cases: Arc<EntitlementUseCases>,
    pub client_use_cases: Arc<ClientUseCases>,
}

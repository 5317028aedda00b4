use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;
use strum::{Display, EnumString};
use time::Duration;

use crate::infra::error::InfraError;

const MAX_TRIAL_DAYS: i64 = 365;

/// Where per-user records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    Memory,
    Postgres,
    Redis,
}

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    /// Required only for the postgres backend.
    pub database_url: Option<String>,
    pub redis_url: String,
    pub trial_days: i64,
    pub subscription_sweep_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| InfraError::ConfigMissing { var: "JWT_SECRET" })?;
        let jwt_secret = SecretString::new(jwt_secret.into());

        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 86_400);

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGIN" })?;

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", String::from("127.0.0.1:3001"))
            .parse()
            .map_err(|_| InfraError::ConfigInvalid { var: "BIND_ADDR" })?;

        let store_backend: StoreBackend = get_env_default("STORE_BACKEND", String::from("memory"))
            .parse()
            .map_err(|_| InfraError::ConfigInvalid {
                var: "STORE_BACKEND",
            })?;

        let database_url: Option<String> = std::env::var("DATABASE_URL").ok();
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let trial_days = validate_trial_days(get_env_default("TRIAL_DAYS", 14))?;
        let subscription_sweep_secs: u64 = get_env_default("SUBSCRIPTION_SWEEP_SECS", 3600);

        Ok(Self {
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            cors_origin,
            bind_addr,
            store_backend,
            database_url,
            redis_url,
            trial_days,
            subscription_sweep_secs: subscription_sweep_secs.max(1),
        })
    }
}

fn validate_trial_days(days: i64) -> Result<i64, InfraError> {
    if (0..=MAX_TRIAL_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(InfraError::ConfigInvalid { var: "TRIAL_DAYS" })
    }
}

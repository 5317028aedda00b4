use std::fs::File;
use std::sync::Arc;

use redis::aio::ConnectionManager;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        http::app_state::AppState,
        persistence::{
            KvPersistence, memory_store::InMemoryKeyValueStore,
            postgres_store::PostgresKeyValueStore, redis_store::RedisKeyValueStore,
        },
    },
    infra::{
        config::{AppConfig, StoreBackend},
        db::init_db,
        error::InfraError,
    },
    ports::KeyValueStore,
    use_cases::{
        client::{ClientRepo, ClientUseCases},
        entitlement::EntitlementUseCases,
        subscription::{SubscriptionRepo, SubscriptionUseCases},
        user::{AuthUseCases, UserProfileRepo},
    },
};

pub async fn init_app_state() -> Result<AppState, InfraError> {
    let config = AppConfig::from_env()?;
    let store = init_store(&config).await?;
    Ok(build_app_state(config, store))
}

async fn init_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>, InfraError> {
    info!(backend = %config.store_backend, "Initializing key-value store");

    let store: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(InfraError::ConfigMissing {
                    var: "DATABASE_URL",
                })?;
            let store = PostgresKeyValueStore::new(init_db(database_url).await?);
            store
                .ensure_schema()
                .await
                .map_err(InfraError::DatabaseSchema)?;
            Arc::new(store)
        }
        StoreBackend::Redis => {
            let client = redis::Client::open(config.redis_url.as_str())?;
            let manager = ConnectionManager::new(client).await?;
            info!("Connected to redis!");
            Arc::new(RedisKeyValueStore::new(manager))
        }
    };
    Ok(store)
}

/// Wires every use case over a single store.
pub fn build_app_state(config: AppConfig, store: Arc<dyn KeyValueStore>) -> AppState {
    let persistence = Arc::new(KvPersistence::new(store));
    let user_repo = persistence.clone() as Arc<dyn UserProfileRepo>;
    let subscription_repo = persistence.clone() as Arc<dyn SubscriptionRepo>;
    let client_repo = persistence as Arc<dyn ClientRepo>;

    let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
        subscription_repo.clone(),
        user_repo.clone(),
        client_repo.clone(),
        config.trial_days,
    ));
    let entitlement_use_cases = Arc::new(EntitlementUseCases::new(
        user_repo.clone(),
        subscription_repo,
        client_repo.clone(),
    ));
    let client_use_cases = Arc::new(ClientUseCases::new(
        client_repo,
        entitlement_use_cases.clone(),
    ));
    let auth_use_cases = Arc::new(AuthUseCases::new(
        user_repo,
        subscription_use_cases.clone(),
    ));

    AppState {
        config: Arc::new(config),
        auth_use_cases,
        subscription_use_cases,
        entitlement_use_cases,
        client_use_cases,
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dietitian_portal=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs); console only if the file cannot be created
    let json_layer = match File::create("app.log") {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(err) => {
            eprintln!("cannot create app.log, file logging disabled: {err}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    app_error::{AppError, AppResult},
    ports::KeyValueStore,
};

pub mod client;
pub mod memory_store;
pub mod postgres_store;
pub mod redis_store;
pub mod subscription;
pub mod user;

const MAX_JSON_LOG_LEN: usize = 200;

/// Repository implementations over any `KeyValueStore`.
///
/// Every record is a camelCase JSON document under a per-user key.
#[derive(Clone)]
pub struct KvPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl KvPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        KvPersistence { store }
    }

    /// Reads and decodes `key`. Malformed documents read back as `None`.
    async fn read_record<T: DeserializeOwned>(
        &self,
        key: &str,
        entity_type: &str,
    ) -> AppResult<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        Ok(decode_record(&raw, entity_type, key))
    }

    async fn write_record<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Failed to serialize {key}: {e}")))?;
        self.store.set(key, &json).await
    }
}

pub(crate) mod keys {
    use uuid::Uuid;

    pub const USERS: &str = "users";

    pub fn user(user_id: Uuid) -> String {
        format!("user:{user_id}")
    }

    pub fn user_email(email: &str) -> String {
        format!("user_email:{email}")
    }

    pub fn subscription(user_id: Uuid) -> String {
        format!("subscription:{user_id}")
    }

    pub fn clients(user_id: Uuid) -> String {
        format!("clients:{user_id}")
    }
}

/// Parse a stored JSON document, logging a warning on failure.
///
/// # Arguments
/// * `raw` - The stored document
/// * `entity_type` - Type of record (e.g., "subscription", "user_profile")
/// * `key` - Storage key (for log filtering)
pub fn decode_record<T: DeserializeOwned>(raw: &str, entity_type: &str, key: &str) -> Option<T> {
    serde_json::from_str(raw)
        .map_err(|err| {
            tracing::warn!(
                entity_type = entity_type,
                key = key,
                raw_json = %truncate_for_log(raw),
                error = %err,
                "Failed to parse stored record, treating as missing"
            );
        })
        .ok()
}

// Truncate raw JSON to prevent log bloat from large client lists
fn truncate_for_log(raw: &str) -> String {
    if raw.chars().count() > MAX_JSON_LOG_LEN {
        let head: String = raw.chars().take(MAX_JSON_LOG_LEN).collect();
        format!("{head}...")
    } else {
        raw.to_string()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            _ => {
                // Log the actual error for debugging, but don't expose details
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!(error = ?err, "Redis error");
        AppError::Database("Key-value store operation failed".into())
    }
}

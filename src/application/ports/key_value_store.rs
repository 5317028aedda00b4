use async_trait::async_trait;

use crate::app_error::AppResult;

/// String key-value storage backing every per-user record.
///
/// Values are opaque JSON documents. A missing key is `Ok(None)`; errors are
/// reserved for transport failures of the backing store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{app_error::AppResult, ports::KeyValueStore};

const KEY_PREFIX: &str = "dietitian";

#[derive(Clone)]
pub struct RedisKeyValueStore {
    manager: ConnectionManager,
}

impl RedisKeyValueStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    fn key(key: &str) -> String {
        format!("{KEY_PREFIX}:{key}")
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(Self::key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.set(Self::key(key), value).await?;
        Ok(())
    }
}

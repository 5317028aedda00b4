use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    adapters::persistence::{KvPersistence, decode_record, keys},
    app_error::{AppError, AppResult},
    domain::entities::client::{Client, ClientStatus},
    use_cases::client::ClientRepo,
};

// Entries are kept as raw JSON so rewrites never drop records this build
// cannot parse.
impl KvPersistence {
    /// `Some(vec![])` for a user with no list yet, `None` if the list is unreadable.
    async fn load_client_entries(&self, user_id: Uuid) -> AppResult<Option<Vec<Value>>> {
        let key = keys::clients(user_id);
        match self.store.get(&key).await? {
            None => Ok(Some(Vec::new())),
            Some(raw) => Ok(decode_record(&raw, "client_list", &key)),
        }
    }

    async fn load_writable_entries(&self, user_id: Uuid) -> AppResult<Vec<Value>> {
        self.load_client_entries(user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Client list is unreadable".into()))
    }

    async fn write_client_entries(&self, user_id: Uuid, entries: &[Value]) -> AppResult<()> {
        self.write_record(&keys::clients(user_id), entries).await
    }
}

fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

// Anything without a readable `archived` status holds a seat.
fn entry_is_archived(entry: &Value) -> bool {
    entry.get("status").and_then(Value::as_str) == Some(ClientStatus::Archived.as_str())
}

fn to_entry(client: &Client) -> AppResult<Value> {
    serde_json::to_value(client)
        .map_err(|e| AppError::Internal(format!("Failed to serialize client: {e}")))
}

#[async_trait]
impl ClientRepo for KvPersistence {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Client>> {
        let Some(entries) = self.load_client_entries(user_id).await? else {
            return Ok(Vec::new());
        };
        Ok(entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Client>(entry) {
                Ok(client) => Some(client),
                Err(err) => {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %err,
                        "Skipping unreadable client entry"
                    );
                    None
                }
            })
            .collect())
    }

    async fn count_non_archived(&self, user_id: Uuid) -> AppResult<Option<usize>> {
        Ok(self
            .load_client_entries(user_id)
            .await?
            .map(|entries| entries.iter().filter(|e| !entry_is_archived(e)).count()))
    }

    async fn insert(&self, user_id: Uuid, client: &Client) -> AppResult<()> {
        let mut entries = self.load_writable_entries(user_id).await?;
        entries.push(to_entry(client)?);
        self.write_client_entries(user_id, &entries).await
    }

    async fn update(&self, user_id: Uuid, client: &Client) -> AppResult<bool> {
        let mut entries = self.load_writable_entries(user_id).await?;
        let id = client.id.to_string();
        let Some(slot) = entries.iter_mut().find(|e| entry_id(e) == Some(id.as_str())) else {
            return Ok(false);
        };
        *slot = to_entry(client)?;
        self.write_client_entries(user_id, &entries).await?;
        Ok(true)
    }
}

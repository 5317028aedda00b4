use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
    Archived,
    /// Any status written by an older client build. Counts toward the quota.
    #[serde(other)]
    Other,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
            ClientStatus::Archived => "archived",
            ClientStatus::Other => "other",
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(self, ClientStatus::Archived)
    }
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ClientStatus::Active),
            "inactive" => Ok(ClientStatus::Inactive),
            "archived" => Ok(ClientStatus::Archived),
            _ => Err(format!("Invalid client status: {}", s)),
        }
    }
}

/// A dietitian's client. Scoped to the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Client {
    /// Case-insensitive match on name, e-mail or phone.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.full_name.to_lowercase().contains(&needle)
            || self
                .email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&needle))
            || self.phone.as_deref().is_some_and(|p| p.contains(&needle))
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::client::{Client, ClientStatus},
    use_cases::entitlement::EntitlementUseCases,
    validators::{is_valid_email, is_valid_person_name},
};

const MAX_NOTES_LEN: usize = 2000;

/// Per-user client list.
#[async_trait]
pub trait ClientRepo: Send + Sync {
    /// Readable clients in stored order. Entries that fail to parse are skipped.
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Client>>;
    /// Number of entries not marked archived, or `None` if the list is unreadable.
    async fn count_non_archived(&self, user_id: Uuid) -> AppResult<Option<usize>>;
    async fn insert(&self, user_id: Uuid, client: &Client) -> AppResult<()>;
    /// Replaces the stored client with the same id. Returns `false` if absent.
    async fn update(&self, user_id: Uuid, client: &Client) -> AppResult<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct CreateClientInput {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Partial update. `None` leaves the field unchanged; an empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateClientInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub status: Option<ClientStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientListFilter {
    /// `None` lists everything except archived clients.
    pub status: Option<ClientStatus>,
    pub search: Option<String>,
}

/// A newly added client plus any advisory from the limit check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedClient {
    pub client: Client,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct ClientUseCases {
    repo: Arc<dyn ClientRepo>,
    entitlements: Arc<EntitlementUseCases>,
    // Held across every read-modify-write of a client list, including the
    // limit check that precedes an add or restore.
    gate: Arc<Mutex<()>>,
}

impl ClientUseCases {
    pub fn new(repo: Arc<dyn ClientRepo>, entitlements: Arc<EntitlementUseCases>) -> Self {
        Self {
            repo,
            entitlements,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Newest first.
    pub async fn list_clients(
        &self,
        user_id: Uuid,
        filter: &ClientListFilter,
    ) -> AppResult<Vec<Client>> {
        let search = filter.search.as_deref().unwrap_or("");
        let mut clients: Vec<Client> = self
            .repo
            .list_by_user(user_id)
            .await?
            .into_iter()
            .filter(|c| match filter.status {
                Some(status) => c.status == status,
                None => !c.status.is_archived(),
            })
            .filter(|c| c.matches_search(search))
            .collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(clients)
    }

    pub async fn get_client(&self, user_id: Uuid, client_id: Uuid) -> AppResult<Client> {
        self.repo
            .list_by_user(user_id)
            .await?
            .into_iter()
            .find(|c| c.id == client_id)
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self, input))]
    pub async fn add_client(&self, user_id: Uuid, input: CreateClientInput) -> AppResult<AddedClient> {
        let full_name = validate_name(&input.full_name)?;
        let email = normalize_optional_email(input.email)?;
        let phone = normalize_optional(input.phone);
        let notes = validate_notes(input.notes)?;

        let _guard = self.gate.lock().await;

        let decision = self.entitlements.check_client_limit(user_id).await?;
        if !decision.can_add {
            return Err(AppError::EntitlementDenied(
                decision.message.unwrap_or_default(),
            ));
        }

        let client = Client {
            id: Uuid::new_v4(),
            full_name,
            email,
            phone,
            notes,
            status: ClientStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.repo.insert(user_id, &client).await?;

        tracing::info!(user_id = %user_id, client_id = %client.id, "Client added");
        Ok(AddedClient {
            client,
            message: decision.message,
        })
    }

    #[instrument(skip(self, input))]
    pub async fn update_client(
        &self,
        user_id: Uuid,
        client_id: Uuid,
        input: UpdateClientInput,
    ) -> AppResult<Client> {
        let _guard = self.gate.lock().await;

        let mut client = self.get_client(user_id, client_id).await?;

        if let Some(name) = input.full_name {
            client.full_name = validate_name(&name)?;
        }
        if input.email.is_some() {
            client.email = normalize_optional_email(input.email)?;
        }
        if input.phone.is_some() {
            client.phone = normalize_optional(input.phone);
        }
        if input.notes.is_some() {
            client.notes = validate_notes(input.notes)?;
        }
        if let Some(status) = input.status {
            let settable = matches!(status, ClientStatus::Active | ClientStatus::Inactive);
            if client.status.is_archived() || !settable {
                return Err(AppError::InvalidInput(
                    "Status can only change between active and inactive; use archive or restore"
                        .into(),
                ));
            }
            client.status = status;
        }

        client.updated_at = Some(Utc::now());
        self.save(user_id, &client).await?;
        Ok(client)
    }

    /// Idempotent: archiving an archived client returns it unchanged.
    #[instrument(skip(self))]
    pub async fn archive_client(&self, user_id: Uuid, client_id: Uuid) -> AppResult<Client> {
        let _guard = self.gate.lock().await;

        let mut client = self.get_client(user_id, client_id).await?;
        if client.status.is_archived() {
            return Ok(client);
        }

        client.status = ClientStatus::Archived;
        client.updated_at = Some(Utc::now());
        self.save(user_id, &client).await?;

        tracing::info!(user_id = %user_id, client_id = %client_id, "Client archived");
        Ok(client)
    }

    /// Brings an archived client back, subject to the same quota as adding.
    #[instrument(skip(self))]
    pub async fn restore_client(&self, user_id: Uuid, client_id: Uuid) -> AppResult<Client> {
        let _guard = self.gate.lock().await;

        let mut client = self.get_client(user_id, client_id).await?;
        if !client.status.is_archived() {
            return Ok(client);
        }

        let decision = self.entitlements.check_client_limit(user_id).await?;
        if !decision.can_add {
            return Err(AppError::EntitlementDenied(
                decision.message.unwrap_or_default(),
            ));
        }

        client.status = ClientStatus::Active;
        client.updated_at = Some(Utc::now());
        self.save(user_id, &client).await?;

        tracing::info!(user_id = %user_id, client_id = %client_id, "Client restored");
        Ok(client)
    }

    async fn save(&self, user_id: Uuid, client: &Client) -> AppResult<()> {
        if self.repo.update(user_id, client).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    if !is_valid_person_name(name) {
        return Err(AppError::InvalidInput(
            "Client name must be 1-100 characters".into(),
        ));
    }
    Ok(name.trim().to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_optional_email(email: Option<String>) -> AppResult<Option<String>> {
    match normalize_optional(email) {
        Some(email) if !is_valid_email(&email) => {
            Err(AppError::InvalidInput("Invalid client email".into()))
        }
        other => Ok(other),
    }
}

fn validate_notes(notes: Option<String>) -> AppResult<Option<String>> {
    let notes = normalize_optional(notes);
    if notes
        .as_deref()
        .is_some_and(|n| n.chars().count() > MAX_NOTES_LEN)
    {
        return Err(AppError::InvalidInput("Notes are too long".into()));
    }
    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    use crate::{
        domain::entities::{subscription_plan::PlanId, subscription_status::SubscriptionStatus},
        test_utils::{
            TestStores, create_test_client, create_test_clients, create_test_subscription,
            create_test_user,
        },
    };

    async fn seed_user_on(stores: &TestStores, plan: PlanId, clients: &[Client]) -> Uuid {
        let now = Utc::now();
        let user = create_test_user(|u| u.subscription = plan);
        stores.seed_user(&user).await;
        stores
            .seed_subscription(
                user.id,
                &create_test_subscription(now, |s| {
                    s.plan = plan;
                    s.status = SubscriptionStatus::Active;
                    s.is_trial_active = false;
                    s.next_billing_date = now + Duration::days(20);
                }),
            )
            .await;
        stores.seed_clients(user.id, clients).await;
        user.id
    }

    fn input(name: &str) -> CreateClientInput {
        CreateClientInput {
            full_name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_client_below_quota() {
        let stores = TestStores::new();
        let user_id = seed_user_on(&stores, PlanId::Basic, &[]).await;

        let added = stores
            .clients()
            .add_client(
                user_id,
                CreateClientInput {
                    full_name: "  Zeynep Kaya ".into(),
                    email: Some(" Zeynep@Example.com ".into()),
                    phone: Some("".into()),
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(added.client.full_name, "Zeynep Kaya");
        assert_eq!(added.client.email.as_deref(), Some("Zeynep@Example.com"));
        assert!(added.client.phone.is_none());
        assert_eq!(added.client.status, ClientStatus::Active);
        assert!(added.message.is_none());
        assert_eq!(stores.client_count(user_id).await, 1);
    }

    #[tokio::test]
    async fn test_add_client_at_quota_is_denied() {
        let stores = TestStores::new();
        let user_id = seed_user_on(
            &stores,
            PlanId::Basic,
            &create_test_clients(25, ClientStatus::Active),
        )
        .await;

        let result = stores.clients().add_client(user_id, input("Yeni Danışan")).await;
        match result {
            Err(AppError::EntitlementDenied(message)) => assert!(message.contains("25/25")),
            other => panic!("expected entitlement denial, got {:?}", other),
        }
        assert_eq!(stores.client_count(user_id).await, 25);
    }

    #[tokio::test]
    async fn test_add_client_validates_input() {
        let stores = TestStores::new();
        let user_id = seed_user_on(&stores, PlanId::Basic, &[]).await;
        let clients = stores.clients();

        assert!(matches!(
            clients.add_client(user_id, input("   ")).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            clients
                .add_client(
                    user_id,
                    CreateClientInput {
                        full_name: "Ali".into(),
                        email: Some("not-an-email".into()),
                        ..Default::default()
                    }
                )
                .await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_overshoot() {
        let stores = TestStores::new();
        let user_id = seed_user_on(
            &stores,
            PlanId::Basic,
            &create_test_clients(20, ClientStatus::Active),
        )
        .await;
        let clients = stores.clients();

        let mut handles = Vec::new();
        for i in 0..10 {
            let clients = clients.clone();
            handles.push(tokio::spawn(async move {
                clients.add_client(user_id, input(&format!("Danışan {}", i))).await
            }));
        }
        let mut added = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                added += 1;
            }
        }

        assert_eq!(added, 5);
        assert_eq!(stores.client_count(user_id).await, 25);
    }

    #[tokio::test]
    async fn test_update_racing_add_keeps_both_writes() {
        let stores = TestStores::with_slow_reads("clients:", StdDuration::from_millis(50));
        let existing = create_test_client(|_| {});
        let user_id = seed_user_on(&stores, PlanId::Basic, &[existing.clone()]).await;
        let clients = stores.clients();

        let (added, updated) = tokio::join!(
            clients.add_client(user_id, input("Yeni Danışan")),
            clients.update_client(
                user_id,
                existing.id,
                UpdateClientInput {
                    notes: Some("Laktoz intoleransı".into()),
                    ..Default::default()
                },
            ),
        );
        let added = added.unwrap();
        updated.unwrap();

        let listed = clients
            .list_clients(user_id, &ClientListFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|c| c.id == added.client.id));
        let kept = listed.iter().find(|c| c.id == existing.id).unwrap();
        assert_eq!(kept.notes.as_deref(), Some("Laktoz intoleransı"));
    }

    #[tokio::test]
    async fn test_archive_racing_add_is_not_reverted() {
        let stores = TestStores::with_slow_reads("clients:", StdDuration::from_millis(50));
        let existing = create_test_client(|_| {});
        let user_id = seed_user_on(&stores, PlanId::Basic, &[existing.clone()]).await;
        let clients = stores.clients();

        let (added, archived) = tokio::join!(
            clients.add_client(user_id, input("Yeni Danışan")),
            clients.archive_client(user_id, existing.id),
        );
        added.unwrap();
        archived.unwrap();

        let stored = clients.get_client(user_id, existing.id).await.unwrap();
        assert_eq!(stored.status, ClientStatus::Archived);
        assert_eq!(stores.client_count(user_id).await, 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let stores = TestStores::new();
        let now = Utc::now();
        let older = create_test_client(|c| {
            c.full_name = "Ayşe Yılmaz".into();
            c.created_at = now - Duration::days(3);
        });
        let newer = create_test_client(|c| {
            c.full_name = "Mehmet Öz".into();
            c.status = ClientStatus::Inactive;
            c.created_at = now - Duration::days(1);
        });
        let archived = create_test_client(|c| {
            c.full_name = "Ayten Arşiv".into();
            c.status = ClientStatus::Archived;
        });
        let user_id = seed_user_on(
            &stores,
            PlanId::Basic,
            &[older.clone(), newer.clone(), archived.clone()],
        )
        .await;
        let clients = stores.clients();

        let all = clients
            .list_clients(user_id, &ClientListFilter::default())
            .await
            .unwrap();
        assert_eq!(
            all.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );

        let archived_only = clients
            .list_clients(
                user_id,
                &ClientListFilter {
                    status: Some(ClientStatus::Archived),
                    search: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(archived_only, vec![archived]);

        let searched = clients
            .list_clients(
                user_id,
                &ClientListFilter {
                    status: None,
                    search: Some("AYŞE".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(searched, vec![older]);
    }

    #[tokio::test]
    async fn test_clients_are_scoped_per_user() {
        let stores = TestStores::new();
        let client = create_test_client(|_| {});
        let owner = seed_user_on(&stores, PlanId::Basic, &[client.clone()]).await;
        let other = seed_user_on(&stores, PlanId::Basic, &[]).await;
        let clients = stores.clients();

        assert!(clients.get_client(owner, client.id).await.is_ok());
        assert!(matches!(
            clients.get_client(other, client.id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_client_fields_and_status() {
        let stores = TestStores::new();
        let client = create_test_client(|c| c.phone = Some("05550000000".into()));
        let user_id = seed_user_on(&stores, PlanId::Basic, &[client.clone()]).await;
        let clients = stores.clients();

        let updated = clients
            .update_client(
                user_id,
                client.id,
                UpdateClientInput {
                    notes: Some("Gluten hassasiyeti".into()),
                    phone: Some("".into()),
                    status: Some(ClientStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("Gluten hassasiyeti"));
        assert!(updated.phone.is_none());
        assert_eq!(updated.status, ClientStatus::Inactive);
        assert!(updated.updated_at.is_some());
        assert_eq!(clients.get_client(user_id, client.id).await.unwrap(), updated);

        let archive_via_update = clients
            .update_client(
                user_id,
                client.id,
                UpdateClientInput {
                    status: Some(ClientStatus::Archived),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(archive_via_update, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_archive_is_idempotent_and_frees_quota() {
        let stores = TestStores::new();
        let existing = create_test_clients(25, ClientStatus::Active);
        let first_id = existing[0].id;
        let user_id = seed_user_on(&stores, PlanId::Basic, &existing).await;
        let clients = stores.clients();

        let archived = clients.archive_client(user_id, first_id).await.unwrap();
        assert_eq!(archived.status, ClientStatus::Archived);
        let again = clients.archive_client(user_id, first_id).await.unwrap();
        assert_eq!(again, archived);

        assert!(clients.add_client(user_id, input("Yeni")).await.is_ok());
    }

    #[tokio::test]
    async fn test_restore_is_gated_by_quota() {
        let stores = TestStores::new();
        let mut existing = create_test_clients(25, ClientStatus::Active);
        let archived = create_test_client(|c| c.status = ClientStatus::Archived);
        existing.push(archived.clone());
        let user_id = seed_user_on(&stores, PlanId::Basic, &existing).await;
        let clients = stores.clients();

        assert!(matches!(
            clients.restore_client(user_id, archived.id).await,
            Err(AppError::EntitlementDenied(_))
        ));

        clients.archive_client(user_id, existing[0].id).await.unwrap();
        let restored = clients.restore_client(user_id, archived.id).await.unwrap();
        assert_eq!(restored.status, ClientStatus::Active);
    }
}

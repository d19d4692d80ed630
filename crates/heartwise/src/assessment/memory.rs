use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::domain::{AuthenticatedUser, UserId};
use super::store::{
    is_server_timestamp, Document, DocumentStore, Filter, IdentityError, IdentityProvider,
    OrderBy, StoreError, StoredDocument,
};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;
type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Process-local document store used by the API binary and tests.
///
/// Server timestamps are strictly increasing even when the clock does not advance
/// between writes, so saved history always has a total order.
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
    clock: Clock,
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::with_clock(Utc::now)
    }
}

impl InMemoryDocumentStore {
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            collections: RwLock::new(HashMap::new()),
            clock: Arc::new(clock),
            last_timestamp: Mutex::new(None),
        }
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        let guard = self.collections.read().await;
        guard.get(collection).map(BTreeMap::len).unwrap_or(0)
    }

    fn next_timestamp(&self) -> Result<Value, StoreError> {
        let mut last = self
            .last_timestamp
            .lock()
            .map_err(|_| StoreError::Unavailable("store clock poisoned".to_string()))?;
        let now = (self.clock)();
        let stamped = match *last {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(stamped);
        Ok(Value::String(
            stamped.to_rfc3339_opts(SecondsFormat::Micros, true),
        ))
    }

    fn resolve_sentinels(&self, mut data: Document) -> Result<Document, StoreError> {
        let pending: Vec<String> = data
            .iter()
            .filter(|(_, value)| is_server_timestamp(value))
            .map(|(key, _)| key.clone())
            .collect();

        if !pending.is_empty() {
            let stamp = self.next_timestamp()?;
            for key in pending {
                data.insert(key, stamp.clone());
            }
        }

        Ok(data)
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|data| StoredDocument {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let guard = self.collections.read().await;
        let Some(documents) = guard.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<StoredDocument> = documents
            .iter()
            .filter(|(_, data)| filter.matches(data))
            .filter(|(_, data)| {
                order_by
                    .map(|order| data.contains_key(&order.field))
                    .unwrap_or(true)
            })
            .map(|(id, data)| StoredDocument {
                id: id.clone(),
                data: data.clone(),
            })
            .collect();

        if let Some(order) = order_by {
            matches.sort_by(|left, right| order.compare(&left.data, &right.data));
        }
        if let Some(limit) = limit {
            matches.truncate(limit);
        }

        Ok(matches)
    }

    async fn add(&self, collection: &str, data: Document) -> Result<String, StoreError> {
        let data = self.resolve_sentinels(data)?;
        let id = Uuid::new_v4().simple().to_string();
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Document) -> Result<(), StoreError> {
        let data = self.resolve_sentinels(data)?;
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError> {
        let patch = self.resolve_sentinels(patch)?;
        let mut guard = self.collections.write().await;
        let existing = guard
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| not_found(collection, id))?;
        for (key, value) in patch {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        guard
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .map(|_| ())
            .ok_or_else(|| not_found(collection, id))
    }

    async fn batch_delete(&self, collection: &str, ids: &[String]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut guard = self.collections.write().await;
        let documents = guard
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, &ids[0]))?;

        if let Some(missing) = ids.iter().find(|id| !documents.contains_key(id.as_str())) {
            return Err(not_found(collection, missing));
        }
        for id in ids {
            documents.remove(id);
        }
        Ok(())
    }
}

/// Token-based identity provider kept in memory.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<IdentityState>,
}

#[derive(Default)]
struct IdentityState {
    users: BTreeMap<UserId, AuthenticatedUser>,
    tokens: HashMap<String, UserId>,
}

impl InMemoryIdentityProvider {
    /// Create an account and return it with a fresh access token.
    pub async fn register(&self, email: &str) -> (AuthenticatedUser, String) {
        let user = AuthenticatedUser {
            id: UserId(Uuid::new_v4().simple().to_string()),
            email: email.to_string(),
        };
        let token = Uuid::new_v4().to_string();
        self.register_with_token(user.clone(), &token).await;
        (user, token)
    }

    /// Create (or refresh) an account bound to a caller-chosen token.
    pub async fn register_with_token(&self, user: AuthenticatedUser, token: &str) {
        let mut state = self.accounts.write().await;
        state.tokens.insert(token.to_string(), user.id.clone());
        state.users.insert(user.id.clone(), user);
    }

    pub async fn contains(&self, user_id: &UserId) -> bool {
        self.accounts.read().await.users.contains_key(user_id)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticatedUser>, IdentityError> {
        let state = self.accounts.read().await;
        Ok(state
            .tokens
            .get(access_token)
            .and_then(|user_id| state.users.get(user_id))
            .cloned())
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), IdentityError> {
        let mut state = self.accounts.write().await;
        if state.users.remove(user_id).is_none() {
            return Err(IdentityError::UnknownUser(user_id.clone()));
        }
        state.tokens.retain(|_, owner| owner != user_id);
        Ok(())
    }
}

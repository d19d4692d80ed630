use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::assessment::domain::{
    ActivityLevel, Answer, AuthenticatedUser, DietQuality, Questionnaire, Session,
    SweetConsumption, UserId,
};
use crate::assessment::intake::QuestionnaireSubmission;
use crate::assessment::memory::{InMemoryDocumentStore, InMemoryIdentityProvider};
use crate::assessment::store::{
    Document, DocumentStore, Filter, IdentityError, IdentityProvider, OrderBy, StoreError,
    StoredDocument,
};
use crate::assessment::{assessment_router, AssessmentService};
use crate::config::HistoryDisplayConfig;

pub(super) fn saved_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
}

/// Every rule neutral: scores zero with no risk factors.
pub(super) fn neutral_questionnaire() -> Questionnaire {
    Questionnaire {
        chest_pain: Answer::No,
        sleep_hours: 8,
        work_hours: 8,
        activity_level: ActivityLevel::Moderate,
        diet_quality: DietQuality::Good,
        current_weight: 72.5,
        street_food_frequency: 0,
        gym: Answer::No,
        sweet_consumption: SweetConsumption::Never,
        smoke: Answer::No,
        alcohol: Answer::No,
    }
}

pub(super) fn healthy_questionnaire() -> Questionnaire {
    Questionnaire {
        chest_pain: Answer::No,
        sleep_hours: 8,
        work_hours: 6,
        activity_level: ActivityLevel::Active,
        diet_quality: DietQuality::Excellent,
        current_weight: 68.0,
        street_food_frequency: 0,
        gym: Answer::Yes,
        sweet_consumption: SweetConsumption::Never,
        smoke: Answer::No,
        alcohol: Answer::No,
    }
}

/// Scores 105.
pub(super) fn high_risk_questionnaire() -> Questionnaire {
    Questionnaire {
        chest_pain: Answer::No,
        sleep_hours: 5,
        work_hours: 12,
        activity_level: ActivityLevel::Sedentary,
        diet_quality: DietQuality::Poor,
        current_weight: 98.0,
        street_food_frequency: 5,
        gym: Answer::No,
        sweet_consumption: SweetConsumption::VeryOften,
        smoke: Answer::Yes,
        alcohol: Answer::Yes,
    }
}

pub(super) fn submission(questionnaire: &Questionnaire) -> QuestionnaireSubmission {
    QuestionnaireSubmission::from(questionnaire)
}

pub(super) fn session(id: &str) -> Session {
    Session::new(AuthenticatedUser {
        id: UserId(id.to_string()),
        email: format!("{id}@example.com"),
    })
}

pub(super) type MemoryService = AssessmentService<InMemoryDocumentStore, InMemoryIdentityProvider>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryDocumentStore>,
    Arc<InMemoryIdentityProvider>,
) {
    let store = Arc::new(InMemoryDocumentStore::with_clock(saved_at));
    let identity = Arc::new(InMemoryIdentityProvider::default());
    let service = AssessmentService::new(
        store.clone(),
        identity.clone(),
        HistoryDisplayConfig::default(),
    );
    (service, store, identity)
}

/// Register an account with the identity provider and open a session for it.
pub(super) async fn signed_in(identity: &InMemoryIdentityProvider, email: &str) -> (Session, String) {
    let (user, token) = identity.register(email).await;
    (Session::new(user), token)
}

/// In-memory store whose deletes fail for one chosen collection.
#[derive(Default)]
pub(super) struct FlakyStore {
    pub(super) inner: InMemoryDocumentStore,
    failing_deletes: Mutex<Option<&'static str>>,
}

impl FlakyStore {
    pub(super) fn fail_deletes_in(&self, collection: &'static str) {
        *self.failing_deletes.lock().expect("flaky mutex poisoned") = Some(collection);
    }

    pub(super) fn recover(&self) {
        *self.failing_deletes.lock().expect("flaky mutex poisoned") = None;
    }

    fn check_delete(&self, collection: &str) -> Result<(), StoreError> {
        match *self.failing_deletes.lock().expect("flaky mutex poisoned") {
            Some(failing) if failing == collection => {
                Err(StoreError::PermissionDenied(format!("writes to {collection} rejected")))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.query(collection, filter, order_by, limit).await
    }

    async fn add(&self, collection: &str, data: Document) -> Result<String, StoreError> {
        self.inner.add(collection, data).await
    }

    async fn set(&self, collection: &str, id: &str, data: Document) -> Result<(), StoreError> {
        self.inner.set(collection, id, data).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError> {
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_delete(collection)?;
        self.inner.delete(collection, id).await
    }

    async fn batch_delete(&self, collection: &str, ids: &[String]) -> Result<(), StoreError> {
        self.check_delete(collection)?;
        self.inner.batch_delete(collection, ids).await
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<StoredDocument>, StoreError> {
        Err(StoreError::Unavailable("network offline".to_string()))
    }

    async fn query(
        &self,
        _collection: &str,
        _filter: &Filter,
        _order_by: Option<&OrderBy>,
        _limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        Err(StoreError::Unavailable("network offline".to_string()))
    }

    async fn add(&self, _collection: &str, _data: Document) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("network offline".to_string()))
    }

    async fn set(&self, _collection: &str, _id: &str, _data: Document) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("network offline".to_string()))
    }

    async fn update(&self, _collection: &str, _id: &str, _patch: Document) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("network offline".to_string()))
    }

    async fn delete(&self, _collection: &str, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("network offline".to_string()))
    }

    async fn batch_delete(&self, _collection: &str, _ids: &[String]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("network offline".to_string()))
    }
}

/// Identity provider that insists on a recent sign-in before deleting accounts.
#[derive(Default)]
pub(super) struct StaleLoginIdentity {
    pub(super) inner: InMemoryIdentityProvider,
    allow_deletes: AtomicBool,
}

impl StaleLoginIdentity {
    pub(super) fn reauthenticate(&self) {
        self.allow_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for StaleLoginIdentity {
    async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticatedUser>, IdentityError> {
        self.inner.current_user(access_token).await
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), IdentityError> {
        if !self.allow_deletes.load(Ordering::SeqCst) {
            return Err(IdentityError::RequiresRecentLogin);
        }
        self.inner.delete_user(user_id).await
    }
}

pub(super) fn router_with_service<S, I>(service: AssessmentService<S, I>) -> axum::Router
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

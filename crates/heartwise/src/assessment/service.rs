use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::domain::{
    EntryId, ProfileAttributes, ProfileUpdate, Questionnaire, Session, UserId,
};
use super::history::{
    entry_from_document, load_entries, new_entry_document, owner_filter, HistoryAggregator,
    HistoryTimeline, HistoryView,
};
use super::intake::{IntakeGuard, QuestionnaireSubmission, ValidationError};
use super::scoring::{AssessmentResult, ProfileAdjustedAssessment, RiskEngine};
use super::store::{
    server_timestamp, Document, DocumentStore, IdentityError, IdentityProvider, StoreError,
    ACCOUNT_DELETION_COLLECTION, HISTORY_COLLECTION, PROFILE_COLLECTION,
};
use crate::config::HistoryDisplayConfig;

/// Ordered steps of an account deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStep {
    History,
    Profile,
    Identity,
}

impl DeletionStep {
    pub const ORDER: [DeletionStep; 3] = [
        DeletionStep::History,
        DeletionStep::Profile,
        DeletionStep::Identity,
    ];

    /// Steps that remove user-writable data. These run again on every attempt,
    /// since the account can still write between an interrupted run and its retry.
    pub const fn removes_user_data(self) -> bool {
        matches!(self, DeletionStep::History | DeletionStep::Profile)
    }

    pub const fn label(self) -> &'static str {
        match self {
            DeletionStep::History => "history",
            DeletionStep::Profile => "profile",
            DeletionStep::Identity => "identity",
        }
    }
}

impl fmt::Display for DeletionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Underlying cause of a failed deletion step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeletionFailure {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no signed-in user")]
    NotAuthenticated,
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(
        "account deletion stopped at the {failed} step after completing {}",
        describe_steps(completed)
    )]
    PartialDeletion {
        completed: Vec<DeletionStep>,
        failed: DeletionStep,
        #[source]
        source: DeletionFailure,
    },
}

fn describe_steps(steps: &[DeletionStep]) -> String {
    steps
        .iter()
        .map(|step| step.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<DeletionFailure> for AssessmentError {
    fn from(value: DeletionFailure) -> Self {
        match value {
            DeletionFailure::Store(err) => AssessmentError::Store(err),
            DeletionFailure::Identity(err) => AssessmentError::Identity(err),
        }
    }
}

fn profile_not_found(session: &Session) -> AssessmentError {
    AssessmentError::NotFound {
        resource: "profile",
        id: session.user_id().0.clone(),
    }
}

/// Outcome of a completed account deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeletionReport {
    pub user_id: UserId,
    pub history_entries_removed: usize,
    pub profile_removed: bool,
    /// True when an earlier, interrupted deletion was picked up again.
    pub resumed: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletionMarker {
    #[serde(default)]
    completed_steps: Vec<DeletionStep>,
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "expected an object, serialized to {other}"
        ))),
    }
}

/// Service composing intake, scoring, history and account lifecycle over the store seams.
pub struct AssessmentService<S, I> {
    guard: Arc<IntakeGuard>,
    engine: Arc<RiskEngine>,
    history: Arc<HistoryAggregator>,
    store: Arc<S>,
    identity: Arc<I>,
}

impl<S, I> AssessmentService<S, I>
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    pub fn new(store: Arc<S>, identity: Arc<I>, display: HistoryDisplayConfig) -> Self {
        Self {
            guard: Arc::new(IntakeGuard::new()),
            engine: Arc::new(RiskEngine::new()),
            history: Arc::new(HistoryAggregator::new(display)),
            store,
            identity,
        }
    }

    /// Resolve an access token into an explicit session.
    pub async fn authenticate(&self, access_token: &str) -> Result<Session, AssessmentError> {
        match self.identity.current_user(access_token).await? {
            Some(user) => Ok(Session::new(user)),
            None => Err(AssessmentError::NotAuthenticated),
        }
    }

    pub fn validate(
        &self,
        submission: QuestionnaireSubmission,
    ) -> Result<Questionnaire, AssessmentError> {
        Ok(self.guard.questionnaire_from_submission(submission)?)
    }

    /// Phase one: validate and score, no store access.
    pub fn score_submission(
        &self,
        submission: QuestionnaireSubmission,
    ) -> Result<AssessmentResult, AssessmentError> {
        let questionnaire = self.validate(submission)?;
        Ok(self.engine.score(&questionnaire))
    }

    /// Phase one followed by the awaited profile phase.
    pub async fn assess_with_profile(
        &self,
        session: &Session,
        submission: QuestionnaireSubmission,
    ) -> Result<ProfileAdjustedAssessment, AssessmentError> {
        let base = self.score_submission(submission)?;
        let profile = self.profile(session).await?;
        let adjusted = self.engine.adjust_for_profile(base, profile.as_ref());

        debug!(
            user_id = %session.user_id(),
            base_score = adjusted.base.risk_score,
            adjusted_score = adjusted.adjusted_score,
            profile_found = adjusted.profile_found,
            "assessment scored"
        );

        Ok(adjusted)
    }

    /// Persist a scored assessment. The score is recomputed from the questionnaire being saved.
    pub async fn save_results(
        &self,
        session: &Session,
        submission: QuestionnaireSubmission,
    ) -> Result<HistoryView, AssessmentError> {
        let questionnaire = self.validate(submission)?;
        let result = self.engine.score(&questionnaire);
        let document = new_entry_document(session.user_id(), &questionnaire, &result)?;

        let id = self
            .store
            .add(HISTORY_COLLECTION, document)
            .await
            .map_err(|err| {
                error!(user_id = %session.user_id(), error = %err, "failed to save assessment");
                err
            })?;

        let stored = self
            .store
            .get(HISTORY_COLLECTION, &id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: HISTORY_COLLECTION.to_string(),
                id: id.clone(),
            })?;
        let entry = entry_from_document(stored)?;

        info!(
            user_id = %session.user_id(),
            entry_id = %entry.id,
            risk_score = entry.risk_score,
            "assessment saved"
        );

        Ok(self.history.view(entry))
    }

    pub async fn list_history(&self, session: &Session) -> Result<HistoryTimeline, AssessmentError> {
        let entries = load_entries(self.store.as_ref(), session.user_id())
            .await
            .map_err(|err| {
                error!(user_id = %session.user_id(), error = %err, "failed to load history");
                err
            })?;

        Ok(self.history.timeline(entries))
    }

    /// Remove one entry. Unknown ids and entries owned by someone else both report `NotFound`.
    pub async fn delete_entry(
        &self,
        session: &Session,
        entry_id: &EntryId,
    ) -> Result<(), AssessmentError> {
        let not_found = || AssessmentError::NotFound {
            resource: "history entry",
            id: entry_id.0.clone(),
        };

        let Some(document) = self.store.get(HISTORY_COLLECTION, &entry_id.0).await? else {
            return Err(not_found());
        };
        let entry = entry_from_document(document)?;
        if &entry.user_id != session.user_id() {
            warn!(
                user_id = %session.user_id(),
                entry_id = %entry_id,
                "refusing to delete another user's history entry"
            );
            return Err(not_found());
        }

        match self.store.delete(HISTORY_COLLECTION, &entry_id.0).await {
            Ok(()) => {
                info!(user_id = %session.user_id(), entry_id = %entry_id, "history entry deleted");
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => Err(not_found()),
            Err(err) => {
                error!(entry_id = %entry_id, error = %err, "failed to delete history entry");
                Err(err.into())
            }
        }
    }

    /// Remove every entry the user owns in one atomic batch. Returns how many were removed.
    pub async fn clear_all_history(&self, session: &Session) -> Result<usize, AssessmentError> {
        let removed = self.purge_history(session.user_id()).await.map_err(|err| {
            error!(user_id = %session.user_id(), error = %err, "failed to clear history");
            err
        })?;

        info!(user_id = %session.user_id(), removed, "history cleared");
        Ok(removed)
    }

    async fn purge_history(&self, user_id: &UserId) -> Result<usize, StoreError> {
        let ids: Vec<String> = self
            .store
            .query(HISTORY_COLLECTION, &owner_filter(user_id), None, None)
            .await?
            .into_iter()
            .map(|document| document.id)
            .collect();

        self.store.batch_delete(HISTORY_COLLECTION, &ids).await?;
        Ok(ids.len())
    }

    pub async fn profile(
        &self,
        session: &Session,
    ) -> Result<Option<ProfileAttributes>, AssessmentError> {
        let Some(document) = self
            .store
            .get(PROFILE_COLLECTION, &session.user_id().0)
            .await?
        else {
            return Ok(None);
        };

        let profile = serde_json::from_value(Value::Object(document.data))
            .map_err(StoreError::from)?;
        Ok(Some(profile))
    }

    /// Create or replace the profile document for the session's account.
    pub async fn register_profile(
        &self,
        session: &Session,
        mut profile: ProfileAttributes,
    ) -> Result<ProfileAttributes, AssessmentError> {
        if profile.email.is_none() {
            profile.email = Some(session.user().email.clone());
        }

        let mut document = to_document(&profile)?;
        document.insert("createdAt".to_string(), server_timestamp());
        self.store
            .set(PROFILE_COLLECTION, &session.user_id().0, document)
            .await?;

        info!(user_id = %session.user_id(), "profile registered");
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        update: ProfileUpdate,
    ) -> Result<ProfileAttributes, AssessmentError> {
        if update.is_empty() {
            return self
                .profile(session)
                .await?
                .ok_or_else(|| profile_not_found(session));
        }

        let mut patch = to_document(&update)?;
        patch.insert("lastUpdated".to_string(), server_timestamp());

        match self
            .store
            .update(PROFILE_COLLECTION, &session.user_id().0, patch)
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => return Err(profile_not_found(session)),
            Err(err) => return Err(err.into()),
        }

        self.profile(session)
            .await?
            .ok_or_else(|| profile_not_found(session))
    }

    /// Delete history, then the profile, then the identity.
    ///
    /// Progress is persisted in a deletion marker so an interrupted run can be
    /// retried. A retry repeats the history and profile steps and skips only a
    /// committed identity step.
    pub async fn delete_account(
        &self,
        session: &Session,
    ) -> Result<AccountDeletionReport, AssessmentError> {
        let user_id = session.user_id();
        let (mut completed, resumed) = self.open_deletion_marker(user_id).await?;

        let mut report = AccountDeletionReport {
            user_id: user_id.clone(),
            history_entries_removed: 0,
            profile_removed: false,
            resumed,
        };

        for step in DeletionStep::ORDER {
            let committed = completed.contains(&step);
            if committed && !step.removes_user_data() {
                continue;
            }

            match self.run_deletion_step(step, user_id, &mut report).await {
                Ok(()) if committed => {}
                Ok(()) => {
                    completed.push(step);
                    self.record_deletion_progress(user_id, &completed).await;
                }
                Err(source) if completed.is_empty() => {
                    error!(user_id = %user_id, step = %step, error = %source, "account deletion failed");
                    return Err(source.into());
                }
                Err(source) => {
                    error!(
                        user_id = %user_id,
                        step = %step,
                        completed = %describe_steps(&completed),
                        error = %source,
                        "account partially deleted"
                    );
                    return Err(AssessmentError::PartialDeletion {
                        completed,
                        failed: step,
                        source,
                    });
                }
            }
        }

        if let Err(err) = self
            .store
            .delete(ACCOUNT_DELETION_COLLECTION, &user_id.0)
            .await
        {
            warn!(user_id = %user_id, error = %err, "account deleted but deletion marker remains");
        }

        info!(
            user_id = %user_id,
            history_entries_removed = report.history_entries_removed,
            profile_removed = report.profile_removed,
            resumed = report.resumed,
            "account deleted"
        );
        Ok(report)
    }

    async fn open_deletion_marker(
        &self,
        user_id: &UserId,
    ) -> Result<(Vec<DeletionStep>, bool), AssessmentError> {
        if let Some(existing) = self
            .store
            .get(ACCOUNT_DELETION_COLLECTION, &user_id.0)
            .await?
        {
            let marker: DeletionMarker = serde_json::from_value(Value::Object(existing.data))
                .map_err(StoreError::from)?;
            info!(
                user_id = %user_id,
                completed = %describe_steps(&marker.completed_steps),
                "resuming interrupted account deletion"
            );
            return Ok((marker.completed_steps, true));
        }

        let mut document = to_document(&DeletionMarker::default())?;
        document.insert("userId".to_string(), Value::String(user_id.0.clone()));
        document.insert("startedAt".to_string(), server_timestamp());
        self.store
            .set(ACCOUNT_DELETION_COLLECTION, &user_id.0, document)
            .await?;

        Ok((Vec::new(), false))
    }

    async fn record_deletion_progress(&self, user_id: &UserId, completed: &[DeletionStep]) {
        let patch = match to_document(&DeletionMarker {
            completed_steps: completed.to_vec(),
        }) {
            Ok(patch) => patch,
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "could not encode deletion progress");
                return;
            }
        };

        if let Err(err) = self
            .store
            .update(ACCOUNT_DELETION_COLLECTION, &user_id.0, patch)
            .await
        {
            warn!(user_id = %user_id, error = %err, "could not record deletion progress");
        }
    }

    async fn run_deletion_step(
        &self,
        step: DeletionStep,
        user_id: &UserId,
        report: &mut AccountDeletionReport,
    ) -> Result<(), DeletionFailure> {
        match step {
            DeletionStep::History => {
                report.history_entries_removed = self.purge_history(user_id).await?;
            }
            DeletionStep::Profile => {
                match self.store.delete(PROFILE_COLLECTION, &user_id.0).await {
                    Ok(()) => report.profile_removed = true,
                    Err(StoreError::NotFound { .. }) => {}
                    Err(err) => return Err(err.into()),
                }
            }
            DeletionStep::Identity => match self.identity.delete_user(user_id).await {
                Ok(()) | Err(IdentityError::UnknownUser(_)) => {}
                Err(err) => return Err(err.into()),
            },
        }

        debug!(user_id = %user_id, step = %step, "deletion step committed");
        Ok(())
    }
}

//! Heart-risk self-assessment: questionnaire intake, scoring, profile adjustment,
//! and per-user assessment history over an async document store.

pub mod domain;
pub(crate) mod history;
pub mod intake;
pub mod memory;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    ActivityLevel, Answer, AuthenticatedUser, DietQuality, EntryId, HistoryEntry,
    ProfileAttributes, ProfileUpdate, Questionnaire, Session, SweetConsumption, UserId,
};
pub use history::{HistoryAggregator, HistoryTimeline, HistoryView, TrendPoint};
pub use intake::{FieldValue, IntakeGuard, QuestionnaireSubmission, ValidationError};
pub use memory::{InMemoryDocumentStore, InMemoryIdentityProvider};
pub use router::assessment_router;
pub use scoring::{
    classify, AssessmentResult, ProfileAdjustedAssessment, RiskClass, RiskEngine, RiskLevel,
    RiskRule, ScoreComponent,
};
pub use service::{
    AccountDeletionReport, AssessmentError, AssessmentService, DeletionFailure, DeletionStep,
};
pub use store::{
    DocumentStore, Filter, IdentityError, IdentityProvider, OrderBy, StoreError, StoredDocument,
};

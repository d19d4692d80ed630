use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{EntryId, HistoryEntry, Questionnaire, UserId};
use super::scoring::{AssessmentResult, RiskClass, RiskLevel};
use super::store::{
    server_timestamp, Document, DocumentStore, Filter, OrderBy, StoreError, StoredDocument,
    HISTORY_COLLECTION,
};
use crate::config::HistoryDisplayConfig;

const OWNER_FIELD: &str = "userId";
const TIMESTAMP_FIELD: &str = "timestamp";

/// Stored body of a history document. The id lives on the document, not in the body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRecord {
    user_id: UserId,
    #[serde(flatten)]
    questionnaire: Questionnaire,
    risk_score: u32,
    risk_level: RiskLevel,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewHistoryRecord<'a> {
    user_id: &'a UserId,
    #[serde(flatten)]
    questionnaire: &'a Questionnaire,
    risk_score: u32,
    risk_level: RiskLevel,
}

/// Build the document for a freshly scored assessment; the store stamps `timestamp`.
pub(crate) fn new_entry_document(
    user_id: &UserId,
    questionnaire: &Questionnaire,
    result: &AssessmentResult,
) -> Result<Document, StoreError> {
    let record = NewHistoryRecord {
        user_id,
        questionnaire,
        risk_score: result.risk_score,
        risk_level: result.risk_level,
    };

    let mut document = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::Serialization(format!(
                "history record serialized to {other}"
            )))
        }
    };
    document.insert(TIMESTAMP_FIELD.to_string(), server_timestamp());
    Ok(document)
}

pub(crate) fn entry_from_document(document: StoredDocument) -> Result<HistoryEntry, StoreError> {
    let record: HistoryRecord = serde_json::from_value(Value::Object(document.data))?;
    Ok(HistoryEntry {
        id: EntryId(document.id),
        user_id: record.user_id,
        questionnaire: record.questionnaire,
        risk_score: record.risk_score,
        risk_level: record.risk_level,
        timestamp: record.timestamp,
    })
}

pub(crate) fn owner_filter(user_id: &UserId) -> Filter {
    Filter::field_eq(OWNER_FIELD, user_id.0.clone())
}

/// One query for all of a user's entries, newest first.
pub(crate) async fn load_entries<S>(
    store: &S,
    user_id: &UserId,
) -> Result<Vec<HistoryEntry>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let documents = store
        .query(
            HISTORY_COLLECTION,
            &owner_filter(user_id),
            Some(&OrderBy::descending(TIMESTAMP_FIELD)),
            None,
        )
        .await?;

    documents.into_iter().map(entry_from_document).collect()
}

/// History entry shaped for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub id: EntryId,
    pub timestamp: DateTime<Utc>,
    pub formatted_date: String,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub risk_class: RiskClass,
    #[serde(flatten)]
    pub questionnaire: Questionnaire,
}

/// One point of the risk trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub formatted_date: String,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
}

impl TrendPoint {
    pub fn tooltip(&self) -> Vec<String> {
        vec![
            format!("Score: {}", self.risk_score),
            format!("Level: {}", self.risk_level.label()),
            format!("Date: {}", self.formatted_date),
        ]
    }
}

/// A single retrieval of a user's history, viewable newest-first or oldest-first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTimeline {
    entries: Vec<HistoryView>,
}

impl HistoryTimeline {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Most recent first.
    pub fn entries(&self) -> &[HistoryView] {
        &self.entries
    }

    /// Oldest first, whatever order the listing uses.
    pub fn trend(&self) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = self
            .entries
            .iter()
            .map(|view| TrendPoint {
                timestamp: view.timestamp,
                formatted_date: view.formatted_date.clone(),
                risk_score: view.risk_score,
                risk_level: view.risk_level,
            })
            .collect();
        points.sort_by_key(|point| point.timestamp);
        points
    }
}

/// Derives display fields and orderings for saved assessments.
#[derive(Debug, Clone, Default)]
pub struct HistoryAggregator {
    display: HistoryDisplayConfig,
}

impl HistoryAggregator {
    pub fn new(display: HistoryDisplayConfig) -> Self {
        Self { display }
    }

    pub fn format_date(&self, timestamp: DateTime<Utc>) -> String {
        let local = timestamp.with_timezone(&self.display.utc_offset);
        let mut formatted = String::new();
        if write!(formatted, "{}", local.format(&self.display.date_format)).is_err() {
            return local.date_naive().to_string();
        }
        formatted
    }

    pub fn timeline(&self, mut entries: Vec<HistoryEntry>) -> HistoryTimeline {
        entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));

        let entries = entries
            .into_iter()
            .map(|entry| self.view(entry))
            .collect();

        HistoryTimeline { entries }
    }

    pub fn view(&self, entry: HistoryEntry) -> HistoryView {
        HistoryView {
            formatted_date: self.format_date(entry.timestamp),
            risk_class: RiskClass::from_score(entry.risk_score),
            id: entry.id,
            timestamp: entry.timestamp,
            risk_score: entry.risk_score,
            risk_level: entry.risk_level,
            questionnaire: entry.questionnaire,
        }
    }
}

//! Append-only score record repository.
//!
//! Records live in the root `script_scores` collection, one document per
//! scoring run, keyed by `{video_id}__{scored_at micros}`. A few scalar fields
//! are stored alongside the full record JSON so they can be queried and
//! ordered server-side.

use std::collections::HashMap;

use tracing::{info, warn};
use vscore_models::{latest_per_video, ScoreRecord, VideoId};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, StructuredQuery, ToFirestoreValue, Value};

/// Collection holding score records.
pub const SCORES_COLLECTION: &str = "script_scores";

/// Upper bound on documents scanned when building the leaderboard.
const LIST_SCAN_LIMIT: i32 = 5000;

/// Repository for score records.
#[derive(Clone)]
pub struct ScoreRecordRepository {
    client: FirestoreClient,
}

impl ScoreRecordRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Document ID for a record.
    pub fn doc_id(record: &ScoreRecord) -> String {
        format!(
            "{}__{}",
            record.video_id.as_str(),
            record.scored_at.timestamp_micros()
        )
    }

    /// Append a record. Never overwrites; a duplicate key is `AlreadyExists`.
    pub async fn append(&self, record: &ScoreRecord) -> FirestoreResult<()> {
        let doc_id = Self::doc_id(record);
        let fields = record_to_fields(record)?;

        self.client
            .create_document(SCORES_COLLECTION, &doc_id, fields)
            .await?;

        info!(
            video_id = %record.video_id,
            run_id = %record.run_id,
            doc_id = %doc_id,
            "Persisted score record"
        );
        Ok(())
    }

    /// Most recent record for a video.
    pub async fn get_latest(&self, video_id: &VideoId) -> FirestoreResult<Option<ScoreRecord>> {
        let mut records = self.query_video(video_id, Some(1)).await?;
        Ok(records.pop())
    }

    /// All records for a video, newest first.
    pub async fn history(&self, video_id: &VideoId) -> FirestoreResult<Vec<ScoreRecord>> {
        self.query_video(video_id, None).await
    }

    /// Current record for every video, best multiplied score first.
    pub async fn list_latest_all(&self) -> FirestoreResult<Vec<ScoreRecord>> {
        let query = StructuredQuery::collection(SCORES_COLLECTION)
            .order_desc("scored_at")
            .limit(LIST_SCAN_LIMIT);

        let client = &self.client;
        let docs = client
            .with_retry("list_latest_scores", move || client.run_query(query.clone()))
            .await?;

        if docs.len() as i32 >= LIST_SCAN_LIMIT {
            warn!(limit = LIST_SCAN_LIMIT, "Score scan hit its limit, older videos may be missing");
        }

        Ok(latest_per_video(documents_to_records(docs)))
    }

    async fn query_video(
        &self,
        video_id: &VideoId,
        limit: Option<i32>,
    ) -> FirestoreResult<Vec<ScoreRecord>> {
        let mut query = StructuredQuery::collection(SCORES_COLLECTION)
            .filter_eq("video_id", video_id.as_str().to_firestore_value())
            .order_desc("scored_at");
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let client = &self.client;
        let docs = client
            .with_retry("query_video_scores", move || client.run_query(query.clone()))
            .await?;

        Ok(documents_to_records(docs))
    }
}

/// Build the stored field map for a record.
fn record_to_fields(record: &ScoreRecord) -> FirestoreResult<HashMap<String, Value>> {
    let json = serde_json::to_string(record)
        .map_err(|e| FirestoreError::serialization(format!("score record: {}", e)))?;

    let mut fields = HashMap::new();
    fields.insert("video_id".to_string(), record.video_id.as_str().to_firestore_value());
    fields.insert("run_id".to_string(), record.run_id.to_string().to_firestore_value());
    fields.insert("scored_at".to_string(), record.scored_at.to_firestore_value());
    fields.insert("scoring_version".to_string(), record.scoring_version.to_firestore_value());
    fields.insert("multiplied_score".to_string(), record.multiplied_score.to_firestore_value());
    fields.insert(
        "quality_total".to_string(),
        record.quality.as_ref().map(|q| q.total).to_firestore_value(),
    );
    fields.insert("rizz_score".to_string(), record.rizz.score.to_firestore_value());
    fields.insert("all_gates_passed".to_string(), record.all_gates_passed.to_firestore_value());
    fields.insert("record_json".to_string(), json.to_firestore_value());
    Ok(fields)
}

/// Decode a stored document back into a record.
fn document_to_record(doc: &Document) -> FirestoreResult<ScoreRecord> {
    let json: String = doc
        .get("record_json")
        .ok_or_else(|| FirestoreError::invalid_response("score document missing record_json"))?;
    serde_json::from_str(&json)
        .map_err(|e| FirestoreError::serialization(format!("score record: {}", e)))
}

/// Decode documents, logging and skipping any that fail.
fn documents_to_records(docs: Vec<Document>) -> Vec<ScoreRecord> {
    docs.iter()
        .filter_map(|doc| match document_to_record(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(doc_id = doc.doc_id().unwrap_or(""), error = %e, "Skipping unreadable score document");
                None
            }
        })
        .collect()
}

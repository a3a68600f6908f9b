//! Score store and brand catalog implementations.

use async_trait::async_trait;
use tokio::sync::RwLock;
use vscore_firestore::{BrandRepository, ScoreRecordRepository};
use vscore_models::{latest_per_video, ApprovedBrand, ScoreRecord, VideoId};

use crate::collaborators::{BrandCatalog, ScoreStore};
use crate::error::{ScoringError, ScoringResult};

/// Process-local append-only store.
#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    records: RwLock<Vec<ScoreRecord>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn persist(&self, record: &ScoreRecord) -> ScoringResult<()> {
        let mut records = self.records.write().await;
        let duplicate = records
            .iter()
            .any(|r| r.video_id == record.video_id && r.scored_at == record.scored_at);
        if duplicate {
            return Err(ScoringError::store(format!(
                "record for {} at {} already exists",
                record.video_id, record.scored_at
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn get_latest(&self, video_id: &VideoId) -> ScoringResult<Option<ScoreRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| &r.video_id == video_id)
            .max_by_key(|r| r.scored_at)
            .cloned())
    }

    async fn list_latest_all(&self) -> ScoringResult<Vec<ScoreRecord>> {
        let records = self.records.read().await;
        Ok(latest_per_video(records.iter().cloned()))
    }

    async fn history(&self, video_id: &VideoId) -> ScoringResult<Vec<ScoreRecord>> {
        let records = self.records.read().await;
        let mut history: Vec<ScoreRecord> = records
            .iter()
            .filter(|r| &r.video_id == video_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.scored_at.cmp(&a.scored_at));
        Ok(history)
    }
}

#[async_trait]
impl ScoreStore for ScoreRecordRepository {
    async fn persist(&self, record: &ScoreRecord) -> ScoringResult<()> {
        Ok(self.append(record).await?)
    }

    async fn get_latest(&self, video_id: &VideoId) -> ScoringResult<Option<ScoreRecord>> {
        Ok(ScoreRecordRepository::get_latest(self, video_id).await?)
    }

    async fn list_latest_all(&self) -> ScoringResult<Vec<ScoreRecord>> {
        Ok(ScoreRecordRepository::list_latest_all(self).await?)
    }

    async fn history(&self, video_id: &VideoId) -> ScoringResult<Vec<ScoreRecord>> {
        Ok(ScoreRecordRepository::history(self, video_id).await?)
    }
}

#[async_trait]
impl BrandCatalog for BrandRepository {
    async fn get_approved_brand(&self, silo: &str) -> ScoringResult<Option<ApprovedBrand>> {
        Ok(BrandRepository::get_approved_brand(self, silo).await?)
    }

    async fn get_active_partners(&self) -> ScoringResult<Vec<String>> {
        Ok(self.list_active_partners().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;
    use vscore_models::{
        ContextMultiplierResult, CopyDetail, GateCheckResult, GateName, MultiplierBucket,
        QualityScore, RizzScore, ScoreRecordParts, VocalDetail,
    };

    fn record(video: &str, secs: i64, with_quality: bool) -> ScoreRecord {
        let scored_at: DateTime<Utc> = DateTime::from_timestamp(secs, 0).unwrap();
        ScoreRecord::assemble(ScoreRecordParts {
            run_id: Uuid::new_v4(),
            video_id: VideoId::from(video),
            scored_at,
            scoring_version: "test".into(),
            model_used: None,
            transcript_length: 10,
            gate_results: GateName::ALL.iter().map(|g| GateCheckResult::pass(*g)).collect(),
            quality: with_quality.then(|| QualityScore::assemble(vec![], vec![], None)),
            multiplier: ContextMultiplierResult::from_bucket(MultiplierBucket::Tier1HighDom, None, None),
            rizz: RizzScore::combine(VocalDetail::default(), CopyDetail::default()),
        })
    }

    #[test]
    fn test_persist_is_append_only() {
        let store = InMemoryScoreStore::new();
        let r = record("a", 100, true);

        tokio_test::block_on(async {
            tokio_test::assert_ok!(store.persist(&r).await);
            let duplicate = tokio_test::assert_err!(store.persist(&r).await);
            assert!(matches!(duplicate, ScoringError::Store(_)));
            assert_eq!(store.len().await, 1);
        });
    }

    #[tokio::test]
    async fn test_latest_and_history() {
        let store = InMemoryScoreStore::new();
        store.persist(&record("a", 100, true)).await.unwrap();
        store.persist(&record("a", 300, true)).await.unwrap();
        store.persist(&record("a", 200, true)).await.unwrap();
        store.persist(&record("b", 50, true)).await.unwrap();

        let id = VideoId::from("a");
        let latest = store.get_latest(&id).await.unwrap().unwrap();
        assert_eq!(latest.scored_at.timestamp(), 300);

        let history = store.history(&id).await.unwrap();
        let times: Vec<_> = history.iter().map(|r| r.scored_at.timestamp()).collect();
        assert_eq!(times, vec![300, 200, 100]);

        assert!(store.get_latest(&VideoId::from("zzz")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_latest_all_puts_unscored_last() {
        let store = InMemoryScoreStore::new();
        store.persist(&record("unscored", 100, false)).await.unwrap();
        store.persist(&record("scored", 100, true)).await.unwrap();

        let all = store.list_latest_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["scored", "unscored"]);
    }
}

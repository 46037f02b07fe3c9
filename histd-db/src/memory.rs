//! 외부 의존성 없는 메모리 저장소

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;

use histd_error::{Result, db_err};

use crate::model::{Bucket, BulkWriteResult, SampleWrite, SortOrder, TopicId, WriteError};
use crate::store::SampleStore;

#[derive(Default)]
struct MemoryState {
    topics: HashMap<String, TopicId>,
    next_topic_id: i64,
    buckets: BTreeMap<(TopicId, DateTime<Utc>), Bucket>,
}

impl MemoryState {
    /// 발급한 토픽 id 인지 확인 (hourly_data 의 topics 참조 제약과 같음)
    fn check_topic(&self, write: &SampleWrite) -> Result<()> {
        if write.topic_id.0 < 1 || write.topic_id.0 > self.next_topic_id {
            return Err(db_err(format!("등록되지 않은 topic_id: {}", write.topic_id)));
        }
        Ok(())
    }
}

/// 메모리 저장소. `PgStore` 와 같은 의미로 동작
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 버킷 수
    pub fn bucket_count(&self) -> Result<usize> {
        Ok(self.state.read()?.buckets.len())
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn load_topics(&self) -> Result<Vec<(String, TopicId)>> {
        let state = self.state.read()?;
        Ok(state
            .topics
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect())
    }

    async fn insert_topic(&self, name: &str) -> Result<TopicId> {
        let mut state = self.state.write()?;
        if let Some(id) = state.topics.get(name) {
            return Ok(*id);
        }
        state.next_topic_id += 1;
        let id = TopicId(state.next_topic_id);
        state.topics.insert(name.to_string(), id);
        debug!("토픽 등록: {name} => {id}");
        Ok(id)
    }

    async fn upsert_samples(&self, writes: &[SampleWrite]) -> Result<BulkWriteResult> {
        let mut state = self.state.write()?;
        let mut result = BulkWriteResult::default();

        for (index, write) in writes.iter().enumerate() {
            if let Err(e) = write.validate().and_then(|_| state.check_topic(write)) {
                result.write_errors.push(WriteError {
                    index,
                    message: e.to_string(),
                });
                continue;
            }
            state
                .buckets
                .entry((write.topic_id, write.hour()))
                .and_modify(|bucket| bucket.replace(write.minute(), write.value))
                .or_insert_with(|| Bucket::first(write));
            result.written += 1;
        }

        Ok(result)
    }

    async fn record_sample(&self, write: &SampleWrite) -> Result<()> {
        write.validate()?;
        let mut state = self.state.write()?;
        state.check_topic(write)?;
        state
            .buckets
            .entry((write.topic_id, write.hour()))
            .and_modify(|bucket| bucket.record(write.minute(), write.value))
            .or_insert_with(|| Bucket::first(write));
        Ok(())
    }

    async fn find_buckets(
        &self,
        topic_id: TopicId,
        from_hour: DateTime<Utc>,
        to_hour: DateTime<Utc>,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Bucket>> {
        if from_hour > to_hour {
            return Ok(Vec::new());
        }
        let state = self.state.read()?;
        let range = state.buckets.range((topic_id, from_hour)..=(topic_id, to_hour));
        let buckets = match order {
            SortOrder::Ascending => range.take(limit).map(|(_, b)| b.clone()).collect(),
            SortOrder::Descending => range.rev().take(limit).map(|(_, b)| b.clone()).collect(),
        };
        Ok(buckets)
    }
}

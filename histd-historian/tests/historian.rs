use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use histd_db::{
    Bucket, BulkWriteResult, MemoryStore, SampleStore, SampleWrite, SortOrder, TopicId, WriteError,
};
use histd_error::{Result, db_err};
use histd_historian::{Historian, PublishOutcome, PublishRecord, QueryOrder, QueryRequest};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 3, 1, h, m, 0).unwrap()
}

async fn historian_with(store: Arc<MemoryStore>) -> Historian {
    Historian::setup(store, 100).await.unwrap()
}

/// 10:00 ~ 12:59 사이 10분 간격 샘플 18개
fn three_hours(topic: &str) -> Vec<PublishRecord> {
    (10..13)
        .flat_map(|h| (0..60).step_by(10).map(move |m| (h, m)))
        .map(|(h, m)| PublishRecord::new(at(h, m), topic, f64::from(h * 100 + m)))
        .collect()
}

#[tokio::test]
async fn test_same_record_twice_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let mut historian = historian_with(store.clone()).await;
    let batch = vec![PublishRecord::new(at(10, 37), "campus/building/temp", 21.5)];

    assert!(historian.publish_to_historian(&batch).await.is_handled());
    assert!(historian.publish_to_historian(&batch).await.is_handled());

    let result = historian
        .query_historian(&QueryRequest::new("campus/building/temp"))
        .await
        .unwrap();
    assert_eq!(result.values, vec![("2016-03-01T10:37:00+00:00".to_string(), 21.5)]);

    let topic_id = historian.topic_map().id("campus/building/temp").unwrap();
    let buckets = store
        .find_buckets(topic_id, at(10, 0), at(10, 0), SortOrder::Ascending, usize::MAX)
        .await
        .unwrap();
    assert_eq!(buckets[0].sample_count, 1);
    assert_eq!(buckets[0].sample_sum, 21.5);
}

#[tokio::test]
async fn test_topic_reused_across_batches() {
    let store = Arc::new(MemoryStore::new());
    let mut historian = historian_with(store.clone()).await;

    historian
        .publish_to_historian(&[PublishRecord::new(at(10, 0), "a", 1.0)])
        .await;
    let first = historian.topic_map().id("a").unwrap();
    historian
        .publish_to_historian(&[
            PublishRecord::new(at(10, 1), "a", 2.0),
            PublishRecord::new(at(10, 2), "b", 3.0),
        ])
        .await;

    assert_eq!(historian.topic_map().id("a"), Some(first));
    assert_eq!(historian.topic_map().name(first), Some("a"));
    assert_eq!(store.load_topics().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_topic_map_restored_on_setup() {
    let store = Arc::new(MemoryStore::new());
    let mut historian = historian_with(store.clone()).await;
    historian
        .publish_to_historian(&three_hours("campus/building/temp"))
        .await;

    let restarted = historian_with(store).await;
    assert_eq!(
        restarted.topic_map().id("campus/building/temp"),
        historian.topic_map().id("campus/building/temp")
    );
    let result = restarted
        .query_historian(&QueryRequest::new("campus/building/temp"))
        .await
        .unwrap();
    assert_eq!(result.len(), 18);
}

#[tokio::test]
async fn test_last_to_first_is_exact_reverse() {
    let mut historian = historian_with(Arc::new(MemoryStore::new())).await;
    historian.publish_to_historian(&three_hours("t")).await;

    let forward = historian
        .query_historian(&QueryRequest::new("t"))
        .await
        .unwrap();
    let mut backward = historian
        .query_historian(&QueryRequest::new("t").order(QueryOrder::LastToFirst))
        .await
        .unwrap();

    assert_eq!(forward.len(), 18);
    backward.values.reverse();
    assert_eq!(forward.values, backward.values);
}

#[tokio::test]
async fn test_pages_have_no_gaps_or_duplicates() {
    let mut historian = historian_with(Arc::new(MemoryStore::new())).await;
    historian.publish_to_historian(&three_hours("t")).await;

    let all = historian
        .query_historian(&QueryRequest::new("t"))
        .await
        .unwrap();

    for order in [QueryOrder::FirstToLast, QueryOrder::LastToFirst] {
        let mut paged = Vec::new();
        let mut skip = 0;
        loop {
            let page = historian
                .query_historian(&QueryRequest::new("t").order(order).page(skip, 5))
                .await
                .unwrap();
            if page.is_empty() {
                break;
            }
            assert!(page.len() <= 5);
            skip += page.len();
            paged.extend(page.values);
        }
        if order == QueryOrder::LastToFirst {
            paged.reverse();
        }
        assert_eq!(paged, all.values);
    }
}

#[tokio::test]
async fn test_minute_slot_round_trip() {
    let mut historian = historian_with(Arc::new(MemoryStore::new())).await;
    historian
        .publish_to_historian(&[PublishRecord::new(
            Utc.with_ymd_and_hms(2016, 3, 1, 14, 37, 42).unwrap(),
            "t",
            7.25,
        )])
        .await;

    let result = historian
        .query_historian(&QueryRequest::new("t"))
        .await
        .unwrap();
    assert_eq!(result.values, vec![("2016-03-01T14:37:00+00:00".to_string(), 7.25)]);
}

#[tokio::test]
async fn test_unknown_topic_is_empty() {
    let historian = historian_with(Arc::new(MemoryStore::new())).await;
    let result = historian
        .query_historian(&QueryRequest::new("never/written"))
        .await
        .unwrap();
    assert!(result.is_empty());
    assert!(result.metadata.is_empty());
}

#[tokio::test]
async fn test_range_is_honored() {
    let mut historian = historian_with(Arc::new(MemoryStore::new())).await;
    historian.publish_to_historian(&three_hours("t")).await;

    let result = historian
        .query_historian(&QueryRequest::new("t").range(at(10, 30), at(11, 20)))
        .await
        .unwrap();
    let stamps: Vec<_> = result.values.iter().map(|(ts, _)| ts.as_str()).collect();
    assert_eq!(
        stamps,
        vec![
            "2016-03-01T10:30:00+00:00",
            "2016-03-01T10:40:00+00:00",
            "2016-03-01T10:50:00+00:00",
            "2016-03-01T11:00:00+00:00",
            "2016-03-01T11:10:00+00:00",
            "2016-03-01T11:20:00+00:00",
        ]
    );

    let inverted = historian
        .query_historian(&QueryRequest::new("t").range(at(12, 0), at(10, 0)))
        .await
        .unwrap();
    assert!(inverted.is_empty());
}

#[tokio::test]
async fn test_default_count_limits_results() {
    let store = Arc::new(MemoryStore::new());
    let mut historian = Historian::setup(store, 4).await.unwrap();
    historian.publish_to_historian(&three_hours("t")).await;

    let result = historian
        .query_historian(&QueryRequest::new("t"))
        .await
        .unwrap();
    assert_eq!(result.len(), 4);
    assert_eq!(result.values[0].0, "2016-03-01T10:00:00+00:00");
}

#[tokio::test]
async fn test_insert_data_and_publish_share_buckets() {
    let store = Arc::new(MemoryStore::new());
    let mut historian = historian_with(store.clone()).await;
    let topic_id = historian.insert_topic("t").await.unwrap();

    historian.insert_data(at(10, 5), topic_id, 1.0).await.unwrap();
    historian.insert_data(at(10, 5), topic_id, 2.0).await.unwrap();
    historian
        .publish_to_historian(&[PublishRecord::new(at(10, 6), "t", 3.0)])
        .await;

    assert_eq!(store.bucket_count().unwrap(), 1);
    let buckets = store
        .find_buckets(topic_id, at(10, 0), at(10, 0), SortOrder::Ascending, usize::MAX)
        .await
        .unwrap();
    assert_eq!(buckets[0].samples()[5], Some(2.0));
    assert_eq!(buckets[0].sample_count, 3);
    assert_eq!(buckets[0].sample_sum, 6.0);

    let result = historian
        .query_historian(&QueryRequest::new("t"))
        .await
        .unwrap();
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_commit_and_rollback_succeed() {
    let historian = historian_with(Arc::new(MemoryStore::new())).await;
    assert!(historian.commit());
    assert!(historian.rollback());
}

#[tokio::test]
async fn test_write_error_leaves_batch_unacknowledged() {
    let mut historian = historian_with(Arc::new(MemoryStore::new())).await;
    let outcome = historian
        .publish_to_historian(&[
            PublishRecord::new(at(10, 0), "t", 1.0),
            PublishRecord::new(at(10, 1), "t", f64::NAN),
        ])
        .await;
    assert_eq!(outcome, PublishOutcome::Unacknowledged { errors: 1 });
}

/// 쓰기가 항상 실패하는 저장소
struct BrokenStore {
    inner: MemoryStore,
}

#[async_trait]
impl SampleStore for BrokenStore {
    async fn load_topics(&self) -> Result<Vec<(String, TopicId)>> {
        self.inner.load_topics().await
    }

    async fn insert_topic(&self, name: &str) -> Result<TopicId> {
        self.inner.insert_topic(name).await
    }

    async fn upsert_samples(&self, writes: &[SampleWrite]) -> Result<BulkWriteResult> {
        Ok(BulkWriteResult {
            written: 0,
            write_errors: (0..writes.len())
                .map(|index| WriteError {
                    index,
                    message: "duplicate key".to_string(),
                })
                .collect(),
        })
    }

    async fn record_sample(&self, _write: &SampleWrite) -> Result<()> {
        Err(db_err("connection reset"))
    }

    async fn find_buckets(
        &self,
        topic_id: TopicId,
        from_hour: DateTime<Utc>,
        to_hour: DateTime<Utc>,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Bucket>> {
        self.inner
            .find_buckets(topic_id, from_hour, to_hour, order, limit)
            .await
    }
}

#[tokio::test]
async fn test_store_failures_surface() {
    let store = Arc::new(BrokenStore {
        inner: MemoryStore::new(),
    });
    let mut historian = Historian::setup(store, 100).await.unwrap();

    let outcome = historian.publish_to_historian(&three_hours("t")).await;
    assert_eq!(outcome, PublishOutcome::Unacknowledged { errors: 18 });

    let topic_id = historian.topic_map().id("t").unwrap();
    assert!(historian.insert_data(at(10, 0), topic_id, 1.0).await.is_err());
}

#[tokio::test]
async fn test_empty_batch_is_handled() {
    let mut historian = historian_with(Arc::new(MemoryStore::new())).await;
    assert_eq!(
        historian.publish_to_historian(&[]).await,
        PublishOutcome::Handled { count: 0 }
    );
}

/// 조회한 버킷 수를 세는 저장소
struct CountingStore {
    inner: MemoryStore,
    fetched: AtomicUsize,
}

#[async_trait]
impl SampleStore for CountingStore {
    async fn load_topics(&self) -> Result<Vec<(String, TopicId)>> {
        self.inner.load_topics().await
    }

    async fn insert_topic(&self, name: &str) -> Result<TopicId> {
        self.inner.insert_topic(name).await
    }

    async fn upsert_samples(&self, writes: &[SampleWrite]) -> Result<BulkWriteResult> {
        self.inner.upsert_samples(writes).await
    }

    async fn record_sample(&self, write: &SampleWrite) -> Result<()> {
        self.inner.record_sample(write).await
    }

    async fn find_buckets(
        &self,
        topic_id: TopicId,
        from_hour: DateTime<Utc>,
        to_hour: DateTime<Utc>,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Bucket>> {
        let buckets = self
            .inner
            .find_buckets(topic_id, from_hour, to_hour, order, limit)
            .await?;
        self.fetched.fetch_add(buckets.len(), Ordering::SeqCst);
        Ok(buckets)
    }
}

#[tokio::test]
async fn test_query_reads_only_needed_buckets() {
    let store = Arc::new(CountingStore {
        inner: MemoryStore::new(),
        fetched: AtomicUsize::new(0),
    });
    let mut historian = Historian::setup(store.clone(), 100).await.unwrap();

    // 1년치 시간별 샘플
    let origin = Utc.with_ymd_and_hms(2016, 1, 1, 0, 30, 0).unwrap();
    let year: Vec<_> = (0..8760)
        .map(|h| PublishRecord::new(origin + TimeDelta::hours(h), "t", h as f64))
        .collect();
    assert!(historian.publish_to_historian(&year).await.is_handled());

    let first = historian
        .query_historian(&QueryRequest::new("t").page(0, 1))
        .await
        .unwrap();
    assert_eq!(first.values, vec![("2016-01-01T00:30:00+00:00".to_string(), 0.0)]);
    assert!(store.fetched.swap(0, Ordering::SeqCst) <= 2);

    let last = historian
        .query_historian(&QueryRequest::new("t").order(QueryOrder::LastToFirst).page(10, 5))
        .await
        .unwrap();
    assert_eq!(last.len(), 5);
    assert_eq!(last.values[0].1, 8749.0);
    assert!(store.fetched.swap(0, Ordering::SeqCst) <= 16);

    // start 가 첫 버킷의 샘플을 모두 거르는 경우
    let ranged = historian
        .query_historian(
            &QueryRequest::new("t")
                .range(Utc.with_ymd_and_hms(2016, 1, 1, 0, 45, 0).unwrap(), origin + TimeDelta::hours(100))
                .page(0, 3),
        )
        .await
        .unwrap();
    let values: Vec<_> = ranged.values.iter().map(|(_, v)| *v).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
    assert!(store.fetched.load(Ordering::SeqCst) <= 4);
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;

use histd_config::{DbConfig, StoreType};
use histd_error::Result;

use crate::memory::MemoryStore;
use crate::model::{Bucket, BulkWriteResult, SampleWrite, SortOrder, TopicId};
use crate::pg::PgStore;

/// 토픽 디렉토리와 시간 버킷을 보관하는 저장소
///
/// 쓰기는 (토픽 id, 정시) 로 버킷을 찾고 분 슬롯 하나를 바꾼다.
/// 버킷은 (토픽 id, 정시) 당 최대 하나만 존재한다.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// 전체 토픽 목록 (시작시 토픽 맵 구성용)
    async fn load_topics(&self) -> Result<Vec<(String, TopicId)>>;

    /// 토픽 등록. 이미 있는 이름이면 기존 id 반환
    async fn insert_topic(&self, name: &str) -> Result<TopicId>;

    /// 분 슬롯 교체 방식의 벌크 쓰기. 같은 샘플을 다시 써도 결과가 같다
    ///
    /// 개별 레코드 실패는 에러가 아니라 `write_errors` 로 보고된다.
    async fn upsert_samples(&self, writes: &[SampleWrite]) -> Result<BulkWriteResult>;

    /// 단건 쓰기. 슬롯 기록 후 카운트는 1, 합계는 값만큼 누적
    async fn record_sample(&self, write: &SampleWrite) -> Result<()>;

    /// 정시 기준 [from_hour, to_hour] 범위의 버킷을 정렬 순서대로 최대 `limit` 개 조회
    async fn find_buckets(
        &self,
        topic_id: TopicId,
        from_hour: DateTime<Utc>,
        to_hour: DateTime<Utc>,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Bucket>>;
}

/// 설정에 맞는 저장소 연결
pub async fn connect_store(config: &DbConfig) -> Result<Arc<dyn SampleStore>> {
    match config.connection.store_type {
        StoreType::Postgresql => {
            let store = PgStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        StoreType::Memory => {
            info!("메모리 저장소 사용");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

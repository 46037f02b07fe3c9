use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info};

use histd_db::{SampleStore, SampleWrite, TopicId, truncate_to_hour};
use histd_error::Result;

use crate::query::{QueryRequest, QueryResult};
use crate::record::{PublishOutcome, PublishRecord};
use crate::topic::TopicMap;

/// 시계열 히스토리언
///
/// 게시 배치는 호스트가 하나씩 순서대로 넘긴다고 가정한다. 토픽 맵을
/// 바꾸는 메서드는 `&mut self` 를 받으므로 동시 작성자는 컴파일 단계에서 막힌다.
pub struct Historian {
    store: Arc<dyn SampleStore>,
    topic_map: TopicMap,
    default_query_count: usize,
}

impl Historian {
    /// 저장소의 토픽 목록으로 토픽 맵을 만들고 히스토리언 생성
    pub async fn setup(store: Arc<dyn SampleStore>, default_query_count: usize) -> Result<Self> {
        let mut historian = Self {
            store,
            topic_map: TopicMap::new(),
            default_query_count,
        };
        historian.topic_map = historian.get_topic_map().await?;
        info!("히스토리언 초기화 완료. 토픽 {}개", historian.topic_map.len());
        Ok(historian)
    }

    /// 저장소를 다시 읽어 토픽 맵 구성
    pub async fn get_topic_map(&self) -> Result<TopicMap> {
        let topics = self.store.load_topics().await?;
        debug!("토픽 맵 조회 결과: {}개", topics.len());
        Ok(topics.into_iter().collect())
    }

    /// 메모리에 유지중인 토픽 맵
    pub fn topic_map(&self) -> &TopicMap {
        &self.topic_map
    }

    /// 토픽 등록 후 맵에 반영
    pub async fn insert_topic(&mut self, name: &str) -> Result<TopicId> {
        let id = self.store.insert_topic(name).await?;
        self.topic_map.insert(name.to_string(), id);
        debug!("TopicId: {id} => {name}");
        Ok(id)
    }

    /// 토픽 id 조회. 처음 보는 이름이면 등록
    pub async fn resolve_topic(&mut self, name: &str) -> Result<TopicId> {
        match self.topic_map.id(name) {
            Some(id) => Ok(id),
            None => {
                debug!("토픽 등록: {name}");
                self.insert_topic(name).await
            }
        }
    }

    /// 배치 게시
    ///
    /// 쓰기 에러가 하나도 없을 때만 `Handled` 를 돌려준다. 실패는 로그만 남기고
    /// `Unacknowledged` 로 보고한다.
    pub async fn publish_to_historian(&mut self, records: &[PublishRecord]) -> PublishOutcome {
        debug!("publish_to_historian 레코드 수: {}", records.len());

        let mut writes = Vec::with_capacity(records.len());
        for record in records {
            match self.resolve_topic(&record.topic).await {
                Ok(topic_id) => {
                    writes.push(SampleWrite::new(topic_id, record.timestamp, record.value))
                }
                Err(e) => {
                    error!("토픽 등록 실패 '{}': {e}", record.topic);
                    return PublishOutcome::Unacknowledged {
                        errors: records.len(),
                    };
                }
            }
        }

        match self.store.upsert_samples(&writes).await {
            Ok(result) if !result.has_errors() => PublishOutcome::Handled {
                count: result.written,
            },
            Ok(result) => {
                for e in &result.write_errors {
                    error!("레코드 쓰기 실패 [{}]: {}", e.index, e.message);
                }
                error!(
                    "배치 일부 쓰기 실패: {}/{}건",
                    result.write_errors.len(),
                    writes.len()
                );
                PublishOutcome::Unacknowledged {
                    errors: result.write_errors.len(),
                }
            }
            Err(e) => {
                error!("배치 쓰기 실패: {e}");
                PublishOutcome::Unacknowledged {
                    errors: writes.len(),
                }
            }
        }
    }

    /// 단건 기록. 같은 분에 다시 쓰면 카운트/합계가 누적된다
    pub async fn insert_data(&self, ts: DateTime<Utc>, topic_id: TopicId, value: f64) -> Result<()> {
        self.store
            .record_sample(&SampleWrite::new(topic_id, ts, value))
            .await
    }

    /// 저장소가 트랜잭션을 노출하지 않으므로 항상 성공
    pub fn commit(&self) -> bool {
        true
    }

    pub fn rollback(&self) -> bool {
        true
    }

    /// 토픽의 샘플 조회
    ///
    /// [start, end] 안의 샘플을 요청 순서로 정렬한 뒤 `skip`/`count` 로 자른다.
    /// 등록되지 않은 토픽은 빈 결과를 돌려준다.
    pub async fn query_historian(&self, request: &QueryRequest) -> Result<QueryResult> {
        let Some(topic_id) = self.topic_map.id(&request.topic) else {
            debug!("등록되지 않은 토픽 조회: {}", request.topic);
            return Ok(QueryResult::empty());
        };

        let (start, end) = request.bounds();
        let count = request.count.unwrap_or(self.default_query_count);
        if start > end || count == 0 {
            return Ok(QueryResult::empty());
        }

        // 버킷에는 샘플이 하나 이상 있음. 첫 버킷만 start 로 전부 걸러질 수 있음
        let limit = request.skip.saturating_add(count).saturating_add(1);
        let order = request.order.sort_order();
        let buckets = self
            .store
            .find_buckets(topic_id, truncate_to_hour(start), end, order, limit)
            .await?;
        debug!(
            "조회 {} ({topic_id}): 버킷 {}개, 순서 {}",
            request.topic,
            buckets.len(),
            request.order
        );

        let samples: Vec<_> = buckets
            .iter()
            .flat_map(|bucket| bucket.expand(order))
            .filter(|(ts, _)| *ts >= start && *ts <= end)
            .skip(request.skip)
            .take(count)
            .collect();

        Ok(QueryResult::from_samples(samples))
    }
}

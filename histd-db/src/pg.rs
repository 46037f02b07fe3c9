use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use tokio_postgres::Row;

use histd_config::DbConfig;
use histd_error::Result;

use crate::db::initialize_db;
use crate::model::{Bucket, BulkWriteResult, SampleWrite, SortOrder, TopicId, WriteError};
use crate::pool::DatabasePool;
use crate::sql::{hourly_data, topics};
use crate::store::SampleStore;

/// `PostgreSQL` 저장소
pub struct PgStore {
    pool: DatabasePool,
    statement_timeout: Duration,
}

impl PgStore {
    /// 연결 풀 생성 후 스키마 확인
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let pool = DatabasePool::new(config).await?;
        initialize_db(&pool).await?;

        Ok(Self {
            pool,
            statement_timeout: Duration::from_secs(config.pool.statement_timeout_seconds),
        })
    }

    /// 타임아웃을 걸고 쿼리 실행
    async fn timed<T, F>(&self, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, tokio_postgres::Error>> + Send,
    {
        Ok(tokio::time::timeout(self.statement_timeout, query).await??)
    }

    fn bucket_from_row(row: &Row) -> Result<Bucket> {
        Bucket::from_parts(
            TopicId(row.try_get("topic_id")?),
            row.try_get("ts")?,
            row.try_get("samples")?,
            row.try_get("sample_count")?,
            row.try_get("sample_sum")?,
        )
    }
}

/// 분 슬롯의 배열 첨자 (PostgreSQL 배열은 1부터)
fn slot_index(write: &SampleWrite) -> i32 {
    write.minute() as i32 + 1
}

#[async_trait]
impl SampleStore for PgStore {
    async fn load_topics(&self) -> Result<Vec<(String, TopicId)>> {
        let conn = self.pool.get_connection().await?;
        let rows = self.timed(conn.query(topics::SELECT_ALL, &[])).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get(0)?;
            let name: String = row.try_get(1)?;
            out.push((name, TopicId(id)));
        }
        info!("토픽 목록 로드 완료. {}개", out.len());
        Ok(out)
    }

    async fn insert_topic(&self, name: &str) -> Result<TopicId> {
        let conn = self.pool.get_connection().await?;
        let row = self.timed(conn.query_one(topics::INSERT, &[&name])).await?;
        Ok(TopicId(row.try_get(0)?))
    }

    async fn upsert_samples(&self, writes: &[SampleWrite]) -> Result<BulkWriteResult> {
        let conn = self.pool.get_connection().await?;
        let stmt = conn.prepare_cached(hourly_data::UPSERT_SAMPLE).await?;
        let mut result = BulkWriteResult::default();

        for (index, write) in writes.iter().enumerate() {
            if let Err(e) = write.validate() {
                result.write_errors.push(WriteError {
                    index,
                    message: e.to_string(),
                });
                continue;
            }

            let hour = write.hour();
            let samples = write.initial_samples();
            let slot = slot_index(write);
            let executed = self
                .timed(conn.execute(
                    &stmt,
                    &[&write.topic_id.0, &hour, &samples, &write.value, &slot],
                ))
                .await;

            match executed {
                Ok(_) => result.written += 1,
                Err(e) => {
                    error!("샘플 쓰기 실패 [{index}] topic_id={}: {e}", write.topic_id);
                    result.write_errors.push(WriteError {
                        index,
                        message: e.to_string(),
                    });
                }
            }
        }

        let status = self.pool.pool_status();
        debug!(
            "벌크 쓰기 완료: {}건 성공, {}건 실패 (풀 {}/{}, 대기 {})",
            result.written,
            result.write_errors.len(),
            status.available,
            status.size,
            status.waiting
        );
        Ok(result)
    }

    async fn record_sample(&self, write: &SampleWrite) -> Result<()> {
        write.validate()?;
        let conn = self.pool.get_connection().await?;

        let hour = write.hour();
        let samples = write.initial_samples();
        let slot = slot_index(write);
        self.timed(conn.execute(
            hourly_data::RECORD_SAMPLE,
            &[&write.topic_id.0, &hour, &samples, &write.value, &slot],
        ))
        .await?;
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
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = match order {
            SortOrder::Ascending => hourly_data::SELECT_RANGE_ASC,
            SortOrder::Descending => hourly_data::SELECT_RANGE_DESC,
        };

        let conn = self.pool.get_connection().await?;
        let rows = self
            .timed(conn.query(sql, &[&topic_id.0, &from_hour, &to_hour, &limit]))
            .await?;

        rows.iter().map(Self::bucket_from_row).collect()
    }
}

use std::fmt;

use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use histd_error::{HistorianError, Result, input_err};

/// 시간 버킷당 분 슬롯 수
pub const MINUTES_PER_HOUR: usize = 60;

/// 토픽 식별자 (저장소가 발급)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub i64);

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 정렬 방향
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// 시각을 정시로 내림
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    // 유효 범위 안의 시각은 실패하지 않음
    ts.duration_trunc(TimeDelta::hours(1)).unwrap_or(ts)
}

/// 단건 샘플 쓰기 요청
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWrite {
    pub topic_id: TopicId,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl SampleWrite {
    pub fn new(topic_id: TopicId, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            topic_id,
            timestamp,
            value,
        }
    }

    /// 소속 버킷의 정시
    pub fn hour(&self) -> DateTime<Utc> {
        truncate_to_hour(self.timestamp)
    }

    /// 0..60 분 슬롯
    pub fn minute(&self) -> usize {
        self.timestamp.minute() as usize
    }

    /// 저장 가능한 값인지 확인
    pub fn validate(&self) -> Result<()> {
        if !self.value.is_finite() {
            return Err(input_err(format!(
                "유한하지 않은 값: topic_id={}, ts={}, value={}",
                self.topic_id, self.timestamp, self.value
            )));
        }
        Ok(())
    }

    /// 현재 분만 채운 새 슬롯 배열
    pub fn initial_samples(&self) -> Vec<Option<f64>> {
        let mut samples = vec![None; MINUTES_PER_HOUR];
        samples[self.minute()] = Some(self.value);
        samples
    }
}

/// 토픽 하나의 한 시간 분량 문서
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub topic_id: TopicId,
    pub hour: DateTime<Utc>,
    samples: Vec<Option<f64>>,
    pub sample_count: i64,
    pub sample_sum: f64,
}

impl Bucket {
    /// 첫 샘플로 버킷 생성
    pub fn first(write: &SampleWrite) -> Self {
        Self {
            topic_id: write.topic_id,
            hour: write.hour(),
            samples: write.initial_samples(),
            sample_count: 1,
            sample_sum: write.value,
        }
    }

    /// 저장소에서 읽은 값으로 복원. 슬롯 수가 60이 아니면 에러
    pub fn from_parts(
        topic_id: TopicId,
        hour: DateTime<Utc>,
        samples: Vec<Option<f64>>,
        sample_count: i64,
        sample_sum: f64,
    ) -> Result<Self> {
        if samples.len() != MINUTES_PER_HOUR {
            return Err(HistorianError::Database(format!(
                "버킷 슬롯 수 불일치: topic_id={topic_id}, ts={hour}, len={}",
                samples.len()
            )));
        }
        Ok(Self {
            topic_id,
            hour,
            samples,
            sample_count,
            sample_sum,
        })
    }

    pub fn samples(&self) -> &[Option<f64>] {
        &self.samples
    }

    /// 슬롯 교체. 기존 값이 있으면 카운트/합계를 보정
    pub fn replace(&mut self, minute: usize, value: f64) {
        match self.samples[minute].replace(value) {
            Some(old) => self.sample_sum += value - old,
            None => {
                self.sample_count += 1;
                self.sample_sum += value;
            }
        }
    }

    /// 슬롯 기록 후 카운트/합계 누적
    pub fn record(&mut self, minute: usize, value: f64) {
        self.samples[minute] = Some(value);
        self.sample_count += 1;
        self.sample_sum += value;
    }

    /// 비어있지 않은 슬롯을 (시각, 값) 으로 펼침
    pub fn expand(&self, order: SortOrder) -> Vec<(DateTime<Utc>, f64)> {
        let mut out: Vec<_> = self
            .samples
            .iter()
            .enumerate()
            .filter_map(|(minute, value)| {
                value.map(|v| (self.hour + TimeDelta::minutes(minute as i64), v))
            })
            .collect();
        if order == SortOrder::Descending {
            out.reverse();
        }
        out
    }
}

/// 벌크 쓰기에서 실패한 레코드
#[derive(Debug, Clone, PartialEq)]
pub struct WriteError {
    /// 요청 목록에서의 위치
    pub index: usize,
    pub message: String,
}

/// 벌크 쓰기 결과
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkWriteResult {
    pub written: usize,
    pub write_errors: Vec<WriteError>,
}

impl BulkWriteResult {
    pub fn has_errors(&self) -> bool {
        !self.write_errors.is_empty()
    }
}

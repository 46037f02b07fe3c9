use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 호스트가 전달하는 게시 레코드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub timestamp: DateTime<Utc>,
    pub topic: String,
    pub value: f64,
}

impl PublishRecord {
    pub fn new(timestamp: DateTime<Utc>, topic: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp,
            topic: topic.into(),
            value,
        }
    }
}

/// 배치 게시 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// 전부 기록됨. 호스트에 확인 응답
    Handled { count: usize },
    /// 쓰기 에러가 있어 확인하지 않음. 재전달은 호스트 몫
    Unacknowledged { errors: usize },
}

impl PublishOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, PublishOutcome::Handled { .. })
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use histd_db::SortOrder;
use histd_error::{HistorianError, Result};

/// 시작 시각이 없을 때의 하한
pub static DEFAULT_QUERY_START: Lazy<DateTime<Utc>> = Lazy::new(|| DateTime::<Utc>::UNIX_EPOCH);

/// 종료 시각이 없을 때의 상한
pub static DEFAULT_QUERY_END: Lazy<DateTime<Utc>> = Lazy::new(|| {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
});

/// 결과 정렬 순서
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryOrder {
    #[default]
    FirstToLast,
    LastToFirst,
}

impl QueryOrder {
    pub fn sort_order(self) -> SortOrder {
        match self {
            QueryOrder::FirstToLast => SortOrder::Ascending,
            QueryOrder::LastToFirst => SortOrder::Descending,
        }
    }
}

impl fmt::Display for QueryOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOrder::FirstToLast => write!(f, "FIRST_TO_LAST"),
            QueryOrder::LastToFirst => write!(f, "LAST_TO_FIRST"),
        }
    }
}

impl FromStr for QueryOrder {
    type Err = HistorianError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FIRST_TO_LAST" => Ok(QueryOrder::FirstToLast),
            "LAST_TO_FIRST" => Ok(QueryOrder::LastToFirst),
            other => Err(HistorianError::InvalidInput(format!("알 수 없는 정렬 순서: {other}"))),
        }
    }
}

/// 조회 요청
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub topic: String,
    /// 포함 하한
    pub start: Option<DateTime<Utc>>,
    /// 포함 상한
    pub end: Option<DateTime<Utc>>,
    pub skip: usize,
    /// 없으면 설정의 기본값
    pub count: Option<usize>,
    pub order: QueryOrder,
}

impl QueryRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            start: None,
            end: None,
            skip: 0,
            count: None,
            order: QueryOrder::FirstToLast,
        }
    }

    pub fn range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn page(mut self, skip: usize, count: usize) -> Self {
        self.skip = skip;
        self.count = Some(count);
        self
    }

    pub fn order(mut self, order: QueryOrder) -> Self {
        self.order = order;
        self
    }

    /// 실제 적용할 [start, end]
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.start.unwrap_or(*DEFAULT_QUERY_START),
            self.end.unwrap_or(*DEFAULT_QUERY_END),
        )
    }
}

/// 조회 결과. `values` 는 (RFC 3339 시각, 값)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub values: Vec<(String, f64)>,
    pub metadata: Map<String, Value>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_samples(samples: Vec<(DateTime<Utc>, f64)>) -> Self {
        Self {
            values: samples
                .into_iter()
                .map(|(ts, v)| (ts.to_rfc3339_opts(SecondsFormat::Secs, false), v))
                .collect(),
            metadata: Map::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use histd_error::{Result, config_err};

/// 집계 단위. 현재는 분 단위 버킷만 지원
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Minute,
}

/// 히스토리언 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorianConfig {
    pub identity: String,
    pub aggregation: Aggregation,
    /// 한번에 게시할 레코드 수
    pub batch_size: usize,
    /// 확인되지 않은 배치를 재전달하는 최대 횟수
    pub max_redelivery: u32,
    pub default_query_count: usize,
    pub log_level: Option<String>,
}

impl Default for HistorianConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HistorianConfig {
    /// 기본설정으로 생성
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: "platform.historian".to_string(),
            aggregation: Aggregation::Minute,
            batch_size: 100,
            max_redelivery: 3,
            default_query_count: 100,
            log_level: None,
        }
    }

    /// 설정파일에서 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_yml::from_str(&contents)?;

        Ok(config)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<()> {
        if self.identity.is_empty() {
            return Err(config_err("identity 가 비어있음"));
        }
        if self.batch_size == 0 {
            return Err(config_err("batch_size 는 0 보다 커야 함"));
        }
        if self.default_query_count == 0 {
            return Err(config_err("default_query_count 는 0 보다 커야 함"));
        }
        Ok(())
    }
}

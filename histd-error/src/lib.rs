use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::PoisonError;
use tokio::time::error::Elapsed;
use deadpool_postgres::PoolError;
use serde_json::Error as JsonError;
use serde_yml::Error as YmlError;
use tokio_postgres::Error as PgError;

/// 히스토리언의 모든 에러 타입을 정의합니다.
#[derive(Debug)]
pub enum HistorianError {
    /// 설정 관련 에러
    Config(String),

    /// 입출력 에러
    Io(io::Error),

    /// 데이터베이스 관련 에러
    Database(String),

    /// 로깅 관련 에러
    Logging(String),

    /// 타임아웃 에러
    Timeout(String),

    /// 잘못된 입력 (레코드, 질의 파라미터)
    InvalidInput(String),

    /// 내부 상태 관련 에러
    Internal(String),

    /// 기타 에러
    Other(String),
}

impl fmt::Display for HistorianError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistorianError::Config(msg) => write!(f, "설정 에러: {}", msg),
            HistorianError::Io(err) => write!(f, "I/O 에러: {}", err),
            HistorianError::Database(msg) => write!(f, "데이터베이스 에러: {}", msg),
            HistorianError::Logging(msg) => write!(f, "로깅 에러: {}", msg),
            HistorianError::Timeout(msg) => write!(f, "타임아웃 에러: {}", msg),
            HistorianError::InvalidInput(msg) => write!(f, "입력 에러: {}", msg),
            HistorianError::Internal(msg) => write!(f, "내부 에러: {}", msg),
            HistorianError::Other(msg) => write!(f, "기타 에러: {}", msg),
        }
    }
}

impl StdError for HistorianError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            HistorianError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Result 타입 별칭 정의
pub type Result<T> = std::result::Result<T, HistorianError>;

/// From 트레이트 구현으로 다양한 에러 타입을 HistorianError로 변환
impl From<io::Error> for HistorianError {
    fn from(err: io::Error) -> Self {
        HistorianError::Io(err)
    }
}

impl From<PoolError> for HistorianError {
    fn from(err: PoolError) -> Self {
        HistorianError::Database(format!("DB 풀 에러: {}", err))
    }
}

impl From<PgError> for HistorianError {
    fn from(err: PgError) -> Self {
        HistorianError::Database(format!("PostgreSQL 에러: {}", err))
    }
}

impl From<Elapsed> for HistorianError {
    fn from(err: Elapsed) -> Self {
        HistorianError::Timeout(format!("작업 타임아웃: {}", err))
    }
}

impl<T> From<PoisonError<T>> for HistorianError {
    fn from(err: PoisonError<T>) -> Self {
        HistorianError::Internal(format!("락 포이즌 에러: {}", err))
    }
}

impl From<YmlError> for HistorianError {
    fn from(err: YmlError) -> Self {
        HistorianError::Config(format!("YAML 파싱 에러: {}", err))
    }
}

impl From<JsonError> for HistorianError {
    fn from(err: JsonError) -> Self {
        HistorianError::InvalidInput(format!("JSON 파싱 에러: {}", err))
    }
}

impl From<String> for HistorianError {
    fn from(err: String) -> Self {
        HistorianError::Other(err)
    }
}

impl From<&str> for HistorianError {
    fn from(err: &str) -> Self {
        HistorianError::Other(err.to_string())
    }
}

/// 에러 처리 유틸리티 함수
pub fn config_err<E: fmt::Display>(err: E) -> HistorianError {
    HistorianError::Config(format!("{}", err))
}

pub fn db_err<E: fmt::Display>(err: E) -> HistorianError {
    HistorianError::Database(format!("{}", err))
}

pub fn log_err<E: fmt::Display>(err: E) -> HistorianError {
    HistorianError::Logging(format!("{}", err))
}

pub fn input_err<E: fmt::Display>(err: E) -> HistorianError {
    HistorianError::InvalidInput(format!("{}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = input_err("bad record");
        assert_eq!(err.to_string(), "입력 에러: bad record");

        let err = db_err("connection refused");
        assert!(matches!(err, HistorianError::Database(_)));
        assert_eq!(err.to_string(), "데이터베이스 에러: connection refused");
    }

    #[test]
    fn test_io_source_is_kept() {
        let err: HistorianError = io::Error::new(io::ErrorKind::NotFound, "db.yml").into();
        assert!(err.source().is_some());
        assert!(config_err("x").source().is_none());
    }

    #[test]
    fn test_json_error_is_input_error() {
        let parse = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: HistorianError = parse.into();
        assert!(matches!(err, HistorianError::InvalidInput(_)));
    }
}

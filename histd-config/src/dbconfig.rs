use std::path::Path;
use std::fs::File;
use std::io::Read;

use serde::{Deserialize, Serialize};

use histd_error::{Result, config_err};

/// 데이터베이스 설정
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// 데이터베이스 연결 설정
    pub connection: ConnectionConfig,
    /// 연결 풀 설정
    pub pool: PoolConfig,
}

impl DbConfig {
    /// 설정파일에서 db 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: DbConfig = serde_yml::from_str(&contents)?;

        Ok(config)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<()> {
        if self.connection.store_type == StoreType::Memory {
            return Ok(());
        }
        if self.connection.database.is_empty() {
            return Err(config_err("database 이름이 비어있음"));
        }
        if self.connection.port == 0 {
            return Err(config_err("port 는 0 일 수 없음"));
        }
        if self.pool.max_connections == 0 {
            return Err(config_err("max_connections 는 0 보다 커야 함"));
        }
        Ok(())
    }
}

/// 저장소 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    #[default]
    Postgresql,
    Memory,
}

/// db 연결설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    #[serde(rename = "type")]
    pub store_type: StoreType,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub sslmode: String,
    /// 레플리카 호스트. 지정되면 순서대로 시도하고 쓰기 가능한 세션만 사용
    pub replica_hosts: Option<Vec<String>>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::Postgresql,
            host: "localhost".to_string(),
            port: 5432,
            database: "historian".to_string(),
            user: "historian".to_string(),
            password: "historian".to_string(),
            sslmode: "disable".to_string(),
            replica_hosts: None,
        }
    }
}

/// 데이터베이스 연결 풀 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// 최대 연결 수
    pub max_connections: usize,
    /// 연결 타임아웃(초)
    pub connection_timeout_seconds: u64,
    /// 연결 재사용 검사 타임아웃(초)
    pub recycle_timeout_seconds: u64,
    /// 쿼리 타임아웃(초)
    pub statement_timeout_seconds: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 4, // 쓰기는 단일 작성자
            connection_timeout_seconds: 30,  // 연결 시도 타임아웃 30초
            recycle_timeout_seconds: 5,
            statement_timeout_seconds: 30,
        }
    }
}

use std::path::Path;

use log::{info};

use histd_error::{HistorianError, Result};

use crate::config::HistorianConfig;
use crate::dbconfig::DbConfig;

/// 기본 히스토리언 설정파일
pub const HISTORIAN_CONFIG_FILE: &str = "historian.yml";
/// 기본 db 설정파일
pub const DB_CONFIG_FILE: &str = "db.yml";

/// 통합 세팅 인스턴스
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub historian: HistorianConfig,
    pub database: DbConfig,
}

impl Settings {
    /// 기본 경로에서 Setting 생성
    pub fn new() -> Result<Self> {
        Self::load(HISTORIAN_CONFIG_FILE, DB_CONFIG_FILE)
    }

    /// 지정한 경로에서 Setting 생성
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(historian_path: P, db_path: Q) -> Result<Self> {
        let historian = Self::load_historian_config(historian_path.as_ref())?;
        let database = Self::load_db_config(db_path.as_ref())?;

        let settings = Self {
            historian,
            database,
        };
        settings.validate()?;

        Ok(settings)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<()> {
        self.historian.validate()?;
        self.database.validate()
    }

    /// 히스토리언 설정 로드
    fn load_historian_config(path: &Path) -> Result<HistorianConfig> {
        // yml 파일 유무 확인
        if path.exists() {
            info!("히스토리언 설정파일 로드: {}", path.display());
            match HistorianConfig::from_file(path) {
                Ok(config) => Ok(config),
                Err(e) => {
                    Err(HistorianError::Config(format!("히스토리언 설정파일 로드 실패: {}", e)))
                }
            }
        } else {
            // 기본설정사용
            info!("히스토리언 기본설정 사용");
            Ok(HistorianConfig::new())
        }
    }

    /// db 설정 로드
    fn load_db_config(path: &Path) -> Result<DbConfig> {
        // yml 파일 유무 확인
        if path.exists() {
            info!("DB 설정파일 로드: {}", path.display());
            match DbConfig::from_file(path) {
                Ok(config) => Ok(config),
                Err(e) => {
                    Err(HistorianError::Config(format!("DB 설정파일 로드 실패: {}", e)))
                }
            }
        } else {
            // 기본설정사용
            info!("DB 기본설정 사용");
            Ok(DbConfig::default())
        }
    }
}

use std::io::Write;
use std::str::FromStr;

use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;

use histd_error::{Result, log_err};

/// 빌드 종류에 따른 기본 로그 레벨
fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// 설정값을 로그 레벨로 변환. 없으면 빌드 기본값
pub fn parse_level(level: Option<&str>) -> Result<LevelFilter> {
    match level {
        Some(level) => LevelFilter::from_str(level)
            .map_err(|e| log_err(format!("잘못된 로그 레벨 '{level}': {e}"))),
        None => Ok(default_level()),
    }
}

/// 로거 세팅. 빌드 기본 레벨로 시작하고 설정을 읽은 뒤 `set_level` 로 바꾼다
pub fn setup_logger() -> Result<()> {
    Builder::new()
        .filter(None, LevelFilter::Trace)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init()
        .map_err(log_err)?;

    log::set_max_level(default_level());
    Ok(())
}

/// 설정의 로그 레벨 적용
pub fn set_level(level: Option<&str>) -> Result<()> {
    log::set_max_level(parse_level(level)?);
    Ok(())
}

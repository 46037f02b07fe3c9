use log::{debug, error, info};

use histd_error::Result;

use crate::pool::DatabasePool;
use crate::sql::{hourly_data, topics};

/// 데이터베이스 초기화. 테이블이 없으면 생성
pub async fn initialize_db(pool: &DatabasePool) -> Result<()> {
    debug!("데이터베이스 스키마 확인");
    // 커넥션 풀에서 로드
    let conn = pool.get_connection().await?;

    create_tables(&conn).await?;
    info!("테이블 생성 완료");

    Ok(())
}

/// 테이블 생성, 인덱싱
async fn create_tables(conn: &deadpool_postgres::Object) -> Result<()> {
    // topics 테이블. hourly_data 가 참조하므로 먼저 생성
    if let Err(e) = conn.execute(topics::CREATE_TABLE, &[]).await {
        error!("topics 테이블 생성중 오류 발생: {}", e);
        return Err(e.into());
    }
    info!("topics 테이블 생성 완료");

    // hourly_data
    if let Err(e) = conn.execute(hourly_data::CREATE_TABLE, &[]).await {
        error!("hourly_data 테이블 생성중 오류 발생: {}", e);
        return Err(e.into());
    }
    info!("hourly_data 테이블 생성 완료");

    // 인덱싱
    for index_query in hourly_data::CREATE_INDICES {
        if let Err(e) = conn.execute(index_query, &[]).await {
            error!("hourly_data 인덱스 생성 실패: {}", e);
        }
    }

    Ok(())
}

/// 테이블 생성 쿼리
pub const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS topics (
        topic_id BIGSERIAL PRIMARY KEY,
        topic_name TEXT NOT NULL UNIQUE
    )
";

/// 전체 토픽 조회 쿼리
pub const SELECT_ALL: &str = "
    SELECT topic_id, topic_name
    FROM topics
    ORDER BY topic_id
";

/// 토픽 등록 쿼리. 이미 있으면 기존 id 반환
pub const INSERT: &str = "
    INSERT INTO topics (topic_name)
    VALUES ($1)
    ON CONFLICT (topic_name) DO UPDATE SET topic_name = EXCLUDED.topic_name
    RETURNING topic_id
";

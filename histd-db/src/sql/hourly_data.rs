/// 테이블 생성 쿼리
pub const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS hourly_data (
        topic_id BIGINT NOT NULL REFERENCES topics(topic_id),
        ts TIMESTAMPTZ NOT NULL,
        samples DOUBLE PRECISION[] NOT NULL,
        sample_count BIGINT NOT NULL DEFAULT 0,
        sample_sum DOUBLE PRECISION NOT NULL DEFAULT 0,
        PRIMARY KEY (topic_id, ts)
    )";

/// 인덱스 생성 쿼리
pub const CREATE_INDICES: [&str; 1] = [
    "CREATE INDEX IF NOT EXISTS hourly_data_ts_idx ON hourly_data(ts)",
];

/// 분 슬롯 교체. 같은 슬롯을 다시 쓰면 카운트/합계를 보정
/// $1 topic_id, $2 시간 버킷, $3 초기 슬롯 배열, $4 값, $5 슬롯 번호(1부터)
pub const UPSERT_SAMPLE: &str = "
    INSERT INTO hourly_data AS d (topic_id, ts, samples, sample_count, sample_sum)
    VALUES ($1, $2, $3, 1, $4)
    ON CONFLICT (topic_id, ts) DO UPDATE SET
        samples[$5] = $4,
        sample_count = d.sample_count + CASE WHEN d.samples[$5] IS NULL THEN 1 ELSE 0 END,
        sample_sum = d.sample_sum - COALESCE(d.samples[$5], 0) + $4
";

/// 분 슬롯 기록 후 카운트/합계 누적
pub const RECORD_SAMPLE: &str = "
    INSERT INTO hourly_data AS d (topic_id, ts, samples, sample_count, sample_sum)
    VALUES ($1, $2, $3, 1, $4)
    ON CONFLICT (topic_id, ts) DO UPDATE SET
        samples[$5] = $4,
        sample_count = d.sample_count + 1,
        sample_sum = d.sample_sum + $4
";

/// 기간내 버킷 조회 (오름차순). $4 최대 버킷 수
pub const SELECT_RANGE_ASC: &str = "
    SELECT topic_id, ts, samples, sample_count, sample_sum
    FROM hourly_data
    WHERE topic_id = $1 AND ts >= $2 AND ts <= $3
    ORDER BY ts ASC
    LIMIT $4
";

/// 기간내 버킷 조회 (내림차순). $4 최대 버킷 수
pub const SELECT_RANGE_DESC: &str = "
    SELECT topic_id, ts, samples, sample_count, sample_sum
    FROM hourly_data
    WHERE topic_id = $1 AND ts >= $2 AND ts <= $3
    ORDER BY ts DESC
    LIMIT $4
";

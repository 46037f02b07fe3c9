//! JSON lines 입력을 배치로 게시하는 드라이버

use std::io::BufRead;

use log::{debug, error, info, warn};

use histd_error::{Result, input_err};

use crate::historian::Historian;
use crate::record::{PublishOutcome, PublishRecord};

/// 입력 처리 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// 확인된 레코드 수
    pub handled: usize,
    /// 재전달 한도를 넘겨 버린 레코드 수
    pub dropped: usize,
    /// `publish_to_historian` 호출 횟수
    pub deliveries: usize,
}

/// 배치 게시와 재전달
///
/// 확인되지 않은 배치는 처음 한번에 더해 `max_redelivery` 번까지 다시 게시한 뒤 버린다.
#[derive(Debug, Clone, Copy)]
pub struct Ingestor {
    batch_size: usize,
    max_redelivery: u32,
}

impl Ingestor {
    pub fn new(batch_size: usize, max_redelivery: u32) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_redelivery,
        }
    }

    /// 한 줄에 레코드 하나씩 읽어 게시. 빈 줄은 건너뜀
    pub async fn run<R: BufRead>(
        &self,
        historian: &mut Historian,
        reader: R,
    ) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();
        let mut batch = Vec::with_capacity(self.batch_size);

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: PublishRecord = serde_json::from_str(&line)
                .map_err(|e| input_err(format!("{}번째 줄: {e}", lineno + 1)))?;
            batch.push(record);

            if batch.len() >= self.batch_size {
                self.deliver(historian, &batch, &mut summary).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.deliver(historian, &batch, &mut summary).await;
        }

        info!(
            "입력 종료. 기록 {}건, 폐기 {}건, 게시 {}회",
            summary.handled, summary.dropped, summary.deliveries
        );
        Ok(summary)
    }

    async fn deliver(
        &self,
        historian: &mut Historian,
        records: &[PublishRecord],
        summary: &mut IngestSummary,
    ) {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            summary.deliveries += 1;
            match historian.publish_to_historian(records).await {
                PublishOutcome::Handled { count } => {
                    debug!("배치 확인: {count}건");
                    summary.handled += records.len();
                    return;
                }
                PublishOutcome::Unacknowledged { errors } => {
                    if attempts > self.max_redelivery {
                        error!(
                            "재전달 한도 초과, 배치 폐기: {}건 (에러 {errors}건)",
                            records.len()
                        );
                        summary.dropped += records.len();
                        return;
                    }
                    warn!("배치 미확인, 재전달 {attempts}회차");
                }
            }
        }
    }
}

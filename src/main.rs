use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::{debug, info};

use histd_config::Settings;
use histd_config::setting::{DB_CONFIG_FILE, HISTORIAN_CONFIG_FILE};
use histd_db::connect_store;
use histd_error::Result;
use histd_historian::{Historian, Ingestor, QueryOrder, QueryRequest};
use histd_logging::{set_level, setup_logger};

#[derive(Parser, Debug)]
#[command(name = "histd", about = "시계열 샘플 히스토리언")]
struct Cli {
    /// 히스토리언 설정파일
    #[arg(long, default_value = HISTORIAN_CONFIG_FILE)]
    config: PathBuf,

    /// db 설정파일
    #[arg(long, default_value = DB_CONFIG_FILE)]
    db_config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 표준입력의 JSON 레코드를 배치로 기록
    Ingest,
    /// 토픽의 샘플 조회 결과를 JSON 으로 출력
    Query {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long)]
        count: Option<usize>,
        #[arg(long, default_value = "FIRST_TO_LAST")]
        order: QueryOrder,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 로거 세팅
    setup_logger()?;

    // 통합 설정 로드
    let settings = Settings::load(&cli.config, &cli.db_config)?;
    set_level(settings.historian.log_level.as_deref())?;

    info!("{} 시작", settings.historian.identity);
    debug!("집계 단위: {:?}", settings.historian.aggregation);

    // 저장소 연결 실패는 치명적
    let store = connect_store(&settings.database).await?;
    let mut historian = Historian::setup(store, settings.historian.default_query_count).await?;

    match cli.command {
        Command::Ingest => {
            let ingestor = Ingestor::new(
                settings.historian.batch_size,
                settings.historian.max_redelivery,
            );
            ingestor
                .run(&mut historian, std::io::stdin().lock())
                .await?;
        }
        Command::Query {
            topic,
            start,
            end,
            skip,
            count,
            order,
        } => {
            let request = QueryRequest {
                topic,
                start,
                end,
                skip,
                count,
                order,
            };
            let result = historian.query_historian(&request).await?;
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &result)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

pub mod topic;
pub mod record;
pub mod query;
pub mod historian;
pub mod ingest;

pub use topic::TopicMap;
pub use record::{PublishOutcome, PublishRecord};
pub use query::{QueryOrder, QueryRequest, QueryResult};
pub use historian::Historian;
pub use ingest::{IngestSummary, Ingestor};

pub mod model;
pub mod store;
pub mod memory;
pub mod pool;
pub mod db;
pub mod pg;
pub mod sql;

pub use model::{
    Bucket,
    BulkWriteResult,
    MINUTES_PER_HOUR,
    SampleWrite,
    SortOrder,
    TopicId,
    WriteError,
    truncate_to_hour,
};

pub use store::{
    SampleStore,
    connect_store,
};

pub use memory::MemoryStore;

pub use pool::{
    DatabasePool,
    PoolStatus,
};

pub use db::initialize_db;

pub use pg::PgStore;

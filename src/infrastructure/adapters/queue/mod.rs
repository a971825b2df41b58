//! Message Queue Adapters

mod sqlite_queue;

pub use sqlite_queue::{SqliteMessageQueue, SqliteQueueConfig};

//! Application Ports - 出站端口定义
//!
//! 每个外部能力一个 trait，由 infrastructure 层的适配器实现

mod blob_storage;
mod mail_sender;
mod message_queue;
mod repositories;

pub use blob_storage::{BlobFileInfo, BlobStorageError, BlobStoragePort};
pub use mail_sender::{MailError, MailSenderPort, OutgoingMail};
pub use message_queue::{
    MessageQueuePort, QueueError, QueueMessage, SentMessage, DEFAULT_SUBJECT,
};
pub use repositories::{BookRecord, BookRepositoryPort, RepositoryError};

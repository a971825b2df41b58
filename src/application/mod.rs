//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（BlobStorage、MessageQueue、MailSender、BookRepository）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{AddBookHandler, DeleteBookHandler},
    AddBook, DeleteBook,
};

pub use error::ApplicationError;

pub use ports::{
    // Blob storage
    BlobFileInfo,
    BlobStorageError,
    BlobStoragePort,
    // Mail
    MailError,
    MailSenderPort,
    OutgoingMail,
    // Message queue
    MessageQueuePort,
    QueueError,
    QueueMessage,
    SentMessage,
    // Repositories
    BookRecord,
    BookRepositoryPort,
    RepositoryError,
};

pub use queries::{handlers::ListBooksHandler, ListBooks};

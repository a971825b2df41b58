//! Application State
//!
//! 各端口以 trait object 注入，handler 通过 `State<Arc<AppState>>` 访问

use std::sync::Arc;
use std::time::Duration;

use super::error::FaultPolicy;
use crate::application::{
    // Command handlers
    AddBookHandler, DeleteBookHandler,
    // Query handlers
    ListBooksHandler,
    // Ports
    BlobStoragePort, BookRepositoryPort, MailSenderPort, MessageQueuePort,
};

/// 队列接口参数
#[derive(Debug, Clone, Copy)]
pub struct QueueOptions {
    /// receive 的最长等待时间
    pub receive_wait: Duration,
    /// 未指定 maxMessages 时的默认值
    pub default_max_messages: u32,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            receive_wait: Duration::from_secs(5),
            default_max_messages: 10,
        }
    }
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub blob_storage: Arc<dyn BlobStoragePort>,
    pub message_queue: Arc<dyn MessageQueuePort>,
    pub mail_sender: Arc<dyn MailSenderPort>,

    // ========== Command Handlers ==========
    pub add_book_handler: AddBookHandler,
    pub delete_book_handler: DeleteBookHandler,

    // ========== Query Handlers ==========
    pub list_books_handler: ListBooksHandler,

    // ========== Options ==========
    pub queue_options: QueueOptions,
    pub fault_policy: FaultPolicy,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        blob_storage: Arc<dyn BlobStoragePort>,
        message_queue: Arc<dyn MessageQueuePort>,
        mail_sender: Arc<dyn MailSenderPort>,
        book_repo: Arc<dyn BookRepositoryPort>,
    ) -> Self {
        Self {
            blob_storage,
            message_queue,
            mail_sender,

            add_book_handler: AddBookHandler::new(book_repo.clone()),
            delete_book_handler: DeleteBookHandler::new(book_repo.clone()),
            list_books_handler: ListBooksHandler::new(book_repo),

            queue_options: QueueOptions::default(),
            fault_policy: FaultPolicy::default(),
        }
    }

    pub fn with_queue_options(mut self, queue_options: QueueOptions) -> Self {
        self.queue_options = queue_options;
        self
    }

    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }
}

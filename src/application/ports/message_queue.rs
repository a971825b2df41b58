//! Message Queue Port - 出站端口
//!
//! 单队列的 send / receive / peek / complete 抽象。
//! receive 采用 peek-lock 语义：消息被锁定并增加投递次数，
//! 调用方必须 complete 才会真正移除。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// 队列错误
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue backend error: {0}")]
    Backend(String),

    #[error("Message lock lost: {0}")]
    LockLost(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 默认消息主题
pub const DEFAULT_SUBJECT: &str = "Demo Message";

/// 发送结果
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message_id: String,
    pub subject: String,
    pub sent_at: DateTime<Utc>,
}

/// 队列中的消息（peek 或 receive 得到）
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// 队列内的顺序号
    pub sequence_number: i64,
    pub message_id: String,
    pub subject: Option<String>,
    pub body: String,
    pub content_type: Option<String>,
    pub enqueued_time: DateTime<Utc>,
    pub delivery_count: u32,
    pub properties: Map<String, Value>,
    /// 只有 receive 得到的消息才带锁
    pub lock_token: Option<String>,
}

/// Message Queue Port
#[async_trait]
pub trait MessageQueuePort: Send + Sync {
    /// 发送一条文本消息
    async fn send(&self, body: &str, subject: Option<&str>) -> Result<SentMessage, QueueError>;

    /// 接收最多 `max_messages` 条消息，最长等待 `wait`
    async fn receive(
        &self,
        max_messages: u32,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError>;

    /// 非破坏性读取最多 `max_messages` 条消息
    async fn peek(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError>;

    /// 确认消息，将其从队列移除
    async fn complete(&self, message: &QueueMessage) -> Result<(), QueueError>;

    /// 队列名称
    fn queue_name(&self) -> &str;
}

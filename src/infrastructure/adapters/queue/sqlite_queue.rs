//! SQLite Message Queue - 基于 SQLite 表的消息队列
//!
//! 实现 MessageQueuePort trait，语义与 peek-lock 模式的云队列一致：
//! - receive 锁定消息并增加 delivery_count，锁过期后消息重新可见
//! - complete 凭锁删除消息
//! - peek 不加锁，也不改变 delivery_count

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use sqlx::FromRow;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::application::ports::{
    MessageQueuePort, QueueError, QueueMessage, SentMessage, DEFAULT_SUBJECT,
};
use crate::infrastructure::persistence::sqlite::DbPool;

/// 队列配置
#[derive(Debug, Clone)]
pub struct SqliteQueueConfig {
    pub queue_name: String,
    /// 写入消息属性 `Source`
    pub source: String,
    /// receive 后消息锁定时长
    pub lock_duration: Duration,
    /// receive 等待期间的轮询间隔
    pub poll_interval: Duration,
}

impl Default for SqliteQueueConfig {
    fn default() -> Self {
        Self {
            queue_name: "demo-queue".to_string(),
            source: "Infra Showcase".to_string(),
            lock_duration: Duration::from_secs(30),
            poll_interval: Duration::from_millis(200),
        }
    }
}

/// SQLite 消息队列
pub struct SqliteMessageQueue {
    pool: DbPool,
    config: SqliteQueueConfig,
}

impl SqliteMessageQueue {
    pub fn new(pool: DbPool, config: SqliteQueueConfig) -> Self {
        Self { pool, config }
    }

    /// 锁定一批可见消息（单条 UPDATE ... RETURNING，原子执行）
    async fn lock_batch(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError> {
        let now = Utc::now().timestamp_millis();
        let locked_until = now + self.config.lock_duration.as_millis() as i64;
        let lock_token = Uuid::new_v4().to_string();

        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            UPDATE queue_messages
            SET delivery_count = delivery_count + 1,
                lock_token = ?,
                locked_until = ?
            WHERE sequence_number IN (
                SELECT sequence_number FROM queue_messages
                WHERE queue_name = ?
                  AND (locked_until IS NULL OR locked_until <= ?)
                ORDER BY sequence_number
                LIMIT ?
            )
            RETURNING sequence_number, message_id, subject, body, content_type,
                      properties, enqueued_at, delivery_count, lock_token
            "#,
        )
        .bind(&lock_token)
        .bind(locked_until)
        .bind(&self.config.queue_name)
        .bind(now)
        .bind(i64::from(max_messages))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueueError::Backend(e.to_string()))?;

        let mut messages = rows
            .into_iter()
            .map(QueueMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        // RETURNING 不保证顺序
        messages.sort_by_key(|m| m.sequence_number);

        Ok(messages)
    }
}

#[derive(FromRow)]
struct MessageRow {
    sequence_number: i64,
    message_id: String,
    subject: Option<String>,
    body: String,
    content_type: Option<String>,
    properties: String,
    enqueued_at: String,
    delivery_count: i64,
    lock_token: Option<String>,
}

impl TryFrom<MessageRow> for QueueMessage {
    type Error = QueueError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let properties: Map<String, Value> = serde_json::from_str(&row.properties)
            .map_err(|e| QueueError::SerializationError(e.to_string()))?;

        Ok(QueueMessage {
            sequence_number: row.sequence_number,
            message_id: row.message_id,
            subject: row.subject,
            body: row.body,
            content_type: row.content_type,
            enqueued_time: DateTime::parse_from_rfc3339(&row.enqueued_at)
                .map_err(|e| QueueError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            delivery_count: u32::try_from(row.delivery_count)
                .map_err(|e| QueueError::SerializationError(e.to_string()))?,
            properties,
            lock_token: row.lock_token,
        })
    }
}

#[async_trait]
impl MessageQueuePort for SqliteMessageQueue {
    async fn send(&self, body: &str, subject: Option<&str>) -> Result<SentMessage, QueueError> {
        let message_id = Uuid::new_v4().to_string();
        let subject = subject.unwrap_or(DEFAULT_SUBJECT).to_string();
        let sent_at = Utc::now();
        let sent_at_text = sent_at.to_rfc3339_opts(SecondsFormat::Micros, true);

        let properties = json!({
            "SentAt": sent_at_text,
            "Source": self.config.source,
        });

        sqlx::query(
            r#"
            INSERT INTO queue_messages
                (queue_name, message_id, subject, body, content_type, properties, enqueued_at)
            VALUES (?, ?, ?, ?, 'text/plain', ?, ?)
            "#,
        )
        .bind(&self.config.queue_name)
        .bind(&message_id)
        .bind(&subject)
        .bind(body)
        .bind(properties.to_string())
        .bind(&sent_at_text)
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::Backend(e.to_string()))?;

        tracing::info!(
            queue = %self.config.queue_name,
            message_id = %message_id,
            "Message sent to queue"
        );

        Ok(SentMessage {
            message_id,
            subject,
            sent_at,
        })
    }

    async fn receive(
        &self,
        max_messages: u32,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        if max_messages == 0 {
            return Ok(Vec::new());
        }

        let deadline = Instant::now() + wait;

        loop {
            let messages = self.lock_batch(max_messages).await?;
            let now = Instant::now();

            if !messages.is_empty() || now >= deadline {
                tracing::info!(
                    queue = %self.config.queue_name,
                    count = messages.len(),
                    "Received messages from queue"
                );
                return Ok(messages);
            }

            tokio::time::sleep(self.config.poll_interval.min(deadline - now)).await;
        }
    }

    async fn peek(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT sequence_number, message_id, subject, body, content_type,
                   properties, enqueued_at, delivery_count, NULL AS lock_token
            FROM queue_messages
            WHERE queue_name = ?
            ORDER BY sequence_number
            LIMIT ?
            "#,
        )
        .bind(&self.config.queue_name)
        .bind(i64::from(max_messages))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueueError::Backend(e.to_string()))?;

        let messages = rows
            .into_iter()
            .map(QueueMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            queue = %self.config.queue_name,
            count = messages.len(),
            "Peeked messages from queue"
        );

        Ok(messages)
    }

    async fn complete(&self, message: &QueueMessage) -> Result<(), QueueError> {
        let lock_token = message.lock_token.as_deref().ok_or_else(|| {
            QueueError::LockLost(format!("message {} is not locked", message.message_id))
        })?;

        let result = sqlx::query(
            r#"
            DELETE FROM queue_messages
            WHERE sequence_number = ? AND lock_token = ? AND locked_until > ?
            "#,
        )
        .bind(message.sequence_number)
        .bind(lock_token)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(QueueError::LockLost(format!(
                "lock for message {} expired or was taken over",
                message.message_id
            )));
        }

        tracing::debug!(
            queue = %self.config.queue_name,
            message_id = %message.message_id,
            "Message completed"
        );

        Ok(())
    }

    fn queue_name(&self) -> &str {
        &self.config.queue_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn queue_with(config: SqliteQueueConfig) -> SqliteMessageQueue {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteMessageQueue::new(pool, config)
    }

    async fn queue() -> SqliteMessageQueue {
        queue_with(SqliteQueueConfig {
            poll_interval: Duration::from_millis(10),
            ..Default::default()
        })
        .await
    }

    const SHORT_WAIT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_send_sets_defaults_and_properties() {
        let queue = queue().await;

        let sent = queue.send("hello", None).await.unwrap();
        assert_eq!(sent.subject, DEFAULT_SUBJECT);

        let peeked = queue.peek(10).await.unwrap();
        assert_eq!(peeked.len(), 1);
        assert_eq!(peeked[0].message_id, sent.message_id);
        assert_eq!(peeked[0].content_type.as_deref(), Some("text/plain"));
        assert_eq!(peeked[0].properties["Source"], "Infra Showcase");
        assert!(peeked[0].properties.contains_key("SentAt"));
    }

    #[tokio::test]
    async fn test_peek_then_receive_then_empty() {
        let queue = queue().await;
        queue.send("hello", Some("demo")).await.unwrap();

        let peeked = queue.peek(10).await.unwrap();
        assert_eq!(peeked.len(), 1);
        assert_eq!(peeked[0].body, "hello");
        assert_eq!(peeked[0].subject.as_deref(), Some("demo"));
        assert_eq!(peeked[0].delivery_count, 0);
        assert!(peeked[0].lock_token.is_none());

        // peek 不改变投递次数
        let peeked_again = queue.peek(10).await.unwrap();
        assert_eq!(peeked_again[0].delivery_count, 0);

        let received = queue.receive(10, SHORT_WAIT).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].delivery_count, 1);
        for message in &received {
            queue.complete(message).await.unwrap();
        }

        assert!(queue.receive(10, SHORT_WAIT).await.unwrap().is_empty());
        assert!(queue.peek(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receive_respects_max_and_order() {
        let queue = queue().await;
        for i in 0..5 {
            queue.send(&format!("m{}", i), None).await.unwrap();
        }

        let first = queue.receive(2, SHORT_WAIT).await.unwrap();
        let bodies: Vec<_> = first.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["m0", "m1"]);

        // 已锁定的消息不会再次被 receive
        let second = queue.receive(10, SHORT_WAIT).await.unwrap();
        let bodies: Vec<_> = second.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["m2", "m3", "m4"]);

        // peek 仍能看到被锁定的消息
        assert_eq!(queue.peek(10).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_expired_lock_redelivers() {
        let queue = queue_with(SqliteQueueConfig {
            lock_duration: Duration::ZERO,
            poll_interval: Duration::from_millis(10),
            ..Default::default()
        })
        .await;
        queue.send("hello", None).await.unwrap();

        let first = queue.receive(1, SHORT_WAIT).await.unwrap();
        assert_eq!(first[0].delivery_count, 1);

        let second = queue.receive(1, SHORT_WAIT).await.unwrap();
        assert_eq!(second[0].delivery_count, 2);

        // 旧锁已失效
        let err = queue.complete(&first[0]).await.unwrap_err();
        assert!(matches!(err, QueueError::LockLost(_)));
    }

    #[tokio::test]
    async fn test_complete_requires_lock() {
        let queue = queue().await;
        queue.send("hello", None).await.unwrap();

        let peeked = queue.peek(1).await.unwrap();
        let err = queue.complete(&peeked[0]).await.unwrap_err();
        assert!(matches!(err, QueueError::LockLost(_)));
    }

    #[tokio::test]
    async fn test_receive_waits_for_late_message() {
        let queue = std::sync::Arc::new(queue().await);

        let sender = queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            sender.send("late", None).await.unwrap();
        });

        let received = queue.receive(10, Duration::from_secs(5)).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].body, "late");
    }

    #[tokio::test]
    async fn test_queues_are_isolated() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let a = SqliteMessageQueue::new(pool.clone(), SqliteQueueConfig::default());
        let b = SqliteMessageQueue::new(
            pool,
            SqliteQueueConfig {
                queue_name: "other-queue".to_string(),
                ..Default::default()
            },
        );

        a.send("hello", None).await.unwrap();
        assert_eq!(a.peek(10).await.unwrap().len(), 1);
        assert!(b.peek(10).await.unwrap().is_empty());
    }
}

//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::book::NewBook;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Book Repository
// ============================================================================

/// 图书实体（用于持久化）
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub page_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Book Repository Port
#[async_trait]
pub trait BookRepositoryPort: Send + Sync {
    /// 保存新图书，返回带 ID 的记录
    async fn save(&self, book: &NewBook) -> Result<BookRecord, RepositoryError>;

    /// 根据 ID 查找图书
    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepositoryError>;

    /// 获取所有图书（按创建时间倒序）
    async fn find_all(&self) -> Result<Vec<BookRecord>, RepositoryError>;

    /// 删除图书，返回是否真的删除了记录
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

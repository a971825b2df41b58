//! Blob Storage Port - 出站端口
//!
//! 对象存储的抽象接口：上传 + 列表

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Blob 存储错误
#[derive(Debug, Error)]
pub enum BlobStorageError {
    #[error("Invalid blob name: {0}")]
    InvalidName(String),

    #[error("Object store error: {0}")]
    Store(String),
}

/// Blob 元数据（列表项）
#[derive(Debug, Clone, PartialEq)]
pub struct BlobFileInfo {
    pub name: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
}

/// Blob Storage Port
///
/// 所有 blob 都位于同一个容器下，上传同名文件会覆盖
#[async_trait]
pub trait BlobStoragePort: Send + Sync {
    /// 上传文件，返回存储后的 blob 名称
    async fn upload(&self, file_name: &str, data: Vec<u8>) -> Result<String, BlobStorageError>;

    /// 列出容器内所有 blob
    async fn list(&self) -> Result<Vec<BlobFileInfo>, BlobStorageError>;

    /// 容器名称（用于日志）
    fn container(&self) -> &str;
}

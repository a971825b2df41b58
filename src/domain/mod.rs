//! Domain Layer - 领域层
//!
//! 唯一的持久化实体是图书目录记录，其余能力（Blob、队列、邮件）
//! 都只是外部服务的透传，不在领域层建模。

pub mod book;

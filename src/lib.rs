//! Infra Showcase - 基础设施能力演示服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book: 图书实体与字段校验
//!
//! 应用层 (application/):
//! - Ports: 端口定义（BlobStorage, MessageQueue, MailSender, BookRepository）
//! - Commands: 新增 / 删除图书
//! - Queries: 图书列表
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API、统一响应信封、全局故障转换
//! - Persistence: SQLite 存储（books 表 + 队列消息表）
//! - Adapters: object_store Blob 存储、SQLite 消息队列、SMTP 邮件

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

//! Persistence Layer - 数据持久化
//!
//! SQLite 存储实现（books 表 + 队列消息表）

pub mod sqlite;

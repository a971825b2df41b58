//! Book Queries

/// 列出所有图书查询（按创建时间倒序）
#[derive(Debug, Clone)]
pub struct ListBooks;

//! Book Commands

/// 创建图书命令
///
/// 字段保持原始输入（可能缺失），由 handler 交给领域层校验
#[derive(Debug, Clone, Default)]
pub struct AddBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub page_count: Option<i32>,
}

/// 删除图书命令
#[derive(Debug, Clone)]
pub struct DeleteBook {
    pub book_id: i64,
}

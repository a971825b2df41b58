//! Book Context - Entities

use std::collections::BTreeMap;

use super::BookError;

/// 标题最大长度（字符）
pub const MAX_TITLE_LEN: usize = 200;
/// 作者最大长度（字符）
pub const MAX_AUTHOR_LEN: usize = 100;
/// ISBN 最大长度（字符）
pub const MAX_ISBN_LEN: usize = 20;

/// 字段名 -> 错误描述
pub type FieldErrors = BTreeMap<String, String>;

/// 待创建的图书
///
/// 只能通过 [`NewBook::new`] 构造，保证所有字段已通过校验
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    title: String,
    author: String,
    isbn: String,
    page_count: i32,
}

impl NewBook {
    /// 校验并创建图书
    ///
    /// 一次性收集所有字段错误，而不是遇到第一个就返回
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        isbn: Option<String>,
        page_count: Option<i32>,
    ) -> Result<Self, BookError> {
        let mut errors = FieldErrors::new();

        let title = required_text(&mut errors, "title", "Title", title, MAX_TITLE_LEN);
        let author = required_text(&mut errors, "author", "Author", author, MAX_AUTHOR_LEN);
        let isbn = required_text(&mut errors, "isbn", "ISBN", isbn, MAX_ISBN_LEN);

        let page_count = match page_count {
            None => {
                errors.insert("pageCount".into(), "PageCount is required".into());
                None
            }
            Some(n) if n < 0 => {
                errors.insert("pageCount".into(), "PageCount cannot be negative".into());
                None
            }
            Some(n) => Some(n),
        };

        match (title, author, isbn, page_count) {
            (Some(title), Some(author), Some(isbn), Some(page_count)) if errors.is_empty() => {
                Ok(Self {
                    title,
                    author,
                    isbn,
                    page_count,
                })
            }
            _ => Err(BookError::InvalidFields(errors)),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn page_count(&self) -> i32 {
        self.page_count
    }
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<String>,
    max_len: usize,
) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();

    if value.is_empty() {
        errors.insert(field.to_string(), format!("{} is required", label));
        return None;
    }

    if value.chars().count() > max_len {
        errors.insert(
            field.to_string(),
            format!("{} cannot exceed {} characters", label, max_len),
        );
        return None;
    }

    Some(value)
}

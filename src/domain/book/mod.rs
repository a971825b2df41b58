//! Book Context - 图书目录限界上下文
//!
//! 职责:
//! - 图书字段校验（必填 + 长度限制）
//! - 创建时间由持久化层填充

mod entity;
mod errors;

pub use entity::{FieldErrors, NewBook, MAX_AUTHOR_LEN, MAX_ISBN_LEN, MAX_TITLE_LEN};
pub use errors::BookError;

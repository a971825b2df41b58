//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use std::fmt::Display;

use thiserror::Error;

use crate::domain::book::{BookError, FieldErrors};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 字段级验证错误
    #[error("{message}")]
    InvalidFields {
        message: String,
        errors: FieldErrors,
    },

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }
}

impl From<crate::application::ports::RepositoryError> for ApplicationError {
    fn from(err: crate::application::ports::RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<BookError> for ApplicationError {
    fn from(err: BookError) -> Self {
        let message = err.to_string();
        match err {
            BookError::InvalidFields(errors) => Self::InvalidFields { message, errors },
        }
    }
}

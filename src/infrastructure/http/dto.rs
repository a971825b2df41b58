//! Data Transfer Objects - 统一响应信封

use serde::Serialize;

use crate::domain::book::FieldErrors;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
///
/// - 成功：`success = true`，可带 `data` 和 `message`
/// - 失败：`success = false`，带 `message`，可带字段级 `errors`，从不带 `data`
///
/// 缺省字段不会出现在 JSON 中
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    /// 附加提示信息，空字符串会被忽略
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = non_empty(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// 成功但无数据
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: non_empty(message.into()),
            data: None,
            errors: None,
        }
    }

    /// 错误响应
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: non_empty(message.into()),
            data: None,
            errors: None,
        }
    }

    /// 带字段级错误的错误响应
    pub fn error_with_fields(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            errors: (!errors.is_empty()).then_some(errors),
            ..Self::error(message)
        }
    }
}

fn non_empty(message: String) -> Option<String> {
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}

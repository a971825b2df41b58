//! HTTP Error Handling
//!
//! - 客户端错误（400 / 404）由 handler 直接返回带描述的信封
//! - 其余故障统一成 [`InternalFault`]，由 `translate_faults` 中间件
//!   记录日志并按环境决定是否暴露细节

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;

use super::dto::ApiResponse;
use crate::application::{
    ApplicationError, BlobStorageError, MailError, QueueError,
};
use crate::domain::book::FieldErrors;

/// 500 响应的固定提示
pub const GENERIC_FAULT_MESSAGE: &str = "An error occurred while processing your request.";
/// 非开发环境下替代真实错误的文本
pub const REDACTED_DETAILS: &str = "Internal server error";

/// 故障暴露策略
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultPolicy {
    /// 是否在响应中返回真实错误信息（仅开发环境）
    pub expose_details: bool,
}

impl FaultPolicy {
    pub fn for_environment(environment: &str) -> Self {
        Self {
            expose_details: environment.eq_ignore_ascii_case("development"),
        }
    }
}

/// 未处理的内部故障
///
/// 作为 response extension 传递给 `translate_faults`
#[derive(Debug, Clone)]
pub struct InternalFault {
    pub kind: &'static str,
    pub detail: String,
}

impl InternalFault {
    pub fn new(kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// 从 panic payload 提取信息
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic".to_string()
        };

        Self::new("Panic", detail)
    }

    /// 生成 500 信封
    pub fn to_response(&self, policy: FaultPolicy) -> Response {
        let details = if policy.expose_details {
            self.detail.clone()
        } else {
            REDACTED_DETAILS.to_string()
        };

        let mut errors = FieldErrors::new();
        errors.insert("exceptionType".to_string(), self.kind.to_string());
        errors.insert("details".to_string(), details);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error_with_fields(GENERIC_FAULT_MESSAGE, errors)),
        )
            .into_response()
    }
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InvalidFields { message: String, errors: FieldErrors },
    NotFound(String),
    PayloadTooLarge(String),
    Internal(InternalFault),
}

impl ApiError {
    pub fn internal(kind: &'static str, detail: impl Into<String>) -> Self {
        ApiError::Internal(InternalFault::new(kind, detail))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg))).into_response()
            }
            ApiError::InvalidFields { message, errors } => {
                let fields: Vec<&String> = errors.keys().collect();
                tracing::warn!(error = %message, fields = ?fields, "Validation failed");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error_with_fields(message, errors)),
                )
                    .into_response()
            }
            ApiError::NotFound(msg) => {
                tracing::warn!(error = %msg, "Resource not found");
                (StatusCode::NOT_FOUND, Json(ApiResponse::error(msg))).into_response()
            }
            ApiError::PayloadTooLarge(msg) => {
                tracing::warn!(error = %msg, "Payload too large");
                (StatusCode::PAYLOAD_TOO_LARGE, Json(ApiResponse::error(msg))).into_response()
            }
            ApiError::Internal(fault) => {
                // 默认就是脱敏后的响应，交给 translate_faults 记录并按环境重写
                let mut response = fault.to_response(FaultPolicy::default());
                response.extensions_mut().insert(fault);
                response
            }
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, .. } => {
                ApiError::NotFound(format!("{} not found", resource_type))
            }
            ApplicationError::InvalidFields { message, errors } => {
                ApiError::InvalidFields { message, errors }
            }
            ApplicationError::RepositoryError(msg) => ApiError::internal("RepositoryError", msg),
        }
    }
}

impl From<BlobStorageError> for ApiError {
    fn from(e: BlobStorageError) -> Self {
        match e {
            BlobStorageError::InvalidName(msg) => {
                ApiError::BadRequest(format!("Invalid file name: {}", msg))
            }
            BlobStorageError::Store(_) => ApiError::internal("BlobStorageError", e.to_string()),
        }
    }
}

impl From<QueueError> for ApiError {
    fn from(e: QueueError) -> Self {
        ApiError::internal("QueueError", e.to_string())
    }
}

impl From<MailError> for ApiError {
    fn from(e: MailError) -> Self {
        match e {
            MailError::InvalidAddress(_) => ApiError::BadRequest(e.to_string()),
            _ => ApiError::internal("MailError", e.to_string()),
        }
    }
}

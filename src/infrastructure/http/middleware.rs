//! HTTP Middleware
//!
//! - `translate_faults`: 全局故障转换，所有未处理故障在此统一成 500 信封
//! - `panic_to_fault`: 配合 `CatchPanicLayer`，把 panic 变成故障
//! - `error_logging_middleware`: 4xx / 5xx 状态码日志

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::any::Any;

use super::error::{FaultPolicy, InternalFault};

/// 全局故障转换中间件
///
/// 响应中带有 [`InternalFault`] extension 时，记录完整错误并按
/// [`FaultPolicy`] 重写响应体；非开发环境下真实错误信息不会出现在响应中
pub async fn translate_faults(
    State(policy): State<FaultPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<InternalFault>() {
        Some(fault) => {
            tracing::error!(
                method = %method,
                uri = %uri,
                exception_type = fault.kind,
                error = %fault.detail,
                "An unhandled exception occurred"
            );
            fault.to_response(policy)
        }
        None => response,
    }
}

/// `CatchPanicLayer` 的 panic 处理函数
pub fn panic_to_fault(payload: Box<dyn Any + Send + 'static>) -> Response {
    let fault = InternalFault::from_panic(payload.as_ref());
    let mut response = fault.to_response(FaultPolicy::default());
    response.extensions_mut().insert(fault);
    response
}

/// HTTP 状态码错误日志中间件
///
/// 拦截 HTTP 响应，当状态码为 4xx 或 5xx 时记录日志
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::error::{ApiError, GENERIC_FAULT_MESSAGE, REDACTED_DETAILS};
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn not_found_handler() -> StatusCode {
        StatusCode::NOT_FOUND
    }

    async fn fault_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::internal(
            "QueueError",
            "connection refused: secret-host:5672",
        ))
    }

    async fn panic_handler() -> &'static str {
        panic!("invariant broken: secret state")
    }

    fn create_test_router(policy: FaultPolicy) -> Router {
        Router::new()
            .route("/ok", get(ok_handler))
            .route("/not-found", get(not_found_handler))
            .route("/fault", get(fault_handler))
            .route("/panic", get(panic_handler))
            .layer(CatchPanicLayer::custom(panic_to_fault))
            .layer(axum::middleware::from_fn_with_state(policy, translate_faults))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn call(policy: FaultPolicy, uri: &str) -> (StatusCode, String) {
        let request = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
        let response = create_test_router(policy).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    const PRODUCTION: FaultPolicy = FaultPolicy {
        expose_details: false,
    };
    const DEVELOPMENT: FaultPolicy = FaultPolicy {
        expose_details: true,
    };

    #[tokio::test]
    async fn test_ok_response_untouched() {
        let (status, body) = call(PRODUCTION, "/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_client_error_untouched() {
        let (status, _) = call(PRODUCTION, "/not-found").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_fault_redacted_in_production() {
        let (status, body) = call(PRODUCTION, "/fault").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("secret-host"));

        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], GENERIC_FAULT_MESSAGE);
        assert_eq!(value["errors"]["exceptionType"], "QueueError");
        assert_eq!(value["errors"]["details"], REDACTED_DETAILS);
        assert!(value.get("data").is_none());
    }

    #[tokio::test]
    async fn test_fault_detail_in_development() {
        let (status, body) = call(DEVELOPMENT, "/fault").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            value["errors"]["details"],
            "connection refused: secret-host:5672"
        );
    }

    #[tokio::test]
    async fn test_panic_redacted_in_production() {
        let (status, body) = call(PRODUCTION, "/panic").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("secret state"));

        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["errors"]["exceptionType"], "Panic");
    }

    #[tokio::test]
    async fn test_panic_detail_in_development() {
        let (_, body) = call(DEVELOPMENT, "/panic").await;
        assert!(body.contains("invariant broken: secret state"));
    }
}

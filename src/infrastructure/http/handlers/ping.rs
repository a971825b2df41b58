//! Ping Handler
//!
//! 健康检查，附带当前使用的容器和队列名称

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub blob_container: String,
    pub queue_name: String,
}

/// Ping endpoint - 健康检查（不经过统一信封）
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        blob_container: state.blob_storage.container().to_string(),
        queue_name: state.message_queue.queue_name().to_string(),
    })
}

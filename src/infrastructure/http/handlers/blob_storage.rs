//! Blob Storage HTTP Handlers

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::application::BlobFileInfo;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

const UPLOAD_SUCCESS: &str = "File uploaded successfully";

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobFileResponse {
    pub name: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
}

impl From<BlobFileInfo> for BlobFileResponse {
    fn from(info: BlobFileInfo) -> Self {
        Self {
            name: info.name,
            size: info.size,
            last_modified: info.last_modified,
            content_type: info.content_type,
        }
    }
}

/// 超过请求体上限时返回 413，其余读取错误为 400
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    let message = format!("{}: {}", context, e.body_text());

    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(message)
    } else {
        ApiError::BadRequest(message)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// 上传文件（multipart 字段 `file`）
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::BadRequest("No file provided".to_string()))?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart field", e))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::BadRequest("File name is required".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file", e))?
            .to_vec();

        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload
        .filter(|(_, data)| !data.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    let file_name = state.blob_storage.upload(&file_name, data).await?;

    Ok(Json(
        ApiResponse::success(UploadResponse {
            file_name,
            message: UPLOAD_SUCCESS.to_string(),
        })
        .with_message(UPLOAD_SUCCESS),
    ))
}

/// 列出容器内所有文件
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BlobFileResponse>>>, ApiError> {
    let files = state.blob_storage.list().await?;

    Ok(Json(ApiResponse::success(
        files.into_iter().map(BlobFileResponse::from).collect(),
    )))
}

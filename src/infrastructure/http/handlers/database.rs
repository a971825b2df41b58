//! Database (Book) HTTP Handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{AddBook, BookRecord, DeleteBook, ListBooks};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(alias = "ISBN")]
    pub isbn: Option<String>,
    pub page_count: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub page_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<BookRecord> for BookResponse {
    fn from(record: BookRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            author: record.author,
            isbn: record.isbn,
            page_count: record.page_count,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// 获取图书列表（最新的在前）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BookResponse>>>, ApiError> {
    let books = state.list_books_handler.handle(ListBooks).await?;

    Ok(Json(ApiResponse::success(
        books.into_iter().map(BookResponse::from).collect(),
    )))
}

/// 新增图书
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddBookRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let Json(req) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;

    let command = AddBook {
        title: req.title,
        author: req.author,
        isbn: req.isbn,
        page_count: req.page_count,
    };

    let book = state.add_book_handler.handle(command).await?;

    Ok(Json(
        ApiResponse::success(BookResponse::from(book)).with_message("Book added successfully!"),
    ))
}

/// 删除图书
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Path(book_id) =
        id.map_err(|e| ApiError::BadRequest(format!("Invalid book id: {}", e.body_text())))?;

    state
        .delete_book_handler
        .handle(DeleteBook { book_id })
        .await?;

    Ok(Json(ApiResponse::message("Book deleted successfully!")))
}

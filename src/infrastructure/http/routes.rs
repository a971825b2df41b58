//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                      GET     健康检查
//! - /api/BlobStorage/upload        POST    上传文件（multipart `file`）
//! - /api/BlobStorage/list          GET     列出文件
//! - /api/Database/books            GET     图书列表（最新在前）
//! - /api/Database/books            POST    新增图书
//! - /api/Database/books/:id        DELETE  删除图书
//! - /api/Mailing/send              POST    发送测试邮件
//! - /api/ServiceBus/send           POST    发送队列消息
//! - /api/ServiceBus/receive        GET     接收并移除消息
//! - /api/ServiceBus/peek           GET     查看消息

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/BlobStorage", blob_storage_routes())
        .nest("/Database", database_routes())
        .nest("/Mailing", mailing_routes())
        .nest("/ServiceBus", service_bus_routes())
}

/// BlobStorage 路由
fn blob_storage_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::upload_file))
        .route("/list", get(handlers::list_files))
}

/// Database 路由
fn database_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/books",
            get(handlers::list_books).post(handlers::add_book),
        )
        .route("/books/:id", delete(handlers::delete_book))
}

/// Mailing 路由
fn mailing_routes() -> Router<Arc<AppState>> {
    Router::new().route("/send", post(handlers::send_mail))
}

/// ServiceBus 路由
fn service_bus_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/send", post(handlers::send_message))
        .route("/receive", get(handlers::receive_messages))
        .route("/peek", get(handlers::peek_messages))
}

//! HTTP Layer - RESTful API
//!
//! 所有 `/api/*` 响应（ping 除外）使用统一的 [`dto::ApiResponse`] 信封，
//! 未处理故障由 [`middleware::translate_faults`] 统一转换为 500

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;

//! HTTP Handlers
//!
//! 每个外部能力一组 handler，只做参数校验，然后调用对应的端口

mod blob_storage;
mod database;
mod mailing;
mod ping;
mod service_bus;

pub use blob_storage::*;
pub use database::*;
pub use mailing::*;
pub use ping::*;
pub use service_bus::*;

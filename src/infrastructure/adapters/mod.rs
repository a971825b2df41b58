//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod mail;
pub mod queue;
pub mod storage;

pub use mail::*;
pub use queue::*;
pub use storage::*;

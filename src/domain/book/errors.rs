//! Book Context - Errors

use thiserror::Error;

use super::FieldErrors;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("One or more validation errors occurred")]
    InvalidFields(FieldErrors),
}

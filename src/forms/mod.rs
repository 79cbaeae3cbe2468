//! Form definitions backing the catalog routes.

use thiserror::Error;
use validator::ValidationErrors;

pub mod books;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid title")]
    InvalidTitle,

    #[error("invalid author")]
    InvalidAuthor,

    #[error("invalid year")]
    InvalidYear,
}

//! Client side of the catalog: the REST contract, its reqwest implementation
//! and the async session that drives the list-synchronization core.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::book::{Book, NewBook, UpdateBook};
use crate::domain::query::{BookPage, ListQuery};
use crate::domain::types::BookId;

pub mod command;
pub mod http;
pub mod session;

pub use command::Command;
pub use http::HttpBooksApi;
pub use session::{BrowseSession, SessionHandle};

/// Failure of a call to the books service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The service could not be reached or did not answer in time.
    #[error("Network error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// The service rejected the payload (validation or duplicate rules).
    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
    /// The response body could not be understood.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classifies a non-success status. `400`, `409` and `422` are payload
    /// rejections; anything else is a transport-level status failure.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 409 | 422 => ApiError::Rejected { status, message },
            _ => ApiError::Status { status, message },
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Request/response contract of the remote books resource.
#[async_trait]
pub trait BooksApi: Send + Sync {
    /// One page of the filtered, sorted catalog and the filtered total.
    async fn list(&self, query: &ListQuery) -> ApiResult<BookPage>;
    async fn create(&self, book: &NewBook) -> ApiResult<Book>;
    async fn update(&self, id: BookId, changes: &UpdateBook) -> ApiResult<Book>;
    async fn delete(&self, id: BookId) -> ApiResult<()>;
}

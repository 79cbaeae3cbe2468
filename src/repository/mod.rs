use crate::domain::book::{Book, NewBook, UpdateBook};
use crate::domain::query::ListQuery;
use crate::domain::types::BookId;
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod memory;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use memory::InMemoryRepository;

pub trait BookReader {
    fn get_book_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>>;
    /// Returns the size of the whole filtered set and the requested slice.
    fn list_books(&self, query: &ListQuery) -> RepositoryResult<(usize, Vec<Book>)>;
}

pub trait BookWriter {
    fn create_book(&self, new_book: &NewBook) -> RepositoryResult<Book>;
    fn update_book(&self, id: BookId, updates: &UpdateBook) -> RepositoryResult<Book>;
    fn delete_book(&self, id: BookId) -> RepositoryResult<()>;
}

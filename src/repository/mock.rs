//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::book::{Book, NewBook, UpdateBook};
use crate::domain::query::ListQuery;
use crate::domain::types::BookId;
use crate::repository::errors::RepositoryResult;
use crate::repository::{BookReader, BookWriter};

mock! {
    pub Repository {}

    impl BookReader for Repository {
        fn get_book_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>>;
        fn list_books(&self, query: &ListQuery) -> RepositoryResult<(usize, Vec<Book>)>;
    }

    impl BookWriter for Repository {
        fn create_book(&self, new_book: &NewBook) -> RepositoryResult<Book>;
        fn update_book(&self, id: BookId, updates: &UpdateBook) -> RepositoryResult<Book>;
        fn delete_book(&self, id: BookId) -> RepositoryResult<()>;
    }
}

use crate::domain::book::{Book, NewBook, UpdateBook};
use crate::domain::query::{BookPage, ListQuery};
use crate::domain::types::BookId;
use crate::dto::api::ListBooksParams;
use crate::forms::books::{CreateBookForm, UpdateBookForm};
use crate::repository::{BookReader, BookWriter};
use crate::services::{ServiceError, ServiceResult};

/// Returns one page of the filtered, sorted catalog and the filtered total.
pub fn list_books<R>(repo: &R, params: ListBooksParams) -> ServiceResult<BookPage>
where
    R: BookReader + ?Sized,
{
    let query = ListQuery::try_from(params)?;

    let (total, items) = repo.list_books(&query).map_err(|err| {
        log::error!("Failed to list books: {err}");
        err
    })?;

    Ok(BookPage { items, total })
}

/// Fetches a single book.
pub fn get_book<R>(repo: &R, id: i64) -> ServiceResult<Book>
where
    R: BookReader + ?Sized,
{
    let id = BookId::new(id).map_err(|_| ServiceError::NotFound)?;
    repo.get_book_by_id(id)?.ok_or(ServiceError::NotFound)
}

/// Validates the form and registers a new book.
pub fn create_book<R>(repo: &R, form: CreateBookForm) -> ServiceResult<Book>
where
    R: BookWriter + ?Sized,
{
    let new_book = NewBook::try_from(form).map_err(|err| {
        log::warn!("Rejected book form: {err}");
        err
    })?;

    let book = repo.create_book(&new_book).map_err(|err| {
        log::error!("Failed to create a book: {err}");
        err
    })?;

    log::info!("Created book {} ({})", book.id, book.title);
    Ok(book)
}

/// Applies a partial update to a book.
pub fn update_book<R>(repo: &R, id: i64, form: UpdateBookForm) -> ServiceResult<Book>
where
    R: BookWriter + ?Sized,
{
    let id = BookId::new(id).map_err(|_| ServiceError::NotFound)?;
    let updates = UpdateBook::try_from(form)?;

    repo.update_book(id, &updates).map_err(|err| {
        log::error!("Failed to update book {id}: {err}");
        ServiceError::from(err)
    })
}

/// Removes a book from the catalog.
pub fn delete_book<R>(repo: &R, id: i64) -> ServiceResult<()>
where
    R: BookWriter + ?Sized,
{
    let id = BookId::new(id).map_err(|_| ServiceError::NotFound)?;

    repo.delete_book(id).map_err(|err| {
        log::error!("Failed to delete book {id}: {err}");
        err
    })?;

    log::info!("Deleted book {id}");
    Ok(())
}

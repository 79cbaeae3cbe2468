//! Process-local catalog store.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use crate::domain::book::{Book, NewBook, UpdateBook, identity_key};
use crate::domain::query::{ListQuery, SortKey, SortOrder};
use crate::domain::types::BookId;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{BookReader, BookWriter};

#[derive(Debug)]
struct Store {
    books: Vec<Book>,
    next_id: i64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            books: Vec::new(),
            next_id: 1,
        }
    }
}

/// Repository keeping books in insertion order behind a mutex. Clones share
/// the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_search(book: &Book, needle: &str) -> bool {
    book.title.to_lowercase().contains(needle) || book.author.to_lowercase().contains(needle)
}

fn compare(a: &Book, b: &Book, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Author => a.author.cmp(&b.author),
        SortKey::Year => a.year.cmp(&b.year),
    }
}

fn ensure_unique(books: &[Book], candidate: &Book) -> RepositoryResult<()> {
    let key = candidate.identity_key();
    let duplicate = books
        .iter()
        .any(|other| other.id != candidate.id && other.identity_key() == key);
    if duplicate {
        return Err(RepositoryError::ConstraintViolation(
            "Duplicate book".to_string(),
        ));
    }
    Ok(())
}

impl BookReader for InMemoryRepository {
    fn get_book_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>> {
        let store = self.store.lock()?;
        Ok(store.books.iter().find(|book| book.id == id).cloned())
    }

    fn list_books(&self, query: &ListQuery) -> RepositoryResult<(usize, Vec<Book>)> {
        let store = self.store.lock()?;

        let needle = query
            .q
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut results: Vec<&Book> = match &needle {
            Some(needle) => store
                .books
                .iter()
                .filter(|book| matches_search(book, needle))
                .collect(),
            None => store.books.iter().collect(),
        };

        if let Some(key) = query.sort {
            // `sort_by` is stable, so equal keys keep insertion order in both
            // directions.
            match query.order {
                SortOrder::Asc => results.sort_by(|a, b| compare(a, b, key)),
                SortOrder::Desc => results.sort_by(|a, b| compare(b, a, key)),
            }
        }

        let total = results.len();
        let items = results
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();

        Ok((total, items))
    }
}

impl BookWriter for InMemoryRepository {
    fn create_book(&self, new_book: &NewBook) -> RepositoryResult<Book> {
        let mut store = self.store.lock()?;

        let key = identity_key(&new_book.title, &new_book.author);
        if store.books.iter().any(|book| book.identity_key() == key) {
            return Err(RepositoryError::ConstraintViolation(
                "Duplicate book".to_string(),
            ));
        }

        let id = BookId::new(store.next_id)
            .map_err(|e| RepositoryError::Unexpected(e.to_string()))?;
        store.next_id += 1;

        let book = new_book.clone().into_book(id);
        store.books.push(book.clone());
        Ok(book)
    }

    fn update_book(&self, id: BookId, updates: &UpdateBook) -> RepositoryResult<Book> {
        let mut store = self.store.lock()?;

        let position = store
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or(RepositoryError::NotFound)?;

        let updated = store.books[position].with_update(updates);
        ensure_unique(&store.books, &updated)?;

        store.books[position] = updated.clone();
        Ok(updated)
    }

    fn delete_book(&self, id: BookId) -> RepositoryResult<()> {
        let mut store = self.store.lock()?;

        let position = store
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or(RepositoryError::NotFound)?;
        store.books.remove(position);
        Ok(())
    }
}

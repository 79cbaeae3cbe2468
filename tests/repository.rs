use std::thread;

use pushkind_library::domain::book::{NewBook, UpdateBook};
use pushkind_library::domain::query::{ListQuery, SortKey, SortOrder};
use pushkind_library::domain::types::{AuthorName, BookTitle, PublicationYear};
use pushkind_library::repository::errors::RepositoryError;
use pushkind_library::repository::{BookReader, BookWriter, InMemoryRepository};

fn new_book(title: &str, author: &str, year: i32) -> NewBook {
    NewBook::new(
        BookTitle::new(title).unwrap(),
        AuthorName::new(author).unwrap(),
        PublicationYear::new(year).unwrap(),
    )
}

#[test]
fn test_book_repository_crud() {
    let repo = InMemoryRepository::new();

    let dune = repo
        .create_book(&new_book("Dune", "Frank Herbert", 1965))
        .unwrap();
    let code = repo
        .create_book(&new_book("Clean Code", "Robert C. Martin", 2008))
        .unwrap();
    assert_eq!(dune.id.get(), 1);
    assert_eq!(code.id.get(), 2);

    let (total, items) = repo
        .list_books(&ListQuery::default().sort(SortKey::Year, SortOrder::Desc))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(items[0].id, code.id);

    let updated = repo.update_book(dune.id, &UpdateBook::read(true)).unwrap();
    assert!(updated.read);
    assert_eq!(repo.get_book_by_id(dune.id).unwrap(), Some(updated));

    repo.delete_book(dune.id).unwrap();
    assert_eq!(repo.get_book_by_id(dune.id).unwrap(), None);
    assert!(matches!(
        repo.delete_book(dune.id),
        Err(RepositoryError::NotFound)
    ));

    let (total, _) = repo.list_books(&ListQuery::default()).unwrap();
    assert_eq!(total, 1);
}

#[test]
fn test_clones_share_the_catalog_across_threads() {
    let repo = InMemoryRepository::new();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let repo = repo.clone();
            thread::spawn(move || {
                for n in 0..5 {
                    repo.create_book(&new_book(&format!("Book {worker}-{n}"), "Author", 2000))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let (total, items) = repo
        .list_books(&ListQuery::default().paginate(1, 100))
        .unwrap();
    assert_eq!(total, 20);
    let mut ids: Vec<i64> = items.iter().map(|b| b.id.get()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
}

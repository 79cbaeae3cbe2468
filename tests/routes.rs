use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use pushkind_library::domain::book::Book;
use pushkind_library::repository::InMemoryRepository;
use pushkind_library::routes;

macro_rules! app {
    ($repo:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($repo.clone()))
                .configure(routes::configure),
        )
        .await
    };
}

fn book_json(title: &str, author: &str, year: i32) -> Value {
    json!({ "title": title, "author": author, "year": year })
}

#[actix_web::test]
async fn create_returns_created_book_with_location() {
    let repo = InMemoryRepository::new();
    let app = app!(repo);

    let req = test::TestRequest::post()
        .uri("/books")
        .set_json(book_json("Clean Code", "Robert C. Martin", 2008))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/books/1");
    let book: Book = test::read_body_json(resp).await;
    assert_eq!(book.id.get(), 1);
    assert_eq!(book.title.as_str(), "Clean Code");
    assert!(!book.read);
}

#[actix_web::test]
async fn duplicate_title_and_author_conflicts() {
    let repo = InMemoryRepository::new();
    let app = app!(repo);

    let first = test::TestRequest::post()
        .uri("/books")
        .set_json(book_json("Refactoring", "Martin Fowler", 1999))
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), StatusCode::CREATED);

    let again = test::TestRequest::post()
        .uri("/books")
        .set_json(book_json(" refactoring ", "MARTIN FOWLER", 2018))
        .to_request();
    let resp = test::call_service(&app, again).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Duplicate book");
}

#[actix_web::test]
async fn invalid_payloads_are_unprocessable() {
    let repo = InMemoryRepository::new();
    let app = app!(repo);

    for payload in [
        book_json("", "Someone", 2000),
        book_json("Title", "Someone", 1400),
        json!({ "title": "Title" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/books")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].is_string());
    }
}

#[actix_web::test]
async fn list_pages_with_total_count_header() {
    let repo = InMemoryRepository::new();
    let app = app!(repo);

    for (title, year) in [("Gamma", 2003), ("Alpha", 2001), ("Beta", 2002)] {
        let req = test::TestRequest::post()
            .uri("/books")
            .set_json(book_json(title, "Author", year))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri("/books?sort=title&order=desc&offset=1&limit=1")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Total-Count").unwrap(), "3");
    let books: Vec<Book> = test::read_body_json(resp).await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title.as_str(), "Beta");
}

#[actix_web::test]
async fn list_filters_by_search_term() {
    let repo = InMemoryRepository::new();
    let app = app!(repo);

    for (title, author) in [("Clean Code", "Robert C. Martin"), ("Dune", "Frank Herbert")] {
        let req = test::TestRequest::post()
            .uri("/books")
            .set_json(book_json(title, author, 1990))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get().uri("/books?q=herb").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.headers().get("X-Total-Count").unwrap(), "1");
    let books: Vec<Book> = test::read_body_json(resp).await;
    assert_eq!(books[0].title.as_str(), "Dune");
}

#[actix_web::test]
async fn bad_list_parameters_are_unprocessable() {
    let repo = InMemoryRepository::new();
    let app = app!(repo);

    for uri in ["/books?sort=price", "/books?limit=0", "/books?offset=-1", "/books?limit=ten"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    }
}

#[actix_web::test]
async fn update_toggles_read_flag() {
    let repo = InMemoryRepository::new();
    let app = app!(repo);

    let req = test::TestRequest::post()
        .uri("/books")
        .set_json(book_json("Dune", "Frank Herbert", 1965))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri("/books/1")
        .set_json(json!({ "read": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let book: Book = test::read_body_json(resp).await;
    assert!(book.read);
    assert_eq!(book.year.get(), 1965);

    let req = test::TestRequest::get().uri("/books/1").to_request();
    let book: Book = test::call_and_read_body_json(&app, req).await;
    assert!(book.read);
}

#[actix_web::test]
async fn delete_then_lookup_is_not_found() {
    let repo = InMemoryRepository::new();
    let app = app!(repo);

    let req = test::TestRequest::post()
        .uri("/books")
        .set_json(book_json("Dune", "Frank Herbert", 1965))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete().uri("/books/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    for req in [
        test::TestRequest::get().uri("/books/1").to_request(),
        test::TestRequest::delete().uri("/books/1").to_request(),
        test::TestRequest::put()
            .uri("/books/1")
            .set_json(json!({ "read": true }))
            .to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Book not found");
    }
}

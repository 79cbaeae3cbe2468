use actix_web::http::header;
use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::dto::api::{ListBooksParams, TOTAL_COUNT_HEADER};
use crate::forms::books::{CreateBookForm, UpdateBookForm};
use crate::repository::InMemoryRepository;
use crate::routes::error_response;
use crate::services::books as book_service;

#[get("/books")]
pub async fn list_books(
    params: web::Query<ListBooksParams>,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    match book_service::list_books(repo.get_ref(), params.into_inner()) {
        Ok(page) => HttpResponse::Ok()
            .insert_header((TOTAL_COUNT_HEADER, page.total.to_string()))
            .json(page.items),
        Err(err) => error_response(&err),
    }
}

#[post("/books")]
pub async fn create_book(
    repo: web::Data<InMemoryRepository>,
    web::Json(form): web::Json<CreateBookForm>,
) -> impl Responder {
    match book_service::create_book(repo.get_ref(), form) {
        Ok(book) => HttpResponse::Created()
            .insert_header((header::LOCATION, format!("/books/{}", book.id)))
            .json(book),
        Err(err) => error_response(&err),
    }
}

#[get("/books/{book_id}")]
pub async fn show_book(
    book_id: web::Path<i64>,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    match book_service::get_book(repo.get_ref(), book_id.into_inner()) {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) => error_response(&err),
    }
}

#[put("/books/{book_id}")]
pub async fn update_book(
    book_id: web::Path<i64>,
    repo: web::Data<InMemoryRepository>,
    web::Json(form): web::Json<UpdateBookForm>,
) -> impl Responder {
    match book_service::update_book(repo.get_ref(), book_id.into_inner(), form) {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) => error_response(&err),
    }
}

#[delete("/books/{book_id}")]
pub async fn delete_book(
    book_id: web::Path<i64>,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    match book_service::delete_book(repo.get_ref(), book_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(&err),
    }
}

//! HTTP handlers of the books service.

use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};

use crate::dto::api::ErrorBody;
use crate::services::ServiceError;

pub mod books;

/// Registers the `/books` handlers together with extractor settings that
/// report malformed bodies and query strings as `422` JSON errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::UnprocessableEntity().json(ErrorBody::new(err.to_string()));
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::UnprocessableEntity().json(ErrorBody::new(err.to_string()));
        InternalError::from_response(err, response).into()
    }))
    .service(books::list_books)
    .service(books::create_book)
    .service(books::show_book)
    .service(books::update_book)
    .service(books::delete_book);
}

/// Maps a service failure to the JSON error response of the REST contract.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    match err {
        ServiceError::NotFound => HttpResponse::NotFound().json(ErrorBody::new(err.to_string())),
        ServiceError::Conflict(_) => HttpResponse::Conflict().json(ErrorBody::new(err.to_string())),
        ServiceError::Form(_) | ServiceError::TypeConstraint(_) => {
            HttpResponse::UnprocessableEntity().json(ErrorBody::new(err.to_string()))
        }
        ServiceError::Internal(_) => {
            log::error!("{err}");
            HttpResponse::InternalServerError().json(ErrorBody::new("Internal server error"))
        }
    }
}

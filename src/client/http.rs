//! reqwest implementation of [`BooksApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use crate::client::{ApiError, ApiResult, BooksApi};
use crate::domain::book::{Book, NewBook, UpdateBook};
use crate::domain::query::{BookPage, ListQuery};
use crate::domain::types::BookId;

const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Books service client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBooksApi {
    client: Client,
    base_url: String,
}

impl HttpBooksApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Query string for a list request. An absent or blank `q` is left out.
fn list_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(5);
    if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        params.push(("q", q.to_string()));
    }
    if let Some(sort) = query.sort {
        params.push(("sort", sort.to_string()));
    }
    params.push(("order", query.order.to_string()));
    params.push(("offset", query.offset.to_string()));
    params.push(("limit", query.limit.to_string()));
    params
}

/// Pulls the human readable message out of an error body, falling back to
/// the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(detail) => detail.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}

/// Passes successful responses through and turns the rest into [`ApiError`].
async fn check(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status.as_u16(), error_message(&body)))
}

fn total_count(response: &Response) -> usize {
    response
        .headers()
        .get(TOTAL_COUNT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl BooksApi for HttpBooksApi {
    async fn list(&self, query: &ListQuery) -> ApiResult<BookPage> {
        let response = self
            .client
            .get(self.url("/books"))
            .query(&list_params(query))
            .send()
            .await?;
        let response = check(response).await?;

        let total = total_count(&response);
        let items = response.json::<Vec<Book>>().await?;
        log::debug!("Listed {} of {total} books", items.len());

        Ok(BookPage { items, total })
    }

    async fn create(&self, book: &NewBook) -> ApiResult<Book> {
        let response = self
            .client
            .post(self.url("/books"))
            .json(book)
            .send()
            .await?;
        Ok(check(response).await?.json::<Book>().await?)
    }

    async fn update(&self, id: BookId, changes: &UpdateBook) -> ApiResult<Book> {
        let response = self
            .client
            .put(self.url(&format!("/books/{id}")))
            .json(changes)
            .send()
            .await?;
        Ok(check(response).await?.json::<Book>().await?)
    }

    async fn delete(&self, id: BookId) -> ApiResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/books/{id}")))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

//! Domain aggregates exposed by the catalog service and its clients.

pub mod book;
pub mod query;
pub mod types;

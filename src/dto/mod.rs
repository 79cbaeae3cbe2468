//! DTOs exchanged over the catalog REST interface.

pub mod api;

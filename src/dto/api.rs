//! DTOs exposed by the `/books` endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::query::{ListQuery, SortKey, SortOrder};
use crate::domain::types::TypeConstraintError;

/// Header carrying the size of the whole filtered set on list responses.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Default page size when the caller omits `limit`.
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest page the service hands out.
pub const MAX_LIMIT: i64 = 100;

/// Query parameters accepted by `GET /books`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListBooksParams {
    /// Optional free-form search string matched against title and author.
    pub q: Option<String>,
    /// Optional ordering column: `title`, `author` or `year`.
    pub sort: Option<String>,
    /// Ordering direction, `asc` unless stated otherwise.
    pub order: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl TryFrom<ListBooksParams> for ListQuery {
    type Error = TypeConstraintError;

    fn try_from(params: ListBooksParams) -> Result<Self, Self::Error> {
        let sort = params.sort.as_deref().map(str::parse::<SortKey>).transpose()?;
        let order = params
            .order
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?
            .unwrap_or_default();

        let offset = params.offset.unwrap_or(0);
        if offset < 0 {
            return Err(TypeConstraintError::InvalidValue(
                "offset must be zero or greater".to_string(),
            ));
        }
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }

        let query = ListQuery {
            q: params.q.filter(|q| !q.is_empty()),
            sort,
            order,
            offset: offset as usize,
            limit: limit as usize,
            ..ListQuery::default()
        };
        Ok(query)
    }
}

/// Error payload returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

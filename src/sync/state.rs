use serde::{Deserialize, Serialize};

use crate::domain::book::Book;
use crate::domain::query::{BookPage, ListQuery, SortKey, SortOrder};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};

/// Canonical filter, sort and page state of the catalog list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryState {
    /// Raw search input, echoed back to the input field.
    pub query_text: String,
    /// Trimmed search term committed after the debounce window.
    pub debounced_query: String,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
}

impl QueryState {
    pub fn new(page_size: usize) -> Self {
        Self {
            query_text: String::new(),
            debounced_query: String::new(),
            sort_key: SortKey::default(),
            sort_order: SortOrder::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Request parameters derived from the committed fields only.
    pub fn to_list_query(&self) -> ListQuery {
        ListQuery::default()
            .search(self.debounced_query.as_str())
            .sort(self.sort_key, self.sort_order)
            .paginate(self.page, self.page_size)
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

/// Last page of results received from the catalog. Replaced wholesale on
/// every settle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultWindow {
    pub items: Vec<Book>,
    pub total_count: usize,
}

impl From<BookPage> for ResultWindow {
    fn from(page: BookPage) -> Self {
        Self {
            items: page.items,
            total_count: page.total,
        }
    }
}

/// Lifecycle of the list fetch.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Settled,
    Failed,
}

/// Render-ready snapshot of the list.
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub query_text: String,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub books: Paginated<Book>,
    pub status: FetchStatus,
    pub error: Option<String>,
}

impl ListView {
    pub fn new(
        state: &QueryState,
        window: &ResultWindow,
        status: FetchStatus,
        error: Option<String>,
    ) -> Self {
        Self {
            query_text: state.query_text.clone(),
            sort_key: state.sort_key,
            sort_order: state.sort_order,
            books: Paginated::new(
                window.items.clone(),
                state.page,
                window.total_count,
                state.page_size,
            ),
            status,
            error,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Footer line in the form `Showing 6 of 14 • Page 1 of 3`.
    pub fn summary(&self) -> String {
        format!(
            "Showing {} of {} • Page {} of {}",
            self.books.items.len(),
            self.books.total,
            self.books.page,
            self.books.total_pages,
        )
    }
}

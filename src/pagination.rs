//! Page arithmetic shared by the sync core and the list views.

use serde::Serialize;

/// Number of items shown on one page of the catalog list.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 6;

/// Number of pages needed for `total` items. Never less than one, so an empty
/// list still has a page to show.
pub fn total_pages(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1)).max(1)
}

/// Clamp `page` into `1..=total_pages(total, per_page)`.
pub fn clamp_page(page: usize, total: usize, per_page: usize) -> usize {
    page.clamp(1, total_pages(total, per_page))
}

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Compact list of page links where `None` stands for an elided run.
pub fn page_links(current_page: usize, total_pages: usize) -> Vec<Option<usize>> {
    let current_page = current_page.max(1);
    get_pages(total_pages, current_page, 2, 2, 4, 2)
}

/// Page of items together with the navigation state needed to render it.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total: usize, per_page: usize) -> Self {
        let total_pages = total_pages(total, per_page);
        let current_page = if current_page == 0 { 1 } else { current_page };

        Self {
            items,
            pages: page_links(current_page, total_pages),
            page: current_page,
            total_pages,
            total,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

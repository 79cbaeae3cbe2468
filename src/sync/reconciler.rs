//! Keeps the current page inside the bounds implied by the item count.
//!
//! Both functions are idempotent: applying them twice with the same total is
//! a no-op, and a later authoritative total corrects the page with the same
//! clamp formula.

use crate::pagination::clamp_page;
use crate::sync::state::QueryState;

/// Pre-clamp the page after `delta` items were removed from a list that held
/// `old_total` items. Returns `true` when the page moved.
pub fn on_count_decreased(state: &mut QueryState, old_total: usize, delta: usize) -> bool {
    let new_total = old_total.saturating_sub(delta);
    reconcile(state, new_total)
}

/// Clamp the page against an authoritative total. Returns `true` when the
/// page moved.
pub fn reconcile(state: &mut QueryState, total: usize) -> bool {
    let page = clamp_page(state.page, total, state.page_size);
    if page == state.page {
        return false;
    }
    log::debug!(
        "Page {} is out of range for {total} items, moving to page {page}",
        state.page
    );
    state.page = page;
    true
}

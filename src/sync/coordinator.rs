use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::query::{BookPage, ListQuery, SortKey, SortOrder};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, clamp_page};
use crate::sync::debounce::{DEFAULT_DEBOUNCE_WINDOW, Debouncer};
use crate::sync::reconciler;
use crate::sync::state::{FetchStatus, ListView, QueryState, ResultWindow};

/// Monotonically increasing tag of an issued list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestSeq(u64);

impl Display for RequestSeq {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A list request the caller must execute and report back through
/// [`QueryCoordinator::apply_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub seq: RequestSeq,
    pub query: ListQuery,
}

/// What happened to a response handed to [`QueryCoordinator::apply_response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response replaced the result window.
    Settled,
    /// The request failed; the previous result window is kept.
    Failed,
    /// The response belongs to a superseded request and was dropped.
    Stale,
}

/// Committed fields that feed a list request.
type CommittedKey = (String, SortKey, SortOrder, usize);

/// Owner of the list query state and the single-flight fetch bookkeeping.
///
/// Every change to a committed field (debounced search, sort key, sort order,
/// page) marks a refetch as due. [`Self::take_request`] turns a due refetch
/// into at most one [`ListRequest`]; issuing a request supersedes whatever was
/// in flight, and responses are only accepted for the latest sequence number.
#[derive(Debug, Clone)]
pub struct QueryCoordinator {
    state: QueryState,
    window: ResultWindow,
    /// Item count the page is clamped against: the last settled total minus
    /// confirmed deletes since.
    known_total: usize,
    status: FetchStatus,
    error: Option<String>,
    debouncer: Debouncer,
    refetch_due: bool,
    last_issued: u64,
    in_flight: Option<RequestSeq>,
}

impl QueryCoordinator {
    /// A fresh coordinator with the initial load already due.
    pub fn new(page_size: usize, debounce_window: Duration) -> Self {
        Self {
            state: QueryState::new(page_size),
            window: ResultWindow::default(),
            known_total: 0,
            status: FetchStatus::Idle,
            error: None,
            debouncer: Debouncer::new(debounce_window),
            refetch_due: true,
            last_issued: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn window(&self) -> &ResultWindow {
        &self.window
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn known_total(&self) -> usize {
        self.known_total
    }

    pub fn in_flight(&self) -> Option<RequestSeq> {
        self.in_flight
    }

    pub fn is_refetch_due(&self) -> bool {
        self.refetch_due
    }

    /// When the pending search edit will be committed, if any.
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn view(&self) -> ListView {
        ListView::new(&self.state, &self.window, self.status, self.error.clone())
    }

    /// Record raw search input and restart the quiescence timer.
    pub fn set_query_text(&mut self, text: impl Into<String>, now: Instant) {
        self.state.query_text = text.into();
        self.debouncer.arm(now);
    }

    /// Commit the pending search if its quiescence window has elapsed.
    ///
    /// Returns `true` when the commit changed the request and a refetch is now
    /// due.
    pub fn fire_debounce(&mut self, now: Instant) -> bool {
        if !self.debouncer.fire(now) {
            return false;
        }
        let committed = self.state.query_text.trim().to_string();
        log::debug!("Committing search `{committed}`");
        self.commit(|state| {
            state.debounced_query = committed;
            state.page = 1;
        })
    }

    pub fn set_sort_key(&mut self, key: SortKey) -> bool {
        self.commit(|state| {
            state.sort_key = key;
            state.page = 1;
        })
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> bool {
        self.commit(|state| {
            state.sort_order = order;
            state.page = 1;
        })
    }

    /// Move to page `page`, clamped against the last known total.
    pub fn set_page(&mut self, page: usize) -> bool {
        let page = clamp_page(page, self.known_total, self.state.page_size);
        self.commit(|state| state.page = page)
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.state.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.state.page.saturating_sub(1))
    }

    /// Account for `count` rows the remote confirmed as deleted.
    ///
    /// The page is pre-clamped against the assumed new total, and a refetch is
    /// due whether or not the page moved. Returns `true` when the page moved.
    pub fn confirm_deleted(&mut self, count: usize) -> bool {
        let old_total = self.known_total;
        self.known_total = old_total.saturating_sub(count);
        let moved = reconciler::on_count_decreased(&mut self.state, old_total, count);
        self.refetch_due = true;
        moved
    }

    /// Mark a refetch as due without changing the query (after a create or a
    /// toggle, or on an explicit reload).
    pub fn invalidate(&mut self) {
        self.refetch_due = true;
    }

    /// Consume the pending refetch signal, if any.
    pub fn take_request(&mut self) -> Option<ListRequest> {
        self.refetch_due.then(|| self.refetch())
    }

    /// Issue a request for the committed state, superseding any in-flight one.
    pub fn refetch(&mut self) -> ListRequest {
        self.last_issued += 1;
        let seq = RequestSeq(self.last_issued);
        if let Some(previous) = self.in_flight.replace(seq) {
            log::debug!("Request {previous} superseded by {seq}");
        }
        self.refetch_due = false;
        self.status = FetchStatus::Loading;

        ListRequest {
            seq,
            query: self.state.to_list_query(),
        }
    }

    /// Apply the outcome of request `seq`.
    pub fn apply_response<E: Display>(
        &mut self,
        seq: RequestSeq,
        result: Result<BookPage, E>,
    ) -> Applied {
        if self.in_flight != Some(seq) {
            log::debug!("Discarding stale response {seq}");
            return Applied::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                self.window = ResultWindow::from(page);
                self.known_total = self.window.total_count;
                self.status = FetchStatus::Settled;
                self.error = None;
                if reconciler::reconcile(&mut self.state, self.known_total) {
                    self.refetch_due = true;
                }
                Applied::Settled
            }
            Err(err) => {
                log::error!("Failed to load books: {err}");
                self.status = FetchStatus::Failed;
                self.error = Some(err.to_string());
                Applied::Failed
            }
        }
    }

    /// Surface a failure that did not come from the list fetch.
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn committed_key(&self) -> CommittedKey {
        (
            self.state.debounced_query.clone(),
            self.state.sort_key,
            self.state.sort_order,
            self.state.page,
        )
    }

    fn commit(&mut self, change: impl FnOnce(&mut QueryState)) -> bool {
        let before = self.committed_key();
        change(&mut self.state);
        if self.committed_key() == before {
            return false;
        }
        self.refetch_due = true;
        true
    }
}

impl Default for QueryCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE, DEFAULT_DEBOUNCE_WINDOW)
    }
}

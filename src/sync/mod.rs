//! List-synchronization core.
//!
//! The [`QueryCoordinator`] owns the filter/sort/page state of the catalog
//! list and turns user intent into at most one authoritative [`ListRequest`]
//! at a time. The [`reconciler`] keeps the current page inside the bounds of
//! the known item count. Nothing in here performs IO: callers pass the
//! current [`std::time::Instant`] where time matters and execute the requests
//! they are handed.

pub mod coordinator;
pub mod debounce;
pub mod reconciler;
pub mod state;

pub use coordinator::{Applied, ListRequest, QueryCoordinator, RequestSeq};
pub use debounce::{DEFAULT_DEBOUNCE_WINDOW, Debouncer};
pub use state::{FetchStatus, ListView, QueryState, ResultWindow};

//! Async driver of the list-synchronization core.
//!
//! A [`BrowseSession`] is a single cooperative event loop: user commands, the
//! debounce deadline, list completions and mutation outcomes are handled one
//! at a time, so the [`QueryCoordinator`] is never touched concurrently.
//! Network calls never run on the loop itself. List fetches are spawned and a
//! new one aborts the previous task, while the coordinator's sequence check
//! drops anything that still slips through. Mutations are spawned too and
//! their outcome is applied when it arrives.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{Instant, sleep_until};

use crate::client::{ApiError, ApiResult, BooksApi, Command};
use crate::domain::book::{Book, UpdateBook};
use crate::domain::query::BookPage;
use crate::domain::types::BookId;
use crate::sync::{ListView, QueryCoordinator, RequestSeq};

type Completion = (RequestSeq, ApiResult<BookPage>);

/// Outcome of a create, toggle or delete confirmed (or refused) remotely.
enum Mutation {
    Created(ApiResult<Book>),
    Updated(BookId, ApiResult<Book>),
    Deleted(BookId, ApiResult<()>),
}

enum Event {
    Command(Option<Command>),
    Completed(RequestSeq, ApiResult<BookPage>),
    Mutated(Result<Mutation, JoinError>),
    DebounceElapsed,
}

pub struct BrowseSession<A: ?Sized> {
    api: Arc<A>,
    coordinator: QueryCoordinator,
    views: watch::Sender<ListView>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: Option<JoinHandle<()>>,
    mutations: JoinSet<Mutation>,
}

/// Handle to a session running on the tokio runtime.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    views: watch::Receiver<ListView>,
    task: JoinHandle<()>,
}

impl<A> BrowseSession<A>
where
    A: BooksApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, coordinator: QueryCoordinator) -> (Self, watch::Receiver<ListView>) {
        let (views, views_rx) = watch::channel(coordinator.view());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let session = Self {
            api,
            coordinator,
            views,
            completions_tx,
            completions_rx,
            in_flight: None,
            mutations: JoinSet::new(),
        };
        (session, views_rx)
    }

    /// Start the session on the current runtime.
    pub fn spawn(api: Arc<A>, coordinator: QueryCoordinator) -> SessionHandle {
        let (session, views) = Self::new(api, coordinator);
        let (commands, commands_rx) = mpsc::channel(32);
        let task = tokio::spawn(session.run(commands_rx));

        SessionHandle {
            commands,
            views,
            task,
        }
    }

    /// Processes events until the command channel closes, then waits for
    /// pending mutations so none is cut off halfway.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        self.dispatch();
        self.publish();

        loop {
            let deadline = self.coordinator.debounce_deadline();
            let wake_at = deadline.map_or_else(Instant::now, Instant::from_std);

            let event = tokio::select! {
                command = commands.recv() => Event::Command(command),
                Some((seq, result)) = self.completions_rx.recv() => Event::Completed(seq, result),
                Some(joined) = self.mutations.join_next() => Event::Mutated(joined),
                _ = sleep_until(wake_at), if deadline.is_some() => Event::DebounceElapsed,
            };

            match event {
                Event::Command(Some(command)) => self.handle(command),
                Event::Command(None) => break,
                Event::Completed(seq, result) => {
                    self.coordinator.apply_response(seq, result);
                }
                Event::Mutated(joined) => self.apply_mutation(joined),
                Event::DebounceElapsed => {
                    self.coordinator.fire_debounce(now());
                }
            }

            self.dispatch();
            self.publish();
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        while let Some(joined) = self.mutations.join_next().await {
            self.apply_mutation(joined);
        }
        self.publish();
        log::debug!("Browse session stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Search(text) => self.coordinator.set_query_text(text, now()),
            Command::SortBy(key) => {
                self.coordinator.set_sort_key(key);
            }
            Command::Order(order) => {
                self.coordinator.set_sort_order(order);
            }
            Command::Page(page) => {
                self.coordinator.set_page(page);
            }
            Command::NextPage => {
                self.coordinator.next_page();
            }
            Command::PreviousPage => {
                self.coordinator.previous_page();
            }
            Command::Reload => {
                self.coordinator.clear_error();
                self.coordinator.invalidate();
            }
            Command::Create(new_book) => {
                self.coordinator.clear_error();
                self.mutate(move |api| async move { Mutation::Created(api.create(&new_book).await) });
            }
            Command::ToggleRead(id) => {
                self.coordinator.clear_error();
                let current = self
                    .coordinator
                    .window()
                    .items
                    .iter()
                    .find(|book| book.id == id)
                    .map(|book| book.read);
                let Some(current) = current else {
                    self.coordinator
                        .report_error(format!("Book {id} is not on the current page"));
                    return;
                };
                let changes = UpdateBook::read(!current);
                self.mutate(move |api| async move {
                    Mutation::Updated(id, api.update(id, &changes).await)
                });
            }
            Command::Delete(id) => {
                self.coordinator.clear_error();
                self.mutate(move |api| async move { Mutation::Deleted(id, api.delete(id).await) });
            }
        }
    }

    /// Run a remote mutation off the loop; its outcome comes back as an event.
    fn mutate<F, Fut>(&mut self, call: F)
    where
        F: FnOnce(Arc<A>) -> Fut,
        Fut: Future<Output = Mutation> + Send + 'static,
    {
        self.mutations.spawn(call(Arc::clone(&self.api)));
    }

    fn apply_mutation(&mut self, joined: Result<Mutation, JoinError>) {
        let mutation = match joined {
            Ok(mutation) => mutation,
            Err(err) => {
                log::error!("Mutation task failed: {err}");
                self.coordinator.report_error(err.to_string());
                return;
            }
        };

        match mutation {
            Mutation::Created(Ok(book)) => {
                log::info!("Created book {} ({})", book.id, book.title);
                self.coordinator.invalidate();
            }
            Mutation::Updated(id, Ok(book)) => {
                log::info!("Marked book {id} as {}", if book.read { "read" } else { "unread" });
                self.coordinator.invalidate();
            }
            Mutation::Deleted(id, Ok(())) => {
                log::info!("Deleted book {id}");
                self.coordinator.confirm_deleted(1);
            }
            Mutation::Created(Err(err)) => self.report("create", err),
            Mutation::Updated(_, Err(err)) => self.report("update", err),
            Mutation::Deleted(_, Err(err)) => self.report("delete", err),
        }
    }

    fn report(&mut self, action: &str, err: ApiError) {
        if err.is_rejection() {
            log::warn!("Service refused to {action} book: {err}");
        } else {
            log::error!("Failed to {action} book: {err}");
        }
        self.coordinator.report_error(err.to_string());
    }

    /// Issue the due list request, if any, superseding the one in flight.
    fn dispatch(&mut self) {
        let Some(request) = self.coordinator.take_request() else {
            return;
        };
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let api = Arc::clone(&self.api);
        let completions = self.completions_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = api.list(&request.query).await;
            // The session may already be gone; nobody is left to care.
            let _ = completions.send((request.seq, result));
        }));
    }

    fn publish(&self) {
        self.views.send_replace(self.coordinator.view());
    }
}

impl SessionHandle {
    /// Queue a command. Fails once the session has stopped.
    pub async fn send(&self, command: Command) -> Result<(), Command> {
        self.commands.send(command).await.map_err(|err| err.0)
    }

    /// Receiver of list snapshots, updated after every handled event.
    pub fn views(&self) -> watch::Receiver<ListView> {
        self.views.clone()
    }

    pub fn view(&self) -> ListView {
        self.views.borrow().clone()
    }

    /// Close the command channel and wait for the session to wind down.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(err) = task.await {
            log::error!("Browse session ended abnormally: {err}");
        }
    }
}

/// Current time as seen by the tokio clock (pausable in tests).
fn now() -> std::time::Instant {
    Instant::now().into_std()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use super::*;
    use crate::domain::book::{Book, NewBook};
    use crate::domain::query::{ListQuery, SortKey};
    use crate::domain::types::{AuthorName, BookId, BookTitle, PublicationYear};
    use crate::sync::FetchStatus;

    /// Catalog double recording every list query it serves.
    #[derive(Default)]
    struct FakeApi {
        books: Mutex<Vec<Book>>,
        queries: Mutex<Vec<ListQuery>>,
        latency: Duration,
        delete_latency: Duration,
        fail_deletes: bool,
    }

    impl FakeApi {
        fn with_books(count: i64) -> Self {
            let books = (1..=count)
                .map(|id| {
                    NewBook::new(
                        BookTitle::new(format!("Book {id:02}")).unwrap(),
                        AuthorName::new(format!("Author {}", 100 - id)).unwrap(),
                        PublicationYear::new(1900 + id as i32).unwrap(),
                    )
                    .into_book(BookId::new(id).unwrap())
                })
                .collect();
            Self {
                books: Mutex::new(books),
                ..Self::default()
            }
        }

        fn queries(&self) -> Vec<ListQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BooksApi for FakeApi {
        async fn list(&self, query: &ListQuery) -> ApiResult<BookPage> {
            self.queries.lock().unwrap().push(query.clone());
            sleep(self.latency).await;

            let mut books = self.books.lock().unwrap().clone();
            if let Some(q) = &query.q {
                let q = q.to_lowercase();
                books.retain(|b| b.title.to_lowercase().contains(&q));
            }
            if query.sort == Some(SortKey::Author) {
                books.sort_by(|a, b| a.author.cmp(&b.author));
            }
            let total = books.len();
            let items = books
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .collect();
            Ok(BookPage { items, total })
        }

        async fn create(&self, book: &NewBook) -> ApiResult<Book> {
            let mut books = self.books.lock().unwrap();
            let id = BookId::new(books.len() as i64 + 100).unwrap();
            let book = book.clone().into_book(id);
            books.push(book.clone());
            Ok(book)
        }

        async fn update(&self, id: BookId, changes: &UpdateBook) -> ApiResult<Book> {
            let mut books = self.books.lock().unwrap();
            let book = books
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| ApiError::from_status(404, "Book not found"))?;
            *book = book.with_update(changes);
            Ok(book.clone())
        }

        async fn delete(&self, id: BookId) -> ApiResult<()> {
            sleep(self.delete_latency).await;
            if self.fail_deletes {
                return Err(ApiError::from_status(500, "boom"));
            }
            let mut books = self.books.lock().unwrap();
            let before = books.len();
            books.retain(|b| b.id != id);
            if books.len() == before {
                return Err(ApiError::from_status(404, "Book not found"));
            }
            Ok(())
        }
    }

    fn id(value: i64) -> BookId {
        BookId::new(value).unwrap()
    }

    /// Let every runnable task finish; paused time jumps ahead when idle.
    async fn settle() {
        sleep(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn initial_load_renders_first_page() {
        let api = Arc::new(FakeApi::with_books(8));
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());

        settle().await;

        let view = session.view();
        assert_eq!(view.status, FetchStatus::Settled);
        assert_eq!(view.books.items.len(), 6);
        assert_eq!(view.books.total, 8);
        assert_eq!(view.books.total_pages, 2);
        assert_eq!(api.queries().len(), 1);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_issues_a_single_search() {
        let api = Arc::new(FakeApi::with_books(3));
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;

        for text in ["Clean", "Clean C", "Clean Code"] {
            session.send(Command::Search(text.to_string())).await.unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(session.view().query_text, "Clean Code");
        settle().await;

        let queries = api.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].q.as_deref(), Some("Clean Code"));
        assert_eq!(session.view().books.total, 0);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn deleting_the_lone_item_on_the_last_page_goes_back_one_page() {
        let api = Arc::new(FakeApi::with_books(7));
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;

        session.send(Command::Page(2)).await.unwrap();
        settle().await;
        assert_eq!(session.view().books.items.len(), 1);

        session.send(Command::Delete(id(7))).await.unwrap();
        settle().await;

        let view = session.view();
        assert_eq!(view.books.page, 1);
        assert_eq!(view.books.total, 6);
        assert_eq!(view.books.items.len(), 6);

        let queries = api.queries();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[2].offset, 0);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn input_is_handled_while_a_delete_is_pending() {
        let mut api = FakeApi::with_books(7);
        api.delete_latency = Duration::from_secs(5);
        let api = Arc::new(api);
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;

        session.send(Command::Delete(id(7))).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        session.send(Command::Search("Book 0".to_string())).await.unwrap();
        sleep(Duration::from_millis(20)).await;
        assert_eq!(session.view().query_text, "Book 0");

        // The search commits and loads before the delete is confirmed.
        sleep(Duration::from_millis(500)).await;
        let view = session.view();
        assert_eq!(view.status, FetchStatus::Settled);
        assert_eq!(view.books.total, 7);
        let queries = api.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].q.as_deref(), Some("Book 0"));

        sleep(Duration::from_secs(6)).await;
        let view = session.view();
        assert_eq!(view.books.total, 6);
        assert!(view.error.is_none());
        assert_eq!(api.queries().len(), 3);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_pending_delete() {
        let mut api = FakeApi::with_books(3);
        api.delete_latency = Duration::from_secs(2);
        let api = Arc::new(api);
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;

        session.send(Command::Delete(id(1))).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        session.shutdown().await;

        assert_eq!(api.books.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_delete_keeps_page_and_list() {
        let mut api = FakeApi::with_books(7);
        api.fail_deletes = true;
        let api = Arc::new(api);
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;
        session.send(Command::Page(2)).await.unwrap();
        settle().await;

        session.send(Command::Delete(id(7))).await.unwrap();
        settle().await;

        let view = session.view();
        assert_eq!(view.books.page, 2);
        assert_eq!(view.books.total, 7);
        assert_eq!(view.error.as_deref(), Some("HTTP 500: boom"));
        assert_eq!(api.queries().len(), 2);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_refetches_the_current_page() {
        let api = Arc::new(FakeApi::with_books(2));
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;

        session.send(Command::ToggleRead(id(2))).await.unwrap();
        settle().await;

        let view = session.view();
        assert!(view.books.items.iter().any(|b| b.id == id(2) && b.read));
        assert_eq!(api.queries().len(), 2);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_of_unknown_row_reports_error_without_fetching() {
        let api = Arc::new(FakeApi::with_books(2));
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;

        session.send(Command::ToggleRead(id(40))).await.unwrap();
        settle().await;

        assert!(session.view().error.is_some());
        assert_eq!(api.queries().len(), 1);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn create_refetches_and_shows_new_total() {
        let api = Arc::new(FakeApi::with_books(2));
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;

        let new_book = NewBook::new(
            BookTitle::new("Book 03").unwrap(),
            AuthorName::new("Someone").unwrap(),
            PublicationYear::new(2020).unwrap(),
        );
        session.send(Command::Create(new_book)).await.unwrap();
        settle().await;

        assert_eq!(session.view().books.total, 3);
        assert_eq!(api.queries().len(), 2);
        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn newer_trigger_supersedes_slow_fetch() {
        let mut api = FakeApi::with_books(10);
        api.latency = Duration::from_millis(200);
        let api = Arc::new(api);
        let session = BrowseSession::spawn(api.clone(), QueryCoordinator::default());
        settle().await;

        session.send(Command::NextPage).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        assert!(session.view().is_loading());
        session.send(Command::SortBy(SortKey::Author)).await.unwrap();
        settle().await;

        let view = session.view();
        assert_eq!(view.status, FetchStatus::Settled);
        assert_eq!(view.books.page, 1);
        assert_eq!(view.sort_key, SortKey::Author);
        // Authors count down, so sorting by author reverses the ids.
        assert_eq!(view.books.items[0].id, id(10));
        assert_eq!(api.queries().len(), 3);
        session.shutdown().await;
    }
}

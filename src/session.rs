//! Request sequencing on top of the [`Aggregator`].
//!
//! A [`Session`] holds the browsing state (filters, search text, page cursor)
//! explicitly and numbers every request. Any state change or newer request
//! supersedes the ones in flight; their results are discarded instead of
//! overwriting fresher ones. Only [`Session::fetch`] hands out tickets; state
//! changes just invalidate whatever is outstanding.

use crate::aggregator::Aggregator;
use crate::models::{ArticlesPage, Filter, UserPreferences};
use crate::preferences::derive_default_filters;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseState {
    pub filter: Filter,
    pub search_query: String,
    pub page: u32,
    pub page_size: u32,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            search_query: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RequestTicket(u64);

pub struct Session {
    aggregator: Aggregator,
    state: Mutex<BrowseState>,
    generation: AtomicU64,
}

impl Session {
    pub fn new(aggregator: Aggregator, state: BrowseState) -> Self {
        Self {
            aggregator,
            state: Mutex::new(state),
            generation: AtomicU64::new(0),
        }
    }

    /// Session whose filters are seeded from stored preferences.
    pub fn from_preferences(
        aggregator: Aggregator,
        prefs: &UserPreferences,
        page_size: u32,
    ) -> Self {
        Self::new(
            aggregator,
            BrowseState {
                filter: derive_default_filters(prefs),
                page_size: page_size.max(1),
                ..BrowseState::default()
            },
        )
    }

    fn lock(&self) -> MutexGuard<'_, BrowseState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> BrowseState {
        self.lock().clone()
    }

    fn bump(&self) -> RequestTicket {
        RequestTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// New search text; the cursor goes back to page 1.
    pub fn search(&self, query: &str) {
        let mut state = self.lock();
        state.search_query = query.to_string();
        state.page = 1;
        self.bump();
    }

    /// New filter selection; the cursor goes back to page 1.
    pub fn apply_filters(&self, filter: Filter) {
        let mut state = self.lock();
        state.filter = filter;
        state.page = 1;
        self.bump();
    }

    pub fn change_page(&self, page: u32) {
        self.lock().page = page.max(1);
        self.bump();
    }

    /// New page size; the cursor goes back to page 1.
    pub fn change_page_size(&self, page_size: u32) {
        let mut state = self.lock();
        state.page_size = page_size.max(1);
        state.page = 1;
        self.bump();
    }

    /// Start a request for the current state.
    ///
    /// The ticket is taken when `fetch` is called, not when the future is first
    /// polled. The future resolves to `None` if anything superseded it.
    pub fn fetch(&self) -> impl Future<Output = Option<ArticlesPage>> + '_ {
        let ticket = self.bump();
        let state = self.state();
        async move {
            let page = self
                .aggregator
                .get_articles(&state.filter, &state.search_query, state.page, state.page_size)
                .await;
            if self.is_current(ticket) {
                info!(
                    page = state.page,
                    total = page.pagination.total_results,
                    "Request completed"
                );
                Some(page)
            } else {
                debug!(?ticket, "Discarding stale result");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tests::FakeProvider;
    use crate::catalog::{GUARDIAN, NEWSAPI};
    use crate::models::article_fixture;
    use crate::providers::NewsProvider;
    use std::sync::Arc;

    fn session_with(provider: Arc<FakeProvider>) -> Session {
        let aggregator = Aggregator::new(vec![provider as Arc<dyn NewsProvider>]);
        Session::new(aggregator, BrowseState::default())
    }

    fn dated_articles(n: usize) -> Vec<crate::models::Article> {
        (0..n)
            .map(|i| article_fixture(&format!("a{i:02}"), "2020-01-01T00:00:00Z"))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_returns_current_page() {
        let session = session_with(FakeProvider::ok(NEWSAPI, dated_articles(15)));
        session.change_page(2);

        let page = session.fetch().await.expect("current request");
        assert_eq!(page.articles.len(), 5);
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_superseded_request_is_discarded() {
        let provider = FakeProvider::ok(NEWSAPI, dated_articles(3));
        let session = session_with(provider.clone());

        let stale = session.fetch();
        session.search("newer");
        assert!(stale.await.is_none());

        let older = session.fetch();
        let newer = session.fetch();
        let (older, newer) = tokio::join!(older, newer);
        assert!(older.is_none());
        assert!(newer.is_some());
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn test_state_changes_reset_page() {
        let session = session_with(FakeProvider::ok(NEWSAPI, Vec::new()));
        session.change_page(4);
        assert_eq!(session.state().page, 4);

        session.search("rust");
        assert_eq!(session.state().page, 1);
        assert_eq!(session.state().search_query, "rust");

        session.change_page(3);
        session.apply_filters(Filter {
            source: GUARDIAN.to_string(),
            ..Filter::default()
        });
        assert_eq!(session.state().page, 1);

        session.change_page(2);
        session.change_page_size(0);
        let state = session.state();
        assert_eq!((state.page, state.page_size), (1, 1));
    }

    #[tokio::test]
    async fn test_every_state_change_invalidates_in_flight_fetch() {
        let session = session_with(FakeProvider::ok(NEWSAPI, dated_articles(3)));
        let changes: [&dyn Fn(&Session); 4] = [
            &|s: &Session| s.search("rust"),
            &|s: &Session| s.apply_filters(Filter::default()),
            &|s: &Session| s.change_page(2),
            &|s: &Session| s.change_page_size(5),
        ];
        for change in changes {
            let in_flight = session.fetch();
            change(&session);
            assert!(in_flight.await.is_none());
        }
        assert!(session.fetch().await.is_some());
    }

    #[test]
    fn test_tickets_are_monotonic() {
        let session = session_with(FakeProvider::ok(NEWSAPI, Vec::new()));
        let first = session.bump();
        session.search("a");
        let second = session.bump();
        assert!(second > first);
        assert!(!session.is_current(first));
        assert!(session.is_current(second));
    }

    #[test]
    fn test_from_preferences_seeds_filter() {
        let mut prefs = UserPreferences::default();
        prefs.toggle_category("Technology");
        prefs.toggle_source(NEWSAPI);
        let session = Session::from_preferences(Aggregator::new(Vec::new()), &prefs, 25);
        let state = session.state();
        assert_eq!(state.filter.category, "Technology");
        assert_eq!(state.filter.source, NEWSAPI);
        assert_eq!(state.page_size, 25);
    }
}

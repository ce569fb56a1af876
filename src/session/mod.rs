//! Per-session search state.
//!
//! A [`SearchSession`] is owned by exactly one user session. It remembers the
//! submitted filter, the page cursor, the last page shown and the bookmarks.
//! Nothing in here is shared, so no locking is needed.

pub mod bookmarks;

use tracing::debug;
use crate::error::QueryError;
use crate::searching::paginated_search::SearchService;
use crate::searching::query_builder::{FilterRequest, Predicate, QueryBuilder};
use crate::searching::search_results::{Card, SearchPage};
use self::bookmarks::BookmarkStore;

pub struct SearchSession {
    service: SearchService,
    builder: QueryBuilder,
    filter: FilterRequest,
    predicate: Predicate,
    page_index: u64,
    current: Option<SearchPage>,
    bookmarks: BookmarkStore,
}

impl SearchSession {
    /// Starts a session with an empty filter. Nothing is queried until
    /// [`SearchSession::submit`] or [`SearchSession::goto`].
    pub fn new(service: SearchService, builder: QueryBuilder) -> Result<Self, QueryError> {
        let filter = FilterRequest::default();
        let predicate = builder.build(&filter)?;
        Ok(SearchSession {
            service,
            builder,
            filter,
            predicate,
            page_index: 0,
            current: None,
            bookmarks: BookmarkStore::new(),
        })
    }

    pub fn service(&self) -> &SearchService {
        &self.service
    }

    pub fn filter(&self) -> &FilterRequest {
        &self.filter
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    /// The last page returned, if any search ran.
    pub fn current_page(&self) -> Option<&SearchPage> {
        self.current.as_ref()
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn bookmarks_mut(&mut self) -> &mut BookmarkStore {
        &mut self.bookmarks
    }

    /// Applies a new filter and shows its first page.
    ///
    /// If the filter is invalid or the query fails, the previous filter,
    /// cursor and page stay as they were.
    pub async fn submit(&mut self, filter: FilterRequest) -> Result<&SearchPage, QueryError> {
        let predicate = self.builder.build(&filter)?;
        debug!(predicate = %predicate, "filter submitted");
        let page = self.service.search(&predicate, 0).await?;
        self.filter = filter;
        self.predicate = predicate;
        Ok(self.show(page))
    }

    fn show(&mut self, page: SearchPage) -> &SearchPage {
        self.page_index = page.page_index;
        self.current.insert(page)
    }

    /// Shows page `page_index` of the current filter, clamped to the reachable range.
    pub async fn goto(&mut self, page_index: u64) -> Result<&SearchPage, QueryError> {
        let page = self.service.search(&self.predicate, page_index).await?;
        Ok(self.show(page))
    }

    pub async fn next_page(&mut self) -> Result<&SearchPage, QueryError> {
        self.goto(self.page_index.saturating_add(1)).await
    }

    pub async fn previous_page(&mut self) -> Result<&SearchPage, QueryError> {
        self.goto(self.page_index.saturating_sub(1)).await
    }

    /// Finds a card on the current page by id.
    pub fn card(&self, id: &str) -> Option<&Card> {
        self.current.as_ref()?.cards.iter().find(|c| c.id == id)
    }

    /// Toggles the bookmark of a card shown on the current page.
    ///
    /// Returns the new state, or `None` if no such card is on the page.
    pub fn toggle_bookmark(&mut self, id: &str) -> Option<bool> {
        let card = self.current.as_ref()?.cards.iter().find(|c| c.id == id)?;
        Some(self.bookmarks.toggle(card))
    }

    /// Bookmarks every card of the current page. Returns how many were added.
    pub fn bookmark_page(&mut self) -> usize {
        let Some(page) = self.current.as_ref() else {
            return 0;
        };
        let mut added = 0;
        for card in &page.cards {
            if !self.bookmarks.contains(&card.id) {
                self.bookmarks.toggle(card);
                added += 1;
            }
        }
        added
    }

    /// Export document of the bookmarks, highlighted with the current search term.
    pub fn export_bookmarks(&self) -> String {
        self.bookmarks.export(self.filter.term())
    }
}

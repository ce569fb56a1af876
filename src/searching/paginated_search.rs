//! Count-then-fetch paginated search over a [`CardStore`].
//!
//! # Contract
//!
//! 1. `total` comes from its own `COUNT(*)` query, never from a fetched page.
//! 2. `total_pages = ceil(total / page_size)`; only the first `max_pages` are
//!    reachable (`page_count`), but `total` is reported as is.
//! 3. The requested page index is clamped into `[0, page_count - 1]`.
//! 4. Rows are ordered by `fio` (nulls last) with `id` as tie-breaker, so a
//!    fixed predicate always produces the same pages.
//! 5. Zero matches is a successful, empty page. Engine failures are errors.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cardsearch::card_store::cache::StoreCache;
//! use cardsearch::config::DashboardConfig;
//! use cardsearch::searching::paginated_search::SearchService;
//! use cardsearch::searching::query_builder::{FilterRequest, QueryBuilder};
//!
//! # async fn example() -> cardsearch::error::Result<()> {
//! let cache = StoreCache::new();
//! let store = cache.open_best(&DashboardConfig::default()).await?.expect("no data");
//! let service = SearchService::new(store, 20, 50)?;
//!
//! let predicate = QueryBuilder::new().build(&FilterRequest::default().with_text("Сталинград"))?;
//! let page = service.search(&predicate, 0).await?;
//! println!("{} cards, page {} of {}", page.total, page.page_index + 1, page.page_count);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Instant;
use datafusion::arrow::array::{Array, Int64Array};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::DataType;
use datafusion::arrow::record_batch::RecordBatch;
use tracing::debug;
use crate::card_store::CardStore;
use crate::config::PagingConfig;
use crate::error::QueryError;
use crate::searching::query_builder::Predicate;
use crate::searching::search_results::{cards_from_batches, Card, SearchPage, CARD_COLUMNS};

/// Number of pages needed for `total` rows.
pub fn total_pages(total: u64, page_size: usize) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}

/// Clamps `requested` into the reachable page range. Always 0 when nothing is reachable.
pub fn clamp_page_index(requested: u64, page_count: u64) -> u64 {
    requested.min(page_count.saturating_sub(1))
}

/// Runs searches against one store with fixed page size and page ceiling.
#[derive(Debug, Clone)]
pub struct SearchService {
    store: Arc<CardStore>,
    page_size: usize,
    max_pages: usize,
}

impl SearchService {
    /// # Errors
    ///
    /// `QueryError::InvalidPaging` if `page_size` or `max_pages` is zero.
    pub fn new(store: Arc<CardStore>, page_size: usize, max_pages: usize) -> Result<Self, QueryError> {
        if page_size == 0 || max_pages == 0 {
            return Err(QueryError::InvalidPaging(format!(
                "page_size ({}) and max_pages ({}) must be positive",
                page_size, max_pages
            )));
        }
        Ok(SearchService { store, page_size, max_pages })
    }

    pub fn with_paging(store: Arc<CardStore>, paging: PagingConfig) -> Result<Self, QueryError> {
        SearchService::new(store, paging.page_size, paging.max_pages)
    }

    pub fn store(&self) -> &Arc<CardStore> {
        &self.store
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    async fn run(&self, sql: &str) -> Result<Vec<RecordBatch>, QueryError> {
        let start = Instant::now();
        let batches = self.store.context().sql(sql).await?.collect().await?;
        debug!(sql, elapsed_ms = start.elapsed().as_millis() as u64, "query executed");
        Ok(batches)
    }

    /// Reads a single integer cell from a one-row, one-column result.
    fn single_count(batches: &[RecordBatch]) -> Result<u64, QueryError> {
        let batch = batches
            .iter()
            .find(|b| b.num_rows() > 0)
            .ok_or_else(|| QueryError::UnexpectedResult("count returned no rows".to_string()))?;
        let column = cast(batch.column(0), &DataType::Int64)
            .map_err(|e| QueryError::UnexpectedResult(e.to_string()))?;
        let counts = column
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| QueryError::UnexpectedResult("count is not an integer".to_string()))?;
        if counts.is_null(0) {
            return Err(QueryError::UnexpectedResult("count is null".to_string()));
        }
        Ok(counts.value(0).max(0) as u64)
    }

    /// Number of cards matching `predicate`.
    pub async fn count(&self, predicate: &Predicate) -> Result<u64, QueryError> {
        let sql = format!(
            "SELECT COUNT(*) AS cnt FROM {} WHERE {}",
            self.store.table_name(),
            predicate.as_sql()
        );
        Self::single_count(&self.run(&sql).await?)
    }

    /// Fetches `limit` cards starting at `offset` in the stable search order.
    pub async fn fetch(&self, predicate: &Predicate, limit: usize, offset: u64) -> Result<Vec<Card>, QueryError> {
        let columns = CARD_COLUMNS
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY fio ASC NULLS LAST, id ASC LIMIT {} OFFSET {}",
            columns,
            self.store.table_name(),
            predicate.as_sql(),
            limit,
            offset
        );
        cards_from_batches(&self.run(&sql).await?)
    }

    /// Returns page `page_index` (clamped) of the cards matching `predicate`.
    pub async fn search(&self, predicate: &Predicate, page_index: u64) -> Result<SearchPage, QueryError> {
        let total = self.count(predicate).await?;
        let total_pages = total_pages(total, self.page_size);
        let page_count = total_pages.min(self.max_pages as u64);
        let page_index = clamp_page_index(page_index, page_count);

        let cards = if total == 0 {
            Vec::new()
        } else {
            let offset = page_index * self.page_size as u64;
            self.fetch(predicate, self.page_size, offset).await?
        };

        debug!(
            total,
            total_pages,
            page_count,
            page_index,
            rows = cards.len(),
            "search page ready"
        );

        Ok(SearchPage {
            cards,
            total,
            total_pages,
            page_count,
            page_index,
            page_size: self.page_size,
        })
    }

    /// Distinct non-null regions, alphabetically.
    pub async fn regions(&self) -> Result<Vec<String>, QueryError> {
        let sql = format!(
            "SELECT DISTINCT CAST(region AS VARCHAR) AS region FROM {} \
             WHERE region IS NOT NULL ORDER BY region",
            self.store.table_name()
        );
        string_values(&self.run(&sql).await?)
    }

    /// The `limit` most frequent ranks, most frequent first (ties alphabetical).
    pub async fn top_ranks(&self, limit: usize) -> Result<Vec<String>, QueryError> {
        let sql = format!(
            "SELECT CAST(\"rank\" AS VARCHAR) AS r, COUNT(*) AS cnt FROM {} \
             WHERE \"rank\" IS NOT NULL GROUP BY CAST(\"rank\" AS VARCHAR) ORDER BY cnt DESC, r ASC LIMIT {}",
            self.store.table_name(),
            limit
        );
        string_values(&self.run(&sql).await?)
    }
}

/// First column of every batch as strings, skipping nulls and empty values.
fn string_values(batches: &[RecordBatch]) -> Result<Vec<String>, QueryError> {
    use datafusion::arrow::array::StringArray;

    let mut values = Vec::new();
    for batch in batches {
        let column = cast(batch.column(0), &DataType::Utf8)
            .map_err(|e| QueryError::UnexpectedResult(e.to_string()))?;
        let strings = column
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| QueryError::UnexpectedResult("expected a string column".to_string()))?;
        values.extend(
            strings
                .iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(47, 20), 3);
        assert_eq!(total_pages(981_467, 15), 65_432);
    }

    #[tokio::test]
    async fn test_zero_paging_is_rejected() {
        use crate::card_store::{discover_single, LoadMode, StoreKind};
        use crate::unit_tests::fixtures::{write_cards, FixtureCard};

        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("cards.parquet");
        write_cards(&file, &[FixtureCard::new(1, "Иванов")]);
        let files = discover_single(&file).await.unwrap().unwrap();
        let store = Arc::new(CardStore::load(StoreKind::Sample, files, LoadMode::InMemory).await.unwrap());

        assert!(matches!(SearchService::new(Arc::clone(&store), 0, 10), Err(QueryError::InvalidPaging(_))));
        assert!(matches!(
            SearchService::with_paging(Arc::clone(&store), PagingConfig { page_size: 20, max_pages: 0 }),
            Err(QueryError::InvalidPaging(_))
        ));
        let service = SearchService::new(store, 20, 1).unwrap();
        assert_eq!(service.page_size(), 20);
        assert_eq!(service.max_pages(), 1);
    }

    #[test]
    fn test_clamp_page_index() {
        assert_eq!(clamp_page_index(999, 3), 2);
        assert_eq!(clamp_page_index(1, 3), 1);
        assert_eq!(clamp_page_index(5, 0), 0);
    }
}

//! Cardsearch - Paginated Search over Memorial Card Stores
//!
//! The search core of a dashboard over WWII memorial cards. Cards are stored
//! in Parquet, either as a 50K-row sample file or as a full corpus split into
//! size-capped chunks, and queried through an embedded DataFusion engine.
//!
//! # Overview
//!
//! - **Store loading**: chunked or single-file stores registered as one table,
//!   validated by footer before use and cached by file identity
//! - **Query building**: free text, region, rank and birth-year filters turned
//!   into one quoted SQL condition
//! - **Pagination**: separate count query, clamped page index, page ceiling
//! - **Highlighting**: case-insensitive literal marks in truncated HTML text
//! - **Sessions**: page cursor and bookmarks with a standalone HTML export
//! - **Text metrics**: lexical diversity and narrative type per card
//!
//! # Quick Start
//!
//! ```no_run
//! use cardsearch::card_store::cache::StoreCache;
//! use cardsearch::config::DashboardConfig;
//! use cardsearch::searching::paginated_search::SearchService;
//! use cardsearch::searching::query_builder::{FilterRequest, QueryBuilder};
//! use cardsearch::session::SearchSession;
//!
//! #[tokio::main]
//! async fn main() -> cardsearch::error::Result<()> {
//!     let config = DashboardConfig::from_data_dir("data");
//!     let cache = StoreCache::new();
//!     let Some(store) = cache.open_best(&config).await? else {
//!         eprintln!("no data, run the preparation step first");
//!         return Ok(());
//!     };
//!
//!     let service = SearchService::with_paging(store, config.sample_paging)?;
//!     let mut session = SearchSession::new(service, QueryBuilder::new())?;
//!     let page = session.submit(FilterRequest::default().with_text("Сталинград")).await?;
//!     println!("{} cards", page.total);
//!     Ok(())
//! }
//! ```

pub mod card_store;
pub mod config;
pub mod error;
pub mod rendering;
pub mod searching;
pub mod session;
pub mod text_metrics;
#[cfg(test)]
pub mod unit_tests;
pub mod utils;

pub use card_store::cache::StoreCache;
pub use card_store::{CardStore, LoadMode, StoreKind};
pub use config::DashboardConfig;
pub use error::{Error, QueryError, Result, StoreError};
pub use searching::highlight::highlight;
pub use searching::paginated_search::SearchService;
pub use searching::query_builder::{FilterRequest, Predicate, QueryBuilder};
pub use searching::search_results::{Card, SearchPage};
pub use session::bookmarks::{BookmarkSnapshot, BookmarkStore};
pub use session::SearchSession;
pub use text_metrics::{CardMetrics, NarrativeType};

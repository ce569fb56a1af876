//! Error types for card store loading and search.
//!
//! Three outcomes are kept apart on purpose by the API shape:
//! - a missing store is `Ok(None)` from the loader, not an error
//! - an empty result is an `Ok` page with no cards
//! - anything the engine rejects or fails on is one of the errors below

use datafusion::error::DataFusionError;
use thiserror::Error;

/// Errors raised while discovering, validating or registering a card store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A file exists but is not a readable Parquet file.
    #[error("corrupt store file '{path}': {reason}")]
    Corrupt { path: String, reason: String },

    /// A chunk's schema differs from the first chunk of the same store.
    #[error("chunk '{path}' has schema [{found}], expected [{expected}]")]
    SchemaMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Registering or materializing the table failed inside the query engine.
    #[error("query engine error while loading store: {0}")]
    Engine(#[from] DataFusionError),
}

/// Errors raised while building or executing a search.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The filter request violates its bounds (e.g. year range).
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Page size or page ceiling is zero.
    #[error("invalid paging: {0}")]
    InvalidPaging(String),

    #[error("query failed: {0}")]
    Engine(#[from] DataFusionError),

    /// The engine answered with a shape the caller cannot read.
    #[error("unexpected query result: {0}")]
    UnexpectedResult(String),
}

/// Top-level error type for cardsearch operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("search error: {0}")]
    Query(#[from] QueryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cardsearch operations.
pub type Result<T> = std::result::Result<T, Error>;

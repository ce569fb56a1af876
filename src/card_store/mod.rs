//! Columnar card stores: discovery, validation and registration with the query engine.
//!
//! A store is one logical table named after its kind. Behind it sits either a
//! single Parquet file or every chunk file of a chunked export. All chunks are
//! handed to the engine in one multi-file read, so counts, ordering and
//! `LIMIT`/`OFFSET` paging behave exactly as if the chunks were one file.
//!
//! # Discovery
//!
//! ```text
//! full/
//! ├── soldiers_fts_part000.parquet   ┐
//! ├── soldiers_fts_part001.parquet   ├─ chunked: all parts, sorted by name
//! └── soldiers_fts_part002.parquet   ┘
//!
//! full/soldiers_fts.parquet            single legacy file (only if no parts)
//! ```
//!
//! A missing directory or file is reported as `Ok(None)` so the caller can
//! fall back to the next store. A file that exists but has no valid Parquet
//! footer, or a chunk whose schema differs from the first chunk, is an error.

pub mod cache;
pub mod parquet_footer;

use std::path::{Path, PathBuf};
use std::time::Instant;
use datafusion::prelude::{ParquetReadOptions, SessionContext};
use object_store::ObjectMeta;
use tracing::{debug, info};
use crate::config::ChunkLayout;
use crate::error::{QueryError, StoreError};
use crate::utils::file_interaction::{absolute, get_object_store, head_file, list_directory, to_local_path};
use self::parquet_footer::{describe_schema, read_arrow_schema};

/// Which dataset a store holds. Also decides the registered table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Every card with a story, possibly chunked.
    FullCorpus,
    /// The stratified 50K sample.
    Sample,
}

impl StoreKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            StoreKind::FullCorpus => "soldiers_full",
            StoreKind::Sample => "soldiers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StoreKind::FullCorpus => "full corpus",
            StoreKind::Sample => "sample",
        }
    }
}

/// How the engine holds the table once registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Read every file once and keep the batches in memory.
    InMemory,
    /// Register a view that scans the files on each query.
    Scan,
}

/// Files discovered for one store.
#[derive(Debug, Clone)]
pub struct StoreFiles {
    /// Directory (chunked) or file (single) the store was discovered from.
    pub root: PathBuf,
    /// Files in table order.
    pub files: Vec<ObjectMeta>,
    pub chunked: bool,
}

/// Cache key for a loaded store.
///
/// Two loads share an identity only if they cover the same files with the
/// same sizes and modification times, so a rewritten chunk forces a reload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreIdentity {
    pub root: PathBuf,
    files: Vec<(String, u64, i64)>,
}

impl StoreFiles {
    pub fn identity(&self) -> StoreIdentity {
        StoreIdentity {
            root: self.root.clone(),
            files: self
                .files
                .iter()
                .map(|m| (m.location.to_string(), m.size, m.last_modified.timestamp_millis()))
                .collect(),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|m| m.size).sum()
    }

    pub fn local_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|m| to_local_path(&m.location)).collect()
    }
}

/// Finds the chunk files of `dir`, or its legacy single file.
///
/// Returns `Ok(None)` if the directory is missing or holds neither.
pub async fn discover_chunked(
    dir: impl AsRef<Path>,
    layout: &ChunkLayout,
) -> Result<Option<StoreFiles>, StoreError> {
    let root = absolute(dir.as_ref())?;
    let Some(entries) = list_directory(&root).await? else {
        debug!(dir = %root.display(), "store directory not found");
        return Ok(None);
    };

    let mut chunks: Vec<ObjectMeta> = entries
        .iter()
        .filter(|m| m.location.filename().is_some_and(|name| layout.is_chunk(name)))
        .cloned()
        .collect();

    if !chunks.is_empty() {
        chunks.sort_by(|a, b| a.location.cmp(&b.location));
        debug!(dir = %root.display(), chunks = chunks.len(), "discovered chunked store");
        return Ok(Some(StoreFiles { root, files: chunks, chunked: true }));
    }

    let legacy = entries
        .into_iter()
        .find(|m| m.location.filename() == Some(layout.legacy_file.as_str()));

    Ok(legacy.map(|meta| {
        debug!(dir = %root.display(), "discovered single-file store");
        StoreFiles { root, files: vec![meta], chunked: false }
    }))
}

/// Wraps a single Parquet file, or returns `Ok(None)` if it does not exist.
pub async fn discover_single(file: impl AsRef<Path>) -> Result<Option<StoreFiles>, StoreError> {
    let root = absolute(file.as_ref())?;
    Ok(head_file(&root).await?.map(|meta| StoreFiles {
        root,
        files: vec![meta],
        chunked: false,
    }))
}

/// A card table registered with its own query engine context.
///
/// Read-only after [`CardStore::load`]; share it behind an `Arc`.
pub struct CardStore {
    ctx: SessionContext,
    kind: StoreKind,
    files: StoreFiles,
    mode: LoadMode,
}

impl std::fmt::Debug for CardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardStore")
            .field("kind", &self.kind)
            .field("root", &self.files.root)
            .field("files", &self.files.files.len())
            .field("mode", &self.mode)
            .finish()
    }
}

impl CardStore {
    /// Validates every file footer and registers the files as one table.
    ///
    /// # Errors
    ///
    /// - `StoreError::Corrupt` if any file is not valid Parquet
    /// - `StoreError::SchemaMismatch` if chunk schemas differ
    /// - `StoreError::Engine` if registration or materialization fails
    pub async fn load(kind: StoreKind, files: StoreFiles, mode: LoadMode) -> Result<CardStore, StoreError> {
        let start = Instant::now();
        let (object_store, _) = get_object_store(&files.root)?;

        let mut expected: Option<(String, String)> = None;
        for meta in &files.files {
            let schema = describe_schema(&read_arrow_schema(&object_store, meta).await?);
            let path = to_local_path(&meta.location).display().to_string();
            match &expected {
                None => expected = Some((path, schema)),
                Some((_, first)) if *first != schema => {
                    return Err(StoreError::SchemaMismatch {
                        path,
                        expected: first.clone(),
                        found: schema,
                    });
                }
                Some(_) => {}
            }
        }

        let paths: Vec<String> = files
            .local_paths()
            .iter()
            .map(|p| p.display().to_string())
            .collect();

        let ctx = SessionContext::new();
        let df = ctx.read_parquet(paths, ParquetReadOptions::default()).await?;
        let provider = match mode {
            LoadMode::InMemory => df.cache().await?.into_view(),
            LoadMode::Scan => df.into_view(),
        };
        ctx.register_table(kind.table_name(), provider)?;

        info!(
            kind = kind.label(),
            files = files.files.len(),
            bytes = files.total_bytes(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "card store loaded"
        );

        Ok(CardStore { ctx, kind, files, mode })
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn table_name(&self) -> &'static str {
        self.kind.table_name()
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn files(&self) -> &StoreFiles {
        &self.files
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn identity(&self) -> StoreIdentity {
        self.files.identity()
    }

    /// Total number of cards in the table.
    pub async fn row_count(&self) -> Result<u64, QueryError> {
        let df = self.ctx.table(self.table_name()).await?;
        Ok(df.count().await? as u64)
    }
}

/// Summary of a loaded store for the `info` command.
#[derive(Debug, Clone)]
pub struct StoreInfo {
    pub kind: StoreKind,
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub chunked: bool,
    pub total_bytes: u64,
    pub rows: u64,
}

impl CardStore {
    pub async fn info(&self) -> Result<StoreInfo, QueryError> {
        Ok(StoreInfo {
            kind: self.kind,
            root: self.files.root.clone(),
            files: self.files.local_paths(),
            chunked: self.files.chunked,
            total_bytes: self.files.total_bytes(),
            rows: self.row_count().await?,
        })
    }
}

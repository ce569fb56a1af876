//! Dashboard configuration: data locations and the search UI limits.
//!
//! Defaults mirror the layout produced by the offline preparation job:
//!
//! ```text
//! data/
//! ├── sample/soldiers_sample_50k.parquet
//! └── full/
//!     ├── soldiers_fts_part000.parquet
//!     ├── soldiers_fts_part001.parquet
//!     └── ...                      (or a single legacy soldiers_fts.parquet)
//! ```

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const SAMPLE_FILE: &str = "sample/soldiers_sample_50k.parquet";
pub const FULL_DIR: &str = "full";
pub const CHUNK_PREFIX: &str = "soldiers_fts_part";
pub const CHUNK_EXTENSION: &str = ".parquet";
pub const LEGACY_FULL_FILE: &str = "soldiers_fts.parquet";

/// Inclusive bounds of the birth-year filter.
pub const MIN_BIRTH_YEAR: i32 = 1850;
pub const MAX_BIRTH_YEAR: i32 = 1940;

pub const FULL_PAGE_SIZE: usize = 15;
pub const SAMPLE_PAGE_SIZE: usize = 20;
pub const FULL_MAX_PAGES: usize = 100;
pub const SAMPLE_MAX_PAGES: usize = 50;

pub const STORY_MAX_CHARS: usize = 3000;
pub const BOOKMARK_EXCERPT_CHARS: usize = 300;
pub const MATTR_WINDOW: usize = 50;
pub const TOP_RANKS: usize = 30;

/// File naming for a store that may be chunked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLayout {
    /// Chunk files are `{prefix}*{extension}`, e.g. `soldiers_fts_part007.parquet`.
    pub chunk_prefix: String,
    pub chunk_extension: String,
    /// Single-file fallback used when no chunk is present.
    pub legacy_file: String,
}

impl Default for ChunkLayout {
    fn default() -> Self {
        ChunkLayout {
            chunk_prefix: CHUNK_PREFIX.to_string(),
            chunk_extension: CHUNK_EXTENSION.to_string(),
            legacy_file: LEGACY_FULL_FILE.to_string(),
        }
    }
}

impl ChunkLayout {
    /// True if `file_name` is one of this layout's chunk files.
    pub fn is_chunk(&self, file_name: &str) -> bool {
        file_name.len() > self.chunk_prefix.len() + self.chunk_extension.len()
            && file_name.starts_with(&self.chunk_prefix)
            && file_name.ends_with(&self.chunk_extension)
    }
}

/// Paging limits for one view of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub page_size: usize,
    pub max_pages: usize,
}

/// Everything the search core needs to know about where data lives and how
/// results are presented.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub layout: ChunkLayout,
    pub full_paging: PagingConfig,
    pub sample_paging: PagingConfig,
    pub story_max_chars: usize,
    pub excerpt_chars: usize,
    pub mattr_window: usize,
    pub top_ranks: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig::from_data_dir(DEFAULT_DATA_DIR)
    }
}

impl DashboardConfig {
    pub fn from_data_dir(data_dir: impl AsRef<Path>) -> Self {
        DashboardConfig {
            data_dir: data_dir.as_ref().to_path_buf(),
            layout: ChunkLayout::default(),
            full_paging: PagingConfig {
                page_size: FULL_PAGE_SIZE,
                max_pages: FULL_MAX_PAGES,
            },
            sample_paging: PagingConfig {
                page_size: SAMPLE_PAGE_SIZE,
                max_pages: SAMPLE_MAX_PAGES,
            },
            story_max_chars: STORY_MAX_CHARS,
            excerpt_chars: BOOKMARK_EXCERPT_CHARS,
            mattr_window: MATTR_WINDOW,
            top_ranks: TOP_RANKS,
        }
    }

    pub fn sample_file(&self) -> PathBuf {
        self.data_dir.join(SAMPLE_FILE)
    }

    pub fn full_dir(&self) -> PathBuf {
        self.data_dir.join(FULL_DIR)
    }
}

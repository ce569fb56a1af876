use std::path::Path;
use std::sync::Arc;
use dashmap::DashMap;
use tracing::{debug, info};
use crate::card_store::{discover_chunked, discover_single};
use crate::card_store::{CardStore, LoadMode, StoreFiles, StoreIdentity, StoreKind};
use crate::config::DashboardConfig;
use crate::error::StoreError;
use crate::utils::file_interaction::absolute;

/// Loaded stores keyed by [`StoreIdentity`].
///
/// Owned explicitly by whoever serves sessions (no process-wide static), so a
/// test or a reload can drop it or call [`StoreCache::invalidate`]. Only one
/// identity per root is kept: loading a changed file set evicts the stale one.
///
/// # Examples
///
/// ```no_run
/// # use cardsearch::card_store::cache::StoreCache;
/// # use cardsearch::config::DashboardConfig;
/// # tokio_test::block_on(async {
/// let cache = StoreCache::new();
/// let config = DashboardConfig::default();
///
/// // First call reads the footers and registers the table
/// let first = cache.open_best(&config).await.unwrap();
/// // Second call is served from the cache
/// let second = cache.open_best(&config).await.unwrap();
/// # });
/// ```
#[derive(Default)]
pub struct StoreCache {
    stores: DashMap<StoreIdentity, Arc<CardStore>>,
}

impl StoreCache {
    pub fn new() -> Self {
        StoreCache { stores: DashMap::new() }
    }

    /// Returns the cached store for these files, loading it on first use.
    pub async fn get_or_load(
        &self,
        kind: StoreKind,
        files: StoreFiles,
        mode: LoadMode,
    ) -> Result<Arc<CardStore>, StoreError> {
        let identity = files.identity();
        if let Some(hit) = self.stores.get(&identity) {
            debug!(root = %identity.root.display(), "store cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let store = Arc::new(CardStore::load(kind, files, mode).await?);

        // Files under this root changed since the last load
        self.stores.retain(|k, _| k.root != identity.root);
        let entry = self.stores.entry(identity).or_insert(store);
        Ok(Arc::clone(entry.value()))
    }

    /// Picks the best available store: the full corpus if present, else the sample.
    ///
    /// Returns `Ok(None)` when neither exists; the caller should tell the
    /// operator to run the offline preparation step.
    pub async fn open_best(&self, config: &DashboardConfig) -> Result<Option<Arc<CardStore>>, StoreError> {
        if let Some(files) = discover_chunked(config.full_dir(), &config.layout).await? {
            return self.get_or_load(StoreKind::FullCorpus, files, LoadMode::Scan).await.map(Some);
        }
        info!(dir = %config.full_dir().display(), "full corpus not found, falling back to sample");

        if let Some(files) = discover_single(config.sample_file()).await? {
            return self.get_or_load(StoreKind::Sample, files, LoadMode::InMemory).await.map(Some);
        }
        info!(file = %config.sample_file().display(), "sample not found, no backing store available");

        Ok(None)
    }

    /// Drops every store loaded from `root`. Returns how many were removed.
    pub fn invalidate(&self, root: impl AsRef<Path>) -> usize {
        let root = absolute(root.as_ref()).unwrap_or_else(|_| root.as_ref().to_path_buf());
        let before = self.stores.len();
        self.stores.retain(|k, _| k.root != root);
        before - self.stores.len()
    }

    pub fn clear(&self) {
        self.stores.clear();
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

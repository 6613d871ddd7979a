//! Icon catalog lifecycle
//!
//! The catalog owns the durable icon cache and publishes the [`IconIndex`]
//! used by resolvers. It is populated either from the persisted manifest
//! (cold start with a cache) or from a fresh archive download (no cache, or
//! an explicit refresh).
//!
//! A fresh download is fully staged in the scratch area before the old cache
//! is touched. The archive is fetched, extracted and its manifest parsed
//! first; only then is the cache replaced and the new index published.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::archive::{self, BundleLayout};
use super::fetch::{ArchiveSource, archive_source_from_config};
use super::index::{IconIndex, SharedIconIndex};
use super::manifest::{ICONS_DIR, IconManifest, MANIFEST_FILE};
use crate::config::IconConfig;
use crate::errors::{IconError, IconResult};

const SCRATCH_DIR: &str = "icon-refresh";
const ARCHIVE_FILE: &str = "gh-pages.zip";
const EXTRACT_DIR: &str = "extract";

/// Where the catalog keeps its durable cache and scratch data
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    pub cache_dir: PathBuf,
    pub tmp_dir: PathBuf,
}

impl CatalogPaths {
    pub fn new(cache_dir: impl Into<PathBuf>, tmp_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            tmp_dir: tmp_dir.into(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.cache_dir.join(MANIFEST_FILE)
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.cache_dir.join(ICONS_DIR)
    }

    fn scratch_dir(&self) -> PathBuf {
        self.tmp_dir.join(SCRATCH_DIR)
    }

    fn archive_path(&self) -> PathBuf {
        self.scratch_dir().join(ARCHIVE_FILE)
    }

    fn extract_dir(&self) -> PathBuf {
        self.scratch_dir().join(EXTRACT_DIR)
    }
}

pub struct IconCatalog {
    paths: CatalogPaths,
    source: Arc<dyn ArchiveSource>,
    index: SharedIconIndex,
    refresh_lock: Arc<Mutex<()>>,
}

/// A refresh that has claimed the catalog but not started yet.
///
/// Holding the job keeps other refreshes out until [`RefreshJob::run`]
/// completes or the job is dropped.
pub struct RefreshJob {
    catalog: Arc<IconCatalog>,
    _guard: OwnedMutexGuard<()>,
}

impl RefreshJob {
    pub async fn run(self) -> IconResult<usize> {
        self.catalog.refresh_locked().await
    }
}

impl IconCatalog {
    pub fn new(paths: CatalogPaths, source: Arc<dyn ArchiveSource>) -> Self {
        Self {
            paths,
            source,
            index: IconIndex::default().shared(),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(config: &IconConfig) -> Self {
        Self::new(
            CatalogPaths::new(&config.cache_dir, &config.tmp_dir),
            Arc::from(archive_source_from_config(config)),
        )
    }

    pub fn paths(&self) -> &CatalogPaths {
        &self.paths
    }

    /// Currently published index
    pub fn index(&self) -> Arc<IconIndex> {
        self.index.load_full()
    }

    /// Handle for readers that should follow future refreshes
    pub fn index_handle(&self) -> SharedIconIndex {
        Arc::clone(&self.index)
    }

    pub fn has_cache(&self) -> bool {
        self.paths.manifest_path().is_file()
    }

    /// Populate the index at startup.
    ///
    /// Uses the persisted manifest when present unless `force_refresh` is
    /// set. A fresh download that fails falls back to the cache if one is
    /// still on disk. Holds the catalog for the whole sequence, waiting for
    /// any refresh already running.
    pub async fn initialize(&self, force_refresh: bool) -> IconResult<usize> {
        let _guard = self.refresh_lock.lock().await;

        if self.has_cache() && !force_refresh {
            match self.load_from_cache_locked().await {
                Ok(count) => return Ok(count),
                Err(e) => warn!("Icon cache unreadable, downloading a fresh catalog: {}", e),
            }
        }

        match self.refresh_locked().await {
            Ok(count) => Ok(count),
            Err(e) if self.has_cache() => {
                warn!("Icon catalog refresh failed, using cached catalog: {}", e);
                self.load_from_cache_locked().await
            }
            Err(e) => Err(e),
        }
    }

    /// Rebuild the index from the persisted manifest, without network access.
    ///
    /// Waits for a running refresh so an older manifest never replaces the
    /// index that refresh publishes.
    pub async fn load_from_cache(&self) -> IconResult<usize> {
        let _guard = self.refresh_lock.lock().await;
        self.load_from_cache_locked().await
    }

    async fn load_from_cache_locked(&self) -> IconResult<usize> {
        let manifest_path = self.paths.manifest_path();
        let index = tokio::task::spawn_blocking(move || {
            IconManifest::read(&manifest_path).map(|manifest| IconIndex::from_manifest(&manifest))
        })
        .await??;

        let count = index.len();
        self.index.store(Arc::new(index));
        info!(
            "Loaded {} icons from cache {}",
            count,
            self.paths.cache_dir.display()
        );
        Ok(count)
    }

    /// Download and install a fresh catalog.
    ///
    /// Fails with [`IconError::RefreshInProgress`] if another refresh holds
    /// the catalog.
    pub async fn refresh(&self) -> IconResult<usize> {
        let _guard = self
            .refresh_lock
            .try_lock()
            .map_err(|_| IconError::RefreshInProgress)?;
        self.refresh_locked().await
    }

    /// Claim the catalog for a refresh that will run elsewhere, typically a
    /// spawned task.
    pub fn begin_refresh(self: &Arc<Self>) -> IconResult<RefreshJob> {
        let guard = Arc::clone(&self.refresh_lock)
            .try_lock_owned()
            .map_err(|_| IconError::RefreshInProgress)?;
        Ok(RefreshJob {
            catalog: Arc::clone(self),
            _guard: guard,
        })
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_lock.try_lock().is_err()
    }

    async fn refresh_locked(&self) -> IconResult<usize> {
        let started = Instant::now();
        let scratch = self.paths.scratch_dir();

        let result = self.stage_and_install().await;

        let cleanup = tokio::task::spawn_blocking(move || archive::remove_dir_if_exists(&scratch));
        match cleanup.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to clean icon scratch area: {}", e),
            Err(e) => warn!("Icon scratch cleanup task failed: {}", e),
        }

        let count = result?;
        info!(
            "Icon catalog refreshed from {}: {} icons in {:?}",
            self.source.describe(),
            count,
            started.elapsed()
        );
        Ok(count)
    }

    async fn stage_and_install(&self) -> IconResult<usize> {
        let scratch = self.paths.scratch_dir();
        let reset = scratch.clone();
        tokio::task::spawn_blocking(move || {
            archive::remove_dir_if_exists(&reset)?;
            std::fs::create_dir_all(&reset).map_err(|e| IconError::io(&reset, e))
        })
        .await??;

        let archive_path = self.paths.archive_path();
        let bytes = self.source.fetch(&archive_path).await?;
        debug!("Fetched icon archive: {} bytes", bytes);

        let extract_dir = self.paths.extract_dir();
        let (layout, manifest) = tokio::task::spawn_blocking(move || stage(&archive_path, &extract_dir))
            .await??;
        let index = IconIndex::from_manifest(&manifest);

        let paths = self.paths.clone();
        tokio::task::spawn_blocking(move || install(&paths, &layout)).await??;

        let count = index.len();
        self.index.store(Arc::new(index));

        let manifest_path = self.paths.manifest_path();
        let persisted = tokio::task::spawn_blocking(move || manifest.write(&manifest_path)).await?;
        if let Err(e) = persisted {
            warn!(
                "Icon index is live but the manifest was not persisted, next start will download again: {}",
                e
            );
        }

        Ok(count)
    }
}

/// Extract the archive, find the bundle and parse its manifest
fn stage(archive_path: &Path, extract_dir: &Path) -> IconResult<(BundleLayout, IconManifest)> {
    let report = archive::extract_archive(archive_path, extract_dir)?;
    if !report.skipped.is_empty() {
        warn!(
            "Icon archive contained {} unsafe entries that were skipped",
            report.skipped.len()
        );
    }

    let layout = archive::locate_bundle(extract_dir)?;
    let manifest = IconManifest::read(&layout.manifest)?.with_derived_keys();
    Ok((layout, manifest))
}

/// Replace the cached icons directory with the staged one
fn install(paths: &CatalogPaths, layout: &BundleLayout) -> IconResult<()> {
    archive::remove_dir_if_exists(&paths.cache_dir)?;
    std::fs::create_dir_all(&paths.cache_dir).map_err(|e| IconError::io(&paths.cache_dir, e))?;
    archive::move_path(&layout.icons_dir, &paths.icons_dir())
}

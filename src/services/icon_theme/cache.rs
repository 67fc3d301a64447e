//! Icon service: memoized resolution, background warming and theme switching
//!
//! The whole published state (descriptor, lookup table and both cache tiers) sits behind
//! one `ArcSwap`. Rebuilds and invalidations construct a new [`ThemeState`] and publish it
//! in a single swap, so readers see either the old state or the new one, never a mix.
//! Entries written into a state that has since been replaced are dropped with it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use ahash::AHashSet;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use futures_util::future::{join_all, BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{
    config::IconThemeConfig,
    discovery::{ExtensionDirProvider, ThemeProvider},
    error::{Result, IconThemeError},
    index::LookupTable,
    loader::ThemeLoader,
    processing::{self, AssetReader, FsAssetReader, IconRenderer, RenderPlan},
    resolver,
    types::{CacheKey, IconThemeDescriptor, RenderedIcon, ResolvedIconId},
};
use crate::types::{EngineStats, Timer};

type BuildFuture = Shared<BoxFuture<'static, Arc<ThemeState>>>;

/// One published theme snapshot together with its caches
pub struct ThemeState {
    requested_theme: String,
    generation: u64,
    loaded: bool,
    descriptor: Arc<IconThemeDescriptor>,
    table: Arc<LookupTable>,
    /// Lookup key -> finished icon
    results: DashMap<CacheKey, RenderedIcon>,
    /// Lookup key -> theme-relative asset path
    paths: DashMap<CacheKey, String>,
}

impl ThemeState {
    fn unloaded() -> Self {
        Self {
            requested_theme: String::new(),
            generation: 0,
            loaded: false,
            descriptor: Arc::new(IconThemeDescriptor::default()),
            table: Arc::new(LookupTable::default()),
            results: DashMap::new(),
            paths: DashMap::new(),
        }
    }

    fn built(
        requested_theme: String,
        generation: u64,
        descriptor: IconThemeDescriptor,
        table: LookupTable,
    ) -> Self {
        Self {
            requested_theme,
            generation,
            loaded: true,
            descriptor: Arc::new(descriptor),
            table: Arc::new(table),
            results: DashMap::new(),
            paths: DashMap::new(),
        }
    }

    /// Same theme, empty caches
    fn invalidated(&self, generation: u64) -> Self {
        Self {
            requested_theme: self.requested_theme.clone(),
            generation,
            loaded: self.loaded,
            descriptor: Arc::clone(&self.descriptor),
            table: Arc::clone(&self.table),
            results: DashMap::new(),
            paths: DashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Theme id the host asked for; the descriptor may come from the fallback theme
    pub fn requested_theme(&self) -> &str {
        &self.requested_theme
    }

    pub fn descriptor(&self) -> &IconThemeDescriptor {
        &self.descriptor
    }

    pub fn table(&self) -> &LookupTable {
        &self.table
    }

    pub fn cached_results(&self) -> usize {
        self.results.len()
    }

    pub fn cached_paths(&self) -> usize {
        self.paths.len()
    }
}

/// Outcome of a preload pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Files that produced a theme icon
    pub resolved: usize,
    /// Files left on the fallback icon
    pub fallbacks: usize,
}

struct Inner {
    config: RwLock<IconThemeConfig>,
    loader: ThemeLoader,
    renderer: IconRenderer,
    state: ArcSwap<ThemeState>,
    /// Pending or last build; concurrent initializers share it
    build: Mutex<Option<BuildFuture>>,
    /// Ticket of the most recently started build
    build_seq: AtomicU64,
    /// Every swap of `state` happens under this lock
    clock: Mutex<PublishClock>,
    ready: watch::Sender<u64>,
}

#[derive(Debug, Default)]
struct PublishClock {
    /// Ticket of the build whose state is published
    ticket: u64,
    generation: u64,
}

/// Resolves file icons against the active theme. Cheap to clone.
#[derive(Clone)]
pub struct IconThemeService {
    inner: Arc<Inner>,
}

impl IconThemeService {
    /// Service discovering themes in `config.extension_dirs`
    pub fn new(config: IconThemeConfig) -> Self {
        let provider = Arc::new(ExtensionDirProvider::new(config.extension_dirs.clone()));
        Self::with_provider(config, provider)
    }

    pub fn with_provider(config: IconThemeConfig, provider: Arc<dyn ThemeProvider>) -> Self {
        Self::with_reader(config, provider, Arc::new(FsAssetReader))
    }

    pub fn with_reader(
        config: IconThemeConfig,
        provider: Arc<dyn ThemeProvider>,
        reader: Arc<dyn AssetReader>,
    ) -> Self {
        let loader = ThemeLoader::new(provider, Arc::clone(&reader), config.fallback_theme.clone());
        let (ready, _) = watch::channel(0);

        Self {
            inner: Arc::new(Inner {
                config: RwLock::new(config),
                loader,
                renderer: IconRenderer::new(reader),
                state: ArcSwap::from_pointee(ThemeState::unloaded()),
                build: Mutex::new(None),
                build_seq: AtomicU64::new(0),
                clock: Mutex::new(PublishClock::default()),
                ready,
            }),
        }
    }

    /// Currently published state, without waiting for initialization
    pub fn current(&self) -> Arc<ThemeState> {
        self.inner.state.load_full()
    }

    /// Bumped by every rebuild and invalidation
    pub fn generation(&self) -> u64 {
        self.inner.state.load().generation
    }

    pub fn config(&self) -> IconThemeConfig {
        self.inner.config.read().clone()
    }

    /// Receives the generation after every completed (re)build
    pub fn subscribe_ready(&self) -> watch::Receiver<u64> {
        self.inner.ready.subscribe()
    }

    /// Load the active theme once; concurrent callers share the same build
    pub async fn ensure_ready(&self) -> Arc<ThemeState> {
        let current = self.current();
        if current.loaded {
            return current;
        }

        let pending = {
            let mut slot = self.inner.build.lock();
            match slot.as_ref() {
                Some(build) => build.clone(),
                None => {
                    let theme_id = self.inner.config.read().active_theme.clone();
                    let build = self.start_build(theme_id, false);
                    *slot = Some(build.clone());
                    build
                }
            }
        };
        pending.await
    }

    /// Build `theme_id`. Without `force` this is a no-op when it is already active.
    pub async fn rebuild(&self, theme_id: &str, force: bool) -> Arc<ThemeState> {
        self.inner.config.write().active_theme = theme_id.to_string();

        let build = self.start_build(theme_id.to_string(), force);
        *self.inner.build.lock() = Some(build.clone());
        build.await
    }

    /// Theme-change notification: re-read and re-index even if the id is unchanged
    pub async fn reload(&self, theme_id: &str) -> Arc<ThemeState> {
        self.rebuild(theme_id, true).await
    }

    /// Rebuild on every value received from the host's theme setting
    pub fn watch_theme_changes(&self, mut theme_ids: watch::Receiver<String>) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            while theme_ids.changed().await.is_ok() {
                let theme_id = theme_ids.borrow_and_update().clone();
                log::info!("Icon theme changed to '{}'", theme_id);
                service.reload(&theme_id).await;
            }
            log::debug!("Icon theme change stream closed");
        })
    }

    /// Drop both cache tiers at once, keeping the current table
    pub fn invalidate(&self) {
        let mut clock = self.inner.clock.lock();
        clock.generation += 1;

        let current = self.inner.state.load_full();
        self.inner
            .state
            .store(Arc::new(current.invalidated(clock.generation)));
        log::debug!("Icon caches invalidated (generation {})", clock.generation);
    }

    /// Resolver only: the icon-definition id for a file
    pub async fn resolve_id(&self, file_name: &str, language_id: Option<&str>) -> ResolvedIconId {
        let state = self.ensure_ready().await;
        resolver::resolve(&state.table, file_name, language_id)
    }

    /// Cached icon for a file, falling back instead of failing
    pub async fn get_or_resolve(&self, file_name: &str, language_id: Option<&str>) -> RenderedIcon {
        match self.try_get_or_resolve(file_name, language_id).await {
            Ok(icon) => icon,
            Err(IconThemeError::NoMatch(reason)) => {
                log::debug!("Fallback icon for '{}': {}", file_name, reason);
                RenderedIcon::Fallback
            }
            Err(e) => {
                log::warn!("Fallback icon for '{}' [{}]: {}", file_name, e.kind(), e);
                RenderedIcon::Fallback
            }
        }
    }

    pub async fn try_get_or_resolve(
        &self,
        file_name: &str,
        language_id: Option<&str>,
    ) -> Result<RenderedIcon> {
        let state = self.ensure_ready().await;
        let key = CacheKey::new(file_name, language_id);

        let cached = state.results.get(&key).map(|entry| entry.value().clone());
        if let Some(icon) = cached {
            return Ok(icon);
        }

        match self.resolve_uncached(&state, &key, file_name, language_id).await {
            Ok(icon) => {
                state.results.insert(key, icon.clone());
                Ok(icon)
            }
            Err(e) => {
                if self.inner.config.read().cache_negative_results {
                    state.results.insert(key, RenderedIcon::Fallback);
                }
                Err(e)
            }
        }
    }

    async fn resolve_uncached(
        &self,
        state: &ThemeState,
        key: &CacheKey,
        file_name: &str,
        language_id: Option<&str>,
    ) -> Result<RenderedIcon> {
        let root = &state.descriptor.root_dir;

        let known_path = state.paths.get(key).map(|entry| entry.value().clone());
        if let Some(path) = known_path {
            log::trace!("Path cache hit for '{}': {}", file_name, path);
            return self.inner.renderer.read_asset(root, &path).await;
        }

        let icon_id = resolver::resolve(&state.table, file_name, language_id)
            .ok_or_else(|| IconThemeError::NoMatch(file_name.to_string()))?;

        match processing::plan(&icon_id, &state.descriptor)? {
            RenderPlan::Ready(icon) => Ok(icon),
            RenderPlan::Asset(path) => {
                state.paths.insert(key.clone(), path.clone());
                self.inner.renderer.read_asset(root, &path).await
            }
        }
    }

    /// Warm the cache for `file_names`, `concurrency_limit` resolutions per batch.
    ///
    /// Each batch finishes before the next starts. Failures are logged and counted,
    /// never abort the pass.
    pub async fn preload<I, S>(&self, file_names: I, concurrency_limit: usize) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let limit = concurrency_limit.max(1);
        let mut seen = AHashSet::new();
        let names: Vec<String> = file_names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .filter(|name| seen.insert(name.to_lowercase()))
            .collect();

        let timer = Timer::start();
        self.ensure_ready().await;

        let mut report = PreloadReport::default();
        for batch in names.chunks(limit) {
            let results = join_all(batch.iter().map(|name| self.try_get_or_resolve(name, None))).await;

            for (name, result) in batch.iter().zip(results) {
                match result {
                    Ok(icon) if !icon.is_fallback() => report.resolved += 1,
                    Ok(_) => report.fallbacks += 1,
                    Err(e) => {
                        log::warn!("Preload of '{}' failed [{}]: {}", name, e.kind(), e);
                        report.fallbacks += 1;
                    }
                }
            }
        }

        log::info!(
            "Preloaded {} icons ({} resolved, {} fallback) in {:.1}ms",
            names.len(),
            report.resolved,
            report.fallbacks,
            timer.elapsed_ms()
        );
        report
    }

    /// [`preload`](Self::preload) with the configured batch size
    pub async fn preload_open_files<I, S>(&self, file_names: I) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let limit = self.inner.config.read().preload_batch_size;
        self.preload(file_names, limit).await
    }

    pub fn stats(&self) -> EngineStats {
        let state = self.current();
        EngineStats {
            theme_id: state.descriptor.theme_id.clone(),
            generation: state.generation,
            table_entries: state.table.len(),
            definitions: state.descriptor.icon_definitions.len(),
            cached_results: state.results.len(),
            cached_paths: state.paths.len(),
        }
    }

    /// Spawn the build so it completes even if every waiter goes away
    fn start_build(&self, theme_id: String, force: bool) -> BuildFuture {
        let ticket = self.inner.build_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let service = self.clone();
        let handle = tokio::spawn(async move { service.run_build(theme_id, force, ticket).await });

        let inner = Arc::downgrade(&self.inner);
        async move {
            match handle.await {
                Ok(state) => state,
                Err(e) => {
                    let err = IconThemeError::from(e);
                    log::error!("Icon theme build {} failed [{}]: {}", ticket, err.kind(), err);
                    inner
                        .upgrade()
                        .map(|inner| inner.state.load_full())
                        .unwrap_or_else(|| Arc::new(ThemeState::unloaded()))
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn run_build(&self, theme_id: String, force: bool, ticket: u64) -> Arc<ThemeState> {
        let current = self.current();
        if !force && current.loaded && current.requested_theme == theme_id {
            log::debug!("Icon theme '{}' already active, skipping rebuild", theme_id);
            return current;
        }

        let timer = Timer::start();
        let descriptor = self.inner.loader.load(&theme_id).await;
        let table = LookupTable::build(&descriptor);

        let Some(state) = self.publish(theme_id, descriptor, table, ticket) else {
            log::debug!("Icon theme build {} superseded by a newer one", ticket);
            return self.current();
        };

        log::info!(
            "Icon theme '{}' ready: {} lookup entries, {} definitions, generation {} ({:.1}ms)",
            state.descriptor.theme_id,
            state.table.len(),
            state.descriptor.icon_definitions.len(),
            state.generation,
            timer.elapsed_ms()
        );
        state
    }

    /// Swap in the new state unless a later build already published
    fn publish(
        &self,
        theme_id: String,
        descriptor: IconThemeDescriptor,
        table: LookupTable,
        ticket: u64,
    ) -> Option<Arc<ThemeState>> {
        let mut clock = self.inner.clock.lock();
        if ticket < clock.ticket {
            return None;
        }
        clock.ticket = ticket;
        clock.generation += 1;

        let state = Arc::new(ThemeState::built(theme_id, clock.generation, descriptor, table));
        self.inner.state.store(Arc::clone(&state));
        self.inner.ready.send_replace(state.generation);
        Some(state)
    }
}

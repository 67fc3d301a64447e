//! Test helpers: on-disk theme fixtures and a reader that counts disk access

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use tempfile::TempDir;

use super::discovery::{StaticThemeProvider, ThemeProvider, ThemeRegistration};
use super::processing::{AssetReader, FsAssetReader};

/// Descriptor location inside each fixture package
const DESCRIPTOR_PATH: &str = "icons/theme.json";

/// [`FsAssetReader`] that records how often it was called
#[derive(Debug, Default)]
pub(crate) struct CountingReader {
    inner: FsAssetReader,
    reads: AtomicUsize,
    exists_checks: AtomicUsize,
}

impl CountingReader {
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.reads() + self.exists_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetReader for CountingReader {
    async fn exists(&self, path: &Path) -> bool {
        self.exists_checks.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(path).await
    }
}

/// Reader that holds every read open for a while and records the peak overlap
#[derive(Debug)]
pub(crate) struct InFlightReader {
    inner: FsAssetReader,
    hold: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightReader {
    pub(crate) fn new(hold: Duration) -> Self {
        Self {
            inner: FsAssetReader,
            hold,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetReader for InFlightReader {
    async fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        let bytes = self.inner.read(path).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        bytes
    }
}

/// Provider that answers lookups for one theme id only after a delay
pub(crate) struct SlowProvider {
    inner: Arc<StaticThemeProvider>,
    slow_id: String,
    delay: Duration,
}

impl SlowProvider {
    pub(crate) fn new(inner: Arc<StaticThemeProvider>, slow_id: &str, delay: Duration) -> Self {
        Self {
            inner,
            slow_id: slow_id.to_string(),
            delay,
        }
    }
}

#[async_trait]
impl ThemeProvider for SlowProvider {
    async fn list(&self) -> Vec<ThemeRegistration> {
        self.inner.list().await
    }

    async fn find(&self, theme_id: &str) -> Option<ThemeRegistration> {
        if theme_id == self.slow_id {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.find(theme_id).await
    }
}

/// Theme packages written into a temporary directory
pub(crate) struct ThemeFixture {
    dir: TempDir,
    themes: Vec<ThemeRegistration>,
}

impl ThemeFixture {
    pub(crate) fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            themes: Vec::new(),
        }
    }

    /// Write a theme document plus assets; asset paths are relative to the descriptor
    pub(crate) fn add_theme(
        &mut self,
        id: &str,
        document: serde_json::Value,
        assets: &[(&str, &[u8])],
    ) -> ThemeRegistration {
        let registration = self.add_raw_theme(id, &document.to_string());
        let asset_root = registration.asset_root();
        for (path, bytes) in assets {
            let target = asset_root.join(path);
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::write(target, bytes).unwrap();
        }
        registration
    }

    /// Write a descriptor file verbatim
    pub(crate) fn add_raw_theme(&mut self, id: &str, descriptor: &str) -> ThemeRegistration {
        let package_root = self.dir.path().join(id);
        let registration = ThemeRegistration::new(id, &package_root, DESCRIPTOR_PATH);
        fs::create_dir_all(registration.asset_root()).unwrap();
        fs::write(&registration.descriptor_path, descriptor).unwrap();

        self.themes.retain(|t| t.id != id);
        self.themes.push(registration.clone());
        registration
    }

    pub(crate) fn provider(&self) -> Arc<StaticThemeProvider> {
        Arc::new(StaticThemeProvider::new(self.themes.clone()))
    }
}

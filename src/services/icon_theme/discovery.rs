//! Icon theme discovery
//!
//! Maps a theme id to the package that declares it and the descriptor file on disk.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::task;
use walkdir::WalkDir;

use super::error::{IconThemeError, Result};

/// Manifest file every extension package carries at its root
const MANIFEST_FILE: &str = "package.json";

/// An installed icon theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRegistration {
    pub id: String,
    pub label: String,
    /// Root directory of the declaring package
    pub package_root: PathBuf,
    /// Absolute path of the theme descriptor file
    pub descriptor_path: PathBuf,
}

impl ThemeRegistration {
    pub fn new(
        id: impl Into<String>,
        package_root: impl Into<PathBuf>,
        descriptor_path: impl AsRef<Path>,
    ) -> Self {
        let id = id.into();
        let package_root = package_root.into();
        let descriptor_path = package_root.join(descriptor_path);
        Self {
            label: id.clone(),
            id,
            package_root,
            descriptor_path,
        }
    }

    /// Directory relative asset paths in the descriptor are written against
    pub fn asset_root(&self) -> PathBuf {
        self.descriptor_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.package_root.clone())
    }
}

/// Source of installed icon themes
#[async_trait]
pub trait ThemeProvider: Send + Sync {
    /// Every theme the provider knows about
    async fn list(&self) -> Vec<ThemeRegistration>;

    /// Look up one theme; exact id match wins over a case-insensitive one
    async fn find(&self, theme_id: &str) -> Option<ThemeRegistration> {
        let themes = self.list().await;
        pick_theme(themes, theme_id)
    }
}

fn pick_theme(themes: Vec<ThemeRegistration>, theme_id: &str) -> Option<ThemeRegistration> {
    if let Some(exact) = themes.iter().position(|t| t.id == theme_id) {
        return themes.into_iter().nth(exact);
    }
    themes
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(theme_id))
}

/// Fixed list of themes supplied by the host
#[derive(Debug, Clone, Default)]
pub struct StaticThemeProvider {
    themes: Vec<ThemeRegistration>,
}

impl StaticThemeProvider {
    pub fn new(themes: Vec<ThemeRegistration>) -> Self {
        Self { themes }
    }

    pub fn with_theme(mut self, theme: ThemeRegistration) -> Self {
        self.themes.push(theme);
        self
    }
}

#[async_trait]
impl ThemeProvider for StaticThemeProvider {
    async fn list(&self) -> Vec<ThemeRegistration> {
        self.themes.clone()
    }
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    contributes: Contributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Contributes {
    #[serde(default)]
    icon_themes: Vec<IconThemeContribution>,
}

#[derive(Debug, Deserialize)]
struct IconThemeContribution {
    id: String,
    #[serde(default)]
    label: Option<String>,
    path: String,
}

/// Scans extension directories for packages contributing icon themes
#[derive(Debug, Clone)]
pub struct ExtensionDirProvider {
    roots: Vec<PathBuf>,
}

impl ExtensionDirProvider {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Synchronous scan; each root is walked one level deep
    pub fn scan(roots: &[PathBuf]) -> Vec<ThemeRegistration> {
        let mut themes = Vec::new();

        for root in roots {
            if !root.is_dir() {
                log::debug!("Extension directory {:?} does not exist, skipping", root);
                continue;
            }

            let walker = WalkDir::new(root)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name();

            for entry in walker.into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_dir() {
                    continue;
                }
                match read_manifest(entry.path()) {
                    Ok(found) => themes.extend(found),
                    Err(e) => log::debug!("Skipping package {:?}: {}", entry.path(), e),
                }
            }
        }

        log::debug!("Discovered {} icon themes in {} directories", themes.len(), roots.len());
        themes
    }
}

#[async_trait]
impl ThemeProvider for ExtensionDirProvider {
    async fn list(&self) -> Vec<ThemeRegistration> {
        let roots = self.roots.clone();
        match task::spawn_blocking(move || ExtensionDirProvider::scan(&roots)).await {
            Ok(themes) => themes,
            Err(e) => {
                log::error!("Icon theme scan task failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Icon themes declared by the package at `package_root`
fn read_manifest(package_root: &Path) -> Result<Vec<ThemeRegistration>> {
    let manifest_path = package_root.join(MANIFEST_FILE);
    let raw = std::fs::read_to_string(&manifest_path)?;
    let manifest: PackageManifest =
        serde_json::from_str(&raw).map_err(|source| IconThemeError::MalformedDescriptor {
            path: manifest_path.clone(),
            source,
        })?;

    Ok(manifest
        .contributes
        .icon_themes
        .into_iter()
        .map(|contribution| {
            let mut registration =
                ThemeRegistration::new(contribution.id, package_root, &contribution.path);
            if let Some(label) = contribution.label {
                registration.label = label;
            }
            registration
        })
        .collect())
}

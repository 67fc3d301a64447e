//! Conversion of resolved icon definitions into renderer-ready icons

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use base64::prelude::*;

use super::{
    types::{IconDefinition, IconThemeDescriptor, RenderedIcon, RASTER_MIME, SVG_MIME},
    error::{Result, IconThemeError},
};
use crate::utils::{lexical_resolve, to_platform_separators};

/// Filesystem access used by the engine
#[async_trait]
pub trait AssetReader: Send + Sync {
    /// Whether `path` names an existing regular file
    async fn exists(&self, path: &Path) -> bool;

    /// Read the whole file
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// `tokio::fs` backed reader
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAssetReader;

#[async_trait]
impl AssetReader for FsAssetReader {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}

/// What rendering a definition requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPlan {
    /// Finished without I/O
    Ready(RenderedIcon),
    /// Needs the asset at this theme-relative path
    Asset(String),
}

/// Turns icon-definition ids into [`RenderedIcon`]s
pub struct IconRenderer {
    reader: Arc<dyn AssetReader>,
}

impl IconRenderer {
    pub fn new(reader: Arc<dyn AssetReader>) -> Self {
        Self { reader }
    }

    /// Render `icon_id`, degrading every failure to [`RenderedIcon::Fallback`]
    pub async fn render(&self, icon_id: Option<&str>, descriptor: &IconThemeDescriptor) -> RenderedIcon {
        let Some(icon_id) = icon_id else {
            return RenderedIcon::Fallback;
        };
        match self.try_render(icon_id, descriptor).await {
            Ok(icon) => icon,
            Err(e) => {
                log::warn!("Icon '{}' falls back: {}", icon_id, e);
                RenderedIcon::Fallback
            }
        }
    }

    pub async fn try_render(&self, icon_id: &str, descriptor: &IconThemeDescriptor) -> Result<RenderedIcon> {
        match plan(icon_id, descriptor)? {
            RenderPlan::Ready(icon) => Ok(icon),
            RenderPlan::Asset(path) => self.read_asset(&descriptor.root_dir, &path).await,
        }
    }

    /// Read an asset written relative to `root` and encode it as a data URI icon
    pub async fn read_asset(&self, root: &Path, asset_path: &str) -> Result<RenderedIcon> {
        let resolved = self.locate(root, asset_path).await?;

        let bytes = self
            .reader
            .read(&resolved)
            .await
            .map_err(|source| IconThemeError::AssetUnreadable {
                path: resolved.clone(),
                source,
            })?;

        log::trace!("Encoding {} bytes from {:?}", bytes.len(), resolved);

        Ok(RenderedIcon::ImageDataUri {
            mime_type: mime_for(asset_path),
            base64_payload: Arc::from(BASE64_STANDARD.encode(&bytes)),
        })
    }

    /// First existing candidate among the resolve-style and join-style paths
    async fn locate(&self, root: &Path, asset_path: &str) -> Result<PathBuf> {
        let normalized = PathBuf::from(to_platform_separators(asset_path));
        let resolved = lexical_resolve(root, &normalized);
        let joined = root.join(&normalized);

        if self.reader.exists(&resolved).await {
            return Ok(resolved);
        }
        if joined != resolved && self.reader.exists(&joined).await {
            log::debug!("Asset found only via joined path {:?}", joined);
            return Ok(joined);
        }

        Err(IconThemeError::AssetUnreadable {
            path: resolved,
            source: io::Error::new(io::ErrorKind::NotFound, "no candidate path exists"),
        })
    }
}

/// Decide how `icon_id` renders without touching the filesystem
pub fn plan(icon_id: &str, descriptor: &IconThemeDescriptor) -> Result<RenderPlan> {
    match descriptor.definition(icon_id) {
        Some(IconDefinition::Glyph { character, color }) => Ok(RenderPlan::Ready(
            RenderedIcon::glyph(character, color.as_deref()),
        )),
        Some(IconDefinition::Asset { path }) => Ok(RenderPlan::Asset(path.clone())),
        Some(IconDefinition::Empty) => Err(IconThemeError::NoMatch(format!(
            "definition '{}' has neither a glyph nor an asset path",
            icon_id
        ))),
        None => Err(IconThemeError::NoMatch(format!(
            "definition '{}' is not declared by theme '{}'",
            icon_id, descriptor.theme_id
        ))),
    }
}

/// MIME type from the asset's own extension
fn mime_for(asset_path: &str) -> &'static str {
    let is_svg = Path::new(asset_path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg { SVG_MIME } else { RASTER_MIME }
}

//! Locating and parsing the active theme's descriptor

use std::sync::Arc;

use super::{
    discovery::{ThemeProvider, ThemeRegistration},
    processing::AssetReader,
    types::{IconThemeDescriptor, ThemeDocument},
    error::{Result, IconThemeError},
};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Loads icon theme descriptors. Holds no engine state.
pub struct ThemeLoader {
    provider: Arc<dyn ThemeProvider>,
    reader: Arc<dyn AssetReader>,
    fallback_theme: String,
}

impl ThemeLoader {
    pub fn new(
        provider: Arc<dyn ThemeProvider>,
        reader: Arc<dyn AssetReader>,
        fallback_theme: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            reader,
            fallback_theme: fallback_theme.into(),
        }
    }

    /// Load `theme_id`, or the fallback theme, or an empty descriptor. Never fails.
    pub async fn load(&self, theme_id: &str) -> IconThemeDescriptor {
        match self.try_load(theme_id).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                log::warn!(
                    "Icon theme '{}' unavailable [{}]: {}; using empty theme",
                    theme_id,
                    e.kind(),
                    e
                );
                IconThemeDescriptor::empty(theme_id)
            }
        }
    }

    pub async fn try_load(&self, theme_id: &str) -> Result<IconThemeDescriptor> {
        let registration = self.locate(theme_id).await?;
        let path = &registration.descriptor_path;

        log::debug!("Reading icon theme descriptor {:?}", path);
        let bytes = self.reader.read(path).await?;
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

        let document: ThemeDocument =
            serde_json::from_slice(body).map_err(|source| IconThemeError::MalformedDescriptor {
                path: path.clone(),
                source,
            })?;

        Ok(IconThemeDescriptor::from_document(
            registration.id.clone(),
            registration.asset_root(),
            document,
        ))
    }

    async fn locate(&self, theme_id: &str) -> Result<ThemeRegistration> {
        if let Some(found) = self.provider.find(theme_id).await {
            return Ok(found);
        }

        if theme_id != self.fallback_theme {
            log::warn!(
                "Icon theme '{}' is not installed, trying built-in '{}'",
                theme_id,
                self.fallback_theme
            );
            if let Some(found) = self.provider.find(&self.fallback_theme).await {
                return Ok(found);
            }
        }

        Err(IconThemeError::ThemeNotFound(theme_id.to_string()))
    }
}

//! Core types for the icon theme engine

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// MIME type reported for `.svg` assets
pub const SVG_MIME: &str = "image/svg+xml";

/// MIME type reported for every other asset
pub const RASTER_MIME: &str = "image/png";

/// Icon-definition id picked by the resolver, `None` when nothing matched
pub type ResolvedIconId = Option<String>;

/// Theme document as written by the theme author.
///
/// Every section is optional. Sections of the wrong shape and individual entries with
/// non-string values are dropped instead of failing the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeDocument {
    #[serde(deserialize_with = "lenient_definitions")]
    pub icon_definitions: HashMap<String, RawIconDefinition>,
    #[serde(deserialize_with = "lenient_string")]
    pub file: Option<String>,
    #[serde(deserialize_with = "lenient_string_map")]
    pub file_names: HashMap<String, String>,
    #[serde(deserialize_with = "lenient_string_map")]
    pub file_extensions: HashMap<String, String>,
    #[serde(deserialize_with = "lenient_string_map")]
    pub language_ids: HashMap<String, String>,
}

/// One `iconDefinitions` entry before interpretation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawIconDefinition {
    #[serde(alias = "assetPath")]
    pub icon_path: Option<String>,
    pub font_character: Option<String>,
    pub font_color: Option<String>,
}

/// Interpreted icon definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconDefinition {
    /// Font glyph, rendered without touching the filesystem
    Glyph {
        character: String,
        color: Option<String>,
    },
    /// Image asset, path relative to the theme root as written by the author
    Asset { path: String },
    /// Neither a glyph nor a path
    Empty,
}

impl From<RawIconDefinition> for IconDefinition {
    fn from(raw: RawIconDefinition) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.is_empty());

        if let Some(character) = non_empty(raw.font_character) {
            return IconDefinition::Glyph {
                character: decode_font_character(&character),
                color: non_empty(raw.font_color),
            };
        }
        match non_empty(raw.icon_path) {
            Some(path) => IconDefinition::Asset { path },
            None => IconDefinition::Empty,
        }
    }
}

/// Decode the `"\E001"` escape convention used by theme authors.
///
/// Anything that is not a backslash followed by a valid code point in hex is returned
/// unchanged.
pub fn decode_font_character(raw: &str) -> String {
    raw.strip_prefix('\\')
        .filter(|hex| !hex.is_empty() && hex.len() <= 6)
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| raw.to_string())
}

/// Parsed theme, immutable once built.
///
/// A theme change produces a new descriptor; the previous one stays valid for readers
/// still holding it.
#[derive(Debug, Clone, Default)]
pub struct IconThemeDescriptor {
    /// Theme id the descriptor was loaded for
    pub theme_id: String,
    /// Directory relative asset paths are resolved against
    pub root_dir: PathBuf,
    /// Default file icon id declared by the theme itself
    pub default_file: Option<String>,
    pub file_names: HashMap<String, String>,
    pub file_extensions: HashMap<String, String>,
    pub language_ids: HashMap<String, String>,
    pub icon_definitions: HashMap<String, IconDefinition>,
}

impl IconThemeDescriptor {
    /// Descriptor with every map empty; all resolutions fall back
    pub fn empty(theme_id: impl Into<String>) -> Self {
        Self {
            theme_id: theme_id.into(),
            ..Self::default()
        }
    }

    /// Interpret a parsed document
    pub fn from_document(
        theme_id: impl Into<String>,
        root_dir: impl Into<PathBuf>,
        document: ThemeDocument,
    ) -> Self {
        Self {
            theme_id: theme_id.into(),
            root_dir: root_dir.into(),
            default_file: document.file,
            file_names: document.file_names,
            file_extensions: document.file_extensions,
            language_ids: document.language_ids,
            icon_definitions: document
                .icon_definitions
                .into_iter()
                .map(|(id, raw)| (id, IconDefinition::from(raw)))
                .collect(),
        }
    }

    pub fn definition(&self, id: &str) -> Option<&IconDefinition> {
        self.icon_definitions.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.icon_definitions.is_empty()
            && self.file_names.is_empty()
            && self.file_extensions.is_empty()
            && self.language_ids.is_empty()
    }
}

/// Key into one of the three lookup tables, always lowercased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Name(String),
    Extension(String),
    Language(String),
}

impl LookupKey {
    pub fn name(value: &str) -> Self {
        LookupKey::Name(value.to_lowercase())
    }

    pub fn extension(value: &str) -> Self {
        LookupKey::Extension(value.to_lowercase())
    }

    pub fn language(value: &str) -> Self {
        LookupKey::Language(value.to_lowercase())
    }
}

/// Cache key shared by the path and result tiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub file_name: String,
    pub language_id: String,
}

impl CacheKey {
    pub fn new(file_name: &str, language_id: Option<&str>) -> Self {
        Self {
            file_name: file_name.to_lowercase(),
            language_id: language_id.map(str::to_lowercase).unwrap_or_default(),
        }
    }
}

/// Renderer-ready icon. Cheap to clone and safe to share between consumers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderedIcon {
    /// Asset bytes, base64 encoded
    ImageDataUri {
        mime_type: &'static str,
        base64_payload: Arc<str>,
    },
    /// Font glyph and optional color
    FontGlyph {
        character: Arc<str>,
        color: Option<Arc<str>>,
    },
    /// Nothing resolved, or the asset could not be read
    Fallback,
}

impl RenderedIcon {
    pub fn glyph(character: &str, color: Option<&str>) -> Self {
        RenderedIcon::FontGlyph {
            character: Arc::from(character),
            color: color.map(Arc::from),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RenderedIcon::Fallback)
    }

    /// `data:` URI for image icons, usable as an inline image source
    pub fn data_uri(&self) -> Option<String> {
        match self {
            RenderedIcon::ImageDataUri {
                mime_type,
                base64_payload,
            } => Some(format!("data:{};base64,{}", mime_type, base64_payload)),
            _ => None,
        }
    }

    /// CSS `content` value for glyph icons, e.g. `"\e001"`
    pub fn css_content(&self) -> Option<String> {
        match self {
            RenderedIcon::FontGlyph { character, .. } => {
                let escaped: String = character
                    .chars()
                    .map(|c| format!("\\{:x}", c as u32))
                    .collect();
                Some(format!("\"{}\"", escaped))
            }
            _ => None,
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            RenderedIcon::FontGlyph { color, .. } => color.as_deref(),
            _ => None,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(id) => Some((key, id)),
            other => {
                log::trace!("Skipping non-string theme entry {:?}: {}", key, other);
                None
            }
        })
        .collect())
}

fn lenient_definitions<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, RawIconDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value(value) {
            Ok(definition) => Some((id, definition)),
            Err(e) => {
                log::trace!("Skipping icon definition {:?}: {}", id, e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_missing_sections_default_empty() {
        let doc: ThemeDocument = serde_json::from_str(r#"{ "fileNames": { "license": "_lic" } }"#).unwrap();
        assert_eq!(doc.file_names.get("license").map(String::as_str), Some("_lic"));
        assert!(doc.file_extensions.is_empty());
        assert!(doc.language_ids.is_empty());
        assert!(doc.icon_definitions.is_empty());
        assert!(doc.file.is_none());
    }

    #[test]
    fn test_document_drops_badly_typed_entries() {
        let doc: ThemeDocument = serde_json::from_str(
            r#"{
                "fileExtensions": { "ts": "_ts", "bad": 42 },
                "languageIds": [],
                "iconDefinitions": { "_ts": { "iconPath": "./ts.svg" }, "_odd": 7 }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.file_extensions.len(), 1);
        assert!(doc.language_ids.is_empty());
        assert_eq!(doc.icon_definitions.len(), 1);
    }

    #[test]
    fn test_definition_prefers_font_character() {
        let raw = RawIconDefinition {
            icon_path: Some("./a.svg".to_string()),
            font_character: Some("\u{E001}".to_string()),
            font_color: Some("#ffffff".to_string()),
        };
        assert_eq!(
            IconDefinition::from(raw),
            IconDefinition::Glyph {
                character: "\u{E001}".to_string(),
                color: Some("#ffffff".to_string()),
            }
        );
    }

    #[test]
    fn test_asset_path_alias() {
        let raw: RawIconDefinition = serde_json::from_str(r#"{ "assetPath": "icons/a.png" }"#).unwrap();
        assert_eq!(
            IconDefinition::from(raw),
            IconDefinition::Asset { path: "icons/a.png".to_string() }
        );
        assert_eq!(IconDefinition::from(RawIconDefinition::default()), IconDefinition::Empty);
    }

    #[test]
    fn test_decode_font_character() {
        assert_eq!(decode_font_character("\\E001"), "\u{E001}");
        assert_eq!(decode_font_character("\\e60b"), "\u{E60B}");
        assert_eq!(decode_font_character("\u{E001}"), "\u{E001}");
        assert_eq!(decode_font_character("\\zz"), "\\zz");
        assert_eq!(decode_font_character("\\"), "\\");
    }

    #[test]
    fn test_lookup_keys_are_lowercased() {
        assert_eq!(LookupKey::name("LICENSE"), LookupKey::Name("license".to_string()));
        assert_eq!(LookupKey::extension("D.TS"), LookupKey::Extension("d.ts".to_string()));
        assert_eq!(
            CacheKey::new("App.TS", Some("TypeScript")),
            CacheKey::new("app.ts", Some("typescript"))
        );
        assert_eq!(CacheKey::new("a", None).language_id, "");
    }

    #[test]
    fn test_rendered_icon_helpers() {
        let image = RenderedIcon::ImageDataUri {
            mime_type: SVG_MIME,
            base64_payload: Arc::from("PHN2Zy8+"),
        };
        assert_eq!(image.data_uri().as_deref(), Some("data:image/svg+xml;base64,PHN2Zy8+"));
        assert!(image.css_content().is_none());

        let glyph = RenderedIcon::glyph("\u{E001}", Some("#519aba"));
        assert_eq!(glyph.css_content().as_deref(), Some("\"\\e001\""));
        assert_eq!(glyph.color(), Some("#519aba"));
        assert!(!glyph.is_fallback());
        assert!(RenderedIcon::Fallback.is_fallback());
    }
}

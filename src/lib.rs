#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! Icon resolution and caching for editor tab strips.
//!
//! Given a file name (and optionally a language id) the engine determines which icon the
//! active, externally-authored icon theme assigns to it and turns that into something a
//! renderer can embed directly: a base64 data URI or a font glyph.

pub mod types;
pub mod utils;

pub mod services;

pub use types::{EngineStats, Timer};

pub use services::icon_theme::{
    AssetReader, ExtensionDirProvider, FsAssetReader, IconDefinition, IconThemeConfig,
    IconThemeDescriptor, IconThemeError, IconThemeService, LookupKey, LookupTable, PreloadReport,
    RenderedIcon, ResolvedIconId, StaticThemeProvider, ThemeLoader, ThemeProvider, ThemeState,
    ThemeRegistration,
};

/// Install the default `env_logger` backend.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

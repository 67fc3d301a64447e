pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod index;
pub mod languages;
pub mod loader;
pub mod processing;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{IconThemeService, PreloadReport, ThemeState};
pub use config::IconThemeConfig;
pub use discovery::{ExtensionDirProvider, StaticThemeProvider, ThemeProvider, ThemeRegistration};
pub use error::{IconThemeError, Result};
pub use index::LookupTable;
pub use loader::ThemeLoader;
pub use processing::{AssetReader, FsAssetReader};
pub use types::{
    CacheKey, IconDefinition, IconThemeDescriptor, LookupKey, RenderedIcon, ResolvedIconId,
};

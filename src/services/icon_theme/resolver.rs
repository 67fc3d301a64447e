//! Priority chain mapping a file to an icon-definition id
//!
//! Each step is a plain function over the lookup table; the first one to return an id
//! wins. Specific signals (exact name, compound extension) come before generic ones
//! (inferred language, default file icon).

use super::{
    index::LookupTable,
    languages::{self, IGNORE_EXTENSION, IGNORE_FILE_NAME, IGNORE_LANGUAGE, IGNORE_SUFFIX},
    types::{LookupKey, ResolvedIconId},
};

/// Normalized resolver input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    /// Lowercased file name
    pub name: String,
    /// Lowercased language id supplied by the caller
    pub language: Option<String>,
}

impl FileQuery {
    pub fn new(file_name: &str, language_id: Option<&str>) -> Self {
        Self {
            name: file_name.to_lowercase(),
            language: language_id
                .map(str::to_lowercase)
                .filter(|lang| !lang.is_empty()),
        }
    }

    /// Everything after the first dot, only when the name has more than one dot
    pub fn compound_extension(&self) -> Option<&str> {
        if self.name.matches('.').count() < 2 {
            return None;
        }
        self.name
            .split_once('.')
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.is_empty())
    }

    /// Everything after the last dot
    pub fn simple_extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// One step of the chain
pub struct Strategy {
    pub name: &'static str,
    pub probe: fn(&LookupTable, &FileQuery) -> Option<String>,
}

/// The chain, in priority order
pub const STRATEGIES: &[Strategy] = &[
    Strategy { name: "file-name", probe: by_file_name },
    Strategy { name: "compound-extension", probe: by_compound_extension },
    Strategy { name: "extension", probe: by_extension },
    Strategy { name: "language", probe: by_language },
    Strategy { name: "ignore-file", probe: by_ignore_suffix },
    Strategy { name: "inferred-language", probe: by_inferred_language },
    Strategy { name: "script-family", probe: by_script_family },
    Strategy { name: "default-file", probe: by_default_file },
];

/// Run the chain; `None` means the renderer should fall back
pub fn resolve(table: &LookupTable, file_name: &str, language_id: Option<&str>) -> ResolvedIconId {
    let query = FileQuery::new(file_name, language_id);

    for strategy in STRATEGIES {
        if let Some(id) = (strategy.probe)(table, &query) {
            log::trace!("'{}' resolved to '{}' by {}", file_name, id, strategy.name);
            return Some(id);
        }
    }

    log::debug!("No icon for '{}' (language {:?})", file_name, language_id);
    None
}

fn lookup(table: &LookupTable, key: LookupKey) -> Option<String> {
    table.get(&key).map(str::to_string)
}

fn by_file_name(table: &LookupTable, query: &FileQuery) -> Option<String> {
    lookup(table, LookupKey::Name(query.name.clone()))
}

fn by_compound_extension(table: &LookupTable, query: &FileQuery) -> Option<String> {
    let ext = query.compound_extension()?;
    lookup(table, LookupKey::Extension(ext.to_string()))
}

fn by_extension(table: &LookupTable, query: &FileQuery) -> Option<String> {
    let ext = query.simple_extension()?;
    lookup(table, LookupKey::Extension(ext.to_string()))
}

fn by_language(table: &LookupTable, query: &FileQuery) -> Option<String> {
    let language = query.language.as_ref()?;
    lookup(table, LookupKey::Language(language.clone()))
}

fn by_ignore_suffix(table: &LookupTable, query: &FileQuery) -> Option<String> {
    if !query.name.ends_with(IGNORE_SUFFIX) {
        return None;
    }
    lookup(table, LookupKey::Name(IGNORE_FILE_NAME.to_string()))
        .or_else(|| lookup(table, LookupKey::Language(IGNORE_LANGUAGE.to_string())))
        .or_else(|| lookup(table, LookupKey::Extension(IGNORE_EXTENSION.to_string())))
}

fn by_inferred_language(table: &LookupTable, query: &FileQuery) -> Option<String> {
    if query.language.is_some() {
        return None;
    }
    let language = languages::infer_language(query.simple_extension()?)?;
    lookup(table, LookupKey::Language(language.to_string()))
}

fn by_script_family(table: &LookupTable, query: &FileQuery) -> Option<String> {
    let family = languages::script_family(query.simple_extension()?)?;

    let by_language = family
        .languages
        .iter()
        .map(|lang| LookupKey::Language(lang.to_string()));
    let by_extension = family
        .extensions
        .iter()
        .map(|ext| LookupKey::Extension(ext.to_string()));

    by_language
        .chain(by_extension)
        .find_map(|key| lookup(table, key))
}

fn by_default_file(table: &LookupTable, _query: &FileQuery) -> Option<String> {
    table.default_file().map(str::to_string)
}

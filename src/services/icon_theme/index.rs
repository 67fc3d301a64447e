//! Case-insensitive lookup tables compiled from a theme descriptor

use std::collections::HashMap;
use ahash::AHashMap;

use super::types::{IconThemeDescriptor, LookupKey};

/// Conventional ids for the generic file icon, tried in order
const CONVENTIONAL_FILE_IDS: [&str; 2] = ["file", "_file"];

/// Indexed form of a theme's name, extension and language maps.
///
/// All keys are lowercased. The generic default file icon is picked once at build time.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    file_names: AHashMap<String, String>,
    file_extensions: AHashMap<String, String>,
    language_ids: AHashMap<String, String>,
    default_file: Option<String>,
}

impl LookupTable {
    /// Compile `descriptor` from scratch
    pub fn build(descriptor: &IconThemeDescriptor) -> Self {
        Self {
            file_names: lowercase_keys(&descriptor.file_names),
            file_extensions: lowercase_keys(&descriptor.file_extensions),
            language_ids: lowercase_keys(&descriptor.language_ids),
            default_file: pick_default_file(descriptor),
        }
    }

    pub fn get(&self, key: &LookupKey) -> Option<&str> {
        let found = match key {
            LookupKey::Name(name) => self.file_names.get(name),
            LookupKey::Extension(ext) => self.file_extensions.get(ext),
            LookupKey::Language(lang) => self.language_ids.get(lang),
        };
        found.map(String::as_str)
    }

    /// Generic file icon id, if the theme has one
    pub fn default_file(&self) -> Option<&str> {
        self.default_file.as_deref()
    }

    pub fn len(&self) -> usize {
        self.file_names.len() + self.file_extensions.len() + self.language_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.default_file.is_none()
    }
}

/// On a case collision the key that was already lowercase wins
fn lowercase_keys(source: &HashMap<String, String>) -> AHashMap<String, String> {
    let mut table = AHashMap::with_capacity(source.len());
    for (key, id) in source {
        let folded = key.to_lowercase();
        if &folded == key {
            table.insert(folded, id.clone());
        } else {
            table.entry(folded).or_insert_with(|| id.clone());
        }
    }
    table
}

fn pick_default_file(descriptor: &IconThemeDescriptor) -> Option<String> {
    let defs = &descriptor.icon_definitions;

    if let Some(declared) = descriptor.default_file.as_ref().filter(|id| defs.contains_key(*id)) {
        return Some(declared.clone());
    }

    if let Some(conventional) = CONVENTIONAL_FILE_IDS.iter().find(|id| defs.contains_key(**id)) {
        return Some(conventional.to_string());
    }

    let mut candidates: Vec<&String> = defs
        .keys()
        .filter(|id| {
            let id = id.to_lowercase();
            id.contains("file") && !id.contains("folder")
        })
        .collect();
    candidates.sort();
    candidates.first().map(|id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::types::IconDefinition;

    fn descriptor() -> IconThemeDescriptor {
        let mut d = IconThemeDescriptor::empty("t");
        d.file_names.insert("LICENSE".into(), "_license".into());
        d.file_extensions.insert("TS".into(), "_ts".into());
        d.file_extensions.insert("d.ts".into(), "_dts".into());
        d.language_ids.insert("TypeScript".into(), "_ts_lang".into());
        d
    }

    fn define(d: &mut IconThemeDescriptor, id: &str) {
        d.icon_definitions.insert(id.to_string(), IconDefinition::Asset { path: format!("{}.svg", id) });
    }

    #[test]
    fn test_keys_are_lowercased() {
        let table = LookupTable::build(&descriptor());
        assert_eq!(table.get(&LookupKey::name("license")), Some("_license"));
        assert_eq!(table.get(&LookupKey::name("License")), Some("_license"));
        assert_eq!(table.get(&LookupKey::extension("ts")), Some("_ts"));
        assert_eq!(table.get(&LookupKey::extension("D.TS")), Some("_dts"));
        assert_eq!(table.get(&LookupKey::language("typescript")), Some("_ts_lang"));
        assert_eq!(table.get(&LookupKey::language("rust")), None);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_lowercase_key_wins_collision() {
        let mut d = IconThemeDescriptor::empty("t");
        d.file_names.insert("Makefile".into(), "_upper".into());
        d.file_names.insert("makefile".into(), "_lower".into());
        let table = LookupTable::build(&d);
        assert_eq!(table.get(&LookupKey::name("MAKEFILE")), Some("_lower"));
    }

    #[test]
    fn test_default_file_prefers_declared_id() {
        let mut d = descriptor();
        define(&mut d, "_default");
        define(&mut d, "file");
        d.default_file = Some("_default".into());
        assert_eq!(LookupTable::build(&d).default_file(), Some("_default"));

        d.default_file = Some("_undeclared".into());
        assert_eq!(LookupTable::build(&d).default_file(), Some("file"));
    }

    #[test]
    fn test_default_file_token_scan() {
        let mut d = descriptor();
        define(&mut d, "_folder_file_open");
        define(&mut d, "_text_file");
        define(&mut d, "_generic_file");
        assert_eq!(LookupTable::build(&d).default_file(), Some("_generic_file"));
    }

    #[test]
    fn test_default_file_absent() {
        let mut d = descriptor();
        define(&mut d, "_folder");
        define(&mut d, "_ts");
        assert_eq!(LookupTable::build(&d).default_file(), None);
        assert!(LookupTable::build(&IconThemeDescriptor::empty("e")).is_empty());
    }
}

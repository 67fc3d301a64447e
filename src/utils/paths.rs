use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Rewrite the forward slashes theme authors use into the platform separator.
///
/// Returns the input unchanged where `/` already is the separator.
pub fn to_platform_separators(raw: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        raw.to_string()
    } else {
        raw.replace('/', &MAIN_SEPARATOR.to_string())
    }
}

/// Resolve `relative` against `base` without touching the filesystem.
///
/// Absolute inputs win over `base`, `.` segments are dropped and `..` pops a segment,
/// never climbing above the root.
pub fn lexical_resolve(base: &Path, relative: &Path) -> PathBuf {
    let joined = if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        base.join(relative)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    resolved.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if !at_root {
                    resolved.pop();
                }
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_resolve_drops_current_dir() {
        let base = Path::new("/themes/seti");
        let resolved = lexical_resolve(base, Path::new("./icons/ts.svg"));
        assert_eq!(resolved, PathBuf::from("/themes/seti/icons/ts.svg"));
    }

    #[test]
    fn test_lexical_resolve_parent_segments() {
        let base = Path::new("/themes/seti/json");
        let resolved = lexical_resolve(base, Path::new("../icons/ts.svg"));
        assert_eq!(resolved, PathBuf::from("/themes/seti/icons/ts.svg"));
    }

    #[test]
    fn test_lexical_resolve_stops_at_root() {
        let resolved = lexical_resolve(Path::new("/a"), Path::new("../../../b.svg"));
        assert_eq!(resolved, PathBuf::from("/b.svg"));
    }

    #[test]
    fn test_lexical_resolve_absolute_input() {
        let resolved = lexical_resolve(Path::new("/themes"), Path::new("/abs/icon.png"));
        assert_eq!(resolved, PathBuf::from("/abs/icon.png"));
    }

    #[cfg(unix)]
    #[test]
    fn test_separators_untouched_on_unix() {
        assert_eq!(to_platform_separators("./icons/a.svg"), "./icons/a.svg");
    }

    #[cfg(windows)]
    #[test]
    fn test_separators_translated_on_windows() {
        assert_eq!(to_platform_separators("./icons/a.svg"), ".\\icons\\a.svg");
    }
}

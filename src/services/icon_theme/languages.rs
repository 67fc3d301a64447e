//! Static knowledge about common file types used by the resolver fallbacks

/// Names ending with this are treated like `.gitignore`
pub const IGNORE_SUFFIX: &str = "ignore";

/// Keys probed for `*ignore` files: exact name, language id, extension
pub const IGNORE_FILE_NAME: &str = ".gitignore";
pub const IGNORE_LANGUAGE: &str = "ignore";
pub const IGNORE_EXTENSION: &str = "gitignore";

/// Language id for a lowercase file extension.
///
/// Covers script, markup, style, data and documentation files.
pub fn infer_language(extension: &str) -> Option<&'static str> {
    let language = match extension {
        // script
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescriptreact",
        "py" => "python",
        "rs" => "rust",
        "go" => "go",
        "sh" | "bash" => "shellscript",

        // markup
        "html" | "htm" => "html",
        "xml" | "svg" => "xml",
        "vue" => "vue",

        // style
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "less" => "less",

        // data
        "json" => "json",
        "jsonc" => "jsonc",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "csv" => "csv",

        // documentation
        "md" | "markdown" => "markdown",
        "mdx" => "mdx",
        "rst" => "restructuredtext",
        "txt" => "plaintext",

        _ => return None,
    };
    Some(language)
}

/// Candidate keys for the JavaScript/TypeScript family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyCandidates {
    /// Language ids, tried first
    pub languages: &'static [&'static str],
    /// Extensions, tried after the language ids
    pub extensions: &'static [&'static str],
}

/// Ordered probe list for script extensions whose themes often only map a sibling
pub fn script_family(extension: &str) -> Option<FamilyCandidates> {
    let candidates = match extension {
        "ts" | "mts" | "cts" => FamilyCandidates {
            languages: &["typescript", "javascript"],
            extensions: &["ts", "js"],
        },
        "tsx" => FamilyCandidates {
            languages: &["typescriptreact", "typescript", "javascriptreact"],
            extensions: &["tsx", "ts", "jsx"],
        },
        "js" | "mjs" | "cjs" => FamilyCandidates {
            languages: &["javascript"],
            extensions: &["js"],
        },
        "jsx" => FamilyCandidates {
            languages: &["javascriptreact", "javascript"],
            extensions: &["jsx", "js"],
        },
        _ => return None,
    };
    Some(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_language() {
        assert_eq!(infer_language("ts"), Some("typescript"));
        assert_eq!(infer_language("mjs"), Some("javascript"));
        assert_eq!(infer_language("scss"), Some("scss"));
        assert_eq!(infer_language("yml"), Some("yaml"));
        assert_eq!(infer_language("md"), Some("markdown"));
        assert_eq!(infer_language("htm"), Some("html"));
        assert_eq!(infer_language("exe"), None);
        assert_eq!(infer_language(""), None);
    }

    #[test]
    fn test_script_family() {
        let tsx = script_family("tsx").unwrap();
        assert_eq!(tsx.languages[0], "typescriptreact");
        assert_eq!(tsx.extensions, &["tsx", "ts", "jsx"]);
        assert!(script_family("py").is_none());
    }
}

//! Language-specific signature extractors and their registry.
//!
//! Each extractor implements [`LanguageParser`]: a pure `source -> FileSignature`
//! function that never fails. Two quality tiers exist:
//!
//! - **Structured** (Tree-sitter): [`python`], [`rust_lang`] — correct handling
//!   of multi-line signatures, decorators, and nested scopes.
//! - **Pattern** (regex): [`typescript`], [`go`] — cheaper to maintain, may
//!   miss unusual multi-line constructs.

pub mod go;
pub mod python;
pub mod rust_lang;
pub mod typescript;

use std::path::Path;

/// Sentinel stored in `module_doc` when an extractor cannot make sense of a file.
pub const PARSE_FAILURE_NOTE: &str = "_parse error_";

/// One discoverable symbol: a normalized one-line signature plus the first
/// line of its doc comment, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportItem {
    pub signature: String,
    pub docstring: Option<String>,
}

impl ExportItem {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            docstring: None,
        }
    }

    pub fn with_doc(signature: impl Into<String>, docstring: Option<String>) -> Self {
        Self {
            signature: signature.into(),
            docstring,
        }
    }
}

/// Normalized extraction result for one source file.
///
/// `exports` preserves order of appearance in the source; `imports` holds
/// deduplicated external package names (sorted, never relative paths);
/// intra-project references go to `internal_deps`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSignature {
    pub exports: Vec<ExportItem>,
    pub imports: Vec<String>,
    pub module_doc: Option<String>,
    pub internal_deps: Vec<String>,
}

impl FileSignature {
    /// Result returned when a file cannot be parsed at all. Callers render
    /// the sentinel inline so the failure stays visible in the report.
    pub fn parse_failure() -> Self {
        Self {
            module_doc: Some(PARSE_FAILURE_NOTE.to_string()),
            ..Self::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.module_doc.as_deref() == Some(PARSE_FAILURE_NOTE)
    }

    /// Flattened signature strings, in export order. This is what the
    /// metadata store persists and the search index is rebuilt from.
    pub fn symbol_strings(&self) -> Vec<String> {
        self.exports.iter().map(|e| e.signature.clone()).collect()
    }
}

/// Contract every language extractor implements.
///
/// `parse` must not panic or error for any input; unrecoverable syntactic
/// failure yields [`FileSignature::parse_failure`].
pub trait LanguageParser {
    fn language_name(&self) -> &'static str;

    /// Lowercase extensions without the leading dot (e.g. `["py", "pyi"]`).
    fn extensions(&self) -> &'static [&'static str];

    fn parse(&self, source: &str) -> FileSignature;
}

/// Ordered extractor registry. First-registered wins on extension collision;
/// files with no matching extension are excluded from indexing entirely.
///
/// Constructed once at startup and passed by reference — there is no global
/// parser list.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: Vec<Box<dyn LanguageParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all built-in extractors, in the priority order the
    /// indexer ships with.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(typescript::TypeScriptParser::new()));
        registry.register(Box::new(python::PythonParser));
        registry.register(Box::new(go::GoParser::new()));
        registry.register(Box::new(rust_lang::RustParser));
        registry
    }

    pub fn register(&mut self, parser: Box<dyn LanguageParser>) {
        self.parsers.push(parser);
    }

    /// Pure extension lookup, O(registered parsers).
    pub fn resolve(&self, path: &Path) -> Option<&dyn LanguageParser> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.parsers
            .iter()
            .find(|p| p.extensions().contains(&ext.as_str()))
            .map(|p| p.as_ref())
    }

    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = self
            .parsers
            .iter()
            .flat_map(|p| p.extensions().iter().copied())
            .collect();
        exts.sort_unstable();
        exts.dedup();
        exts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_extension() {
        let registry = ParserRegistry::with_defaults();

        let parser = registry.resolve(Path::new("/tmp/app.py"));
        assert_eq!(parser.map(|p| p.language_name()), Some("Python"));

        let parser = registry.resolve(Path::new("/tmp/app.TSX"));
        assert_eq!(
            parser.map(|p| p.language_name()),
            Some("TypeScript/JavaScript")
        );

        assert!(registry.resolve(Path::new("/tmp/readme.txt")).is_none());
        assert!(registry.resolve(Path::new("/tmp/no_extension")).is_none());
    }

    #[test]
    fn test_first_registered_wins() {
        struct Fake;
        impl LanguageParser for Fake {
            fn language_name(&self) -> &'static str {
                "Fake"
            }
            fn extensions(&self) -> &'static [&'static str] {
                &["py"]
            }
            fn parse(&self, _source: &str) -> FileSignature {
                FileSignature::default()
            }
        }

        let mut registry = ParserRegistry::new();
        registry.register(Box::new(Fake));
        registry.register(Box::new(python::PythonParser));

        let parser = registry.resolve(Path::new("x.py")).unwrap();
        assert_eq!(parser.language_name(), "Fake");
    }

    #[test]
    fn test_supported_extensions_deduplicated() {
        let exts = ParserRegistry::with_defaults().supported_extensions();
        assert!(exts.contains(&"py"));
        assert!(exts.contains(&"ts"));
        assert!(exts.contains(&"go"));
        assert!(exts.contains(&"rs"));
        let mut sorted = exts.clone();
        sorted.dedup();
        assert_eq!(exts, sorted);
    }

    #[test]
    fn test_parse_failure_sentinel() {
        let sig = FileSignature::parse_failure();
        assert!(sig.is_failure());
        assert!(sig.exports.is_empty());
        assert!(sig.imports.is_empty());
        assert!(!FileSignature::default().is_failure());
    }
}

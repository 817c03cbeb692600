//! Directory report assembly and markdown rendering.
//!
//! A directory report is one markdown document with a rendered block per
//! source file, blocks separated by the chunker's section separator. This
//! module also writes the top-level `INDEX.md` navigation page.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::chunker::SECTION_SEPARATOR;
use crate::parsers::{FileSignature, ParserRegistry};
use crate::store::StoreStats;
use crate::purpose;

/// Assembled output for one directory.
pub struct DirectoryReport {
    pub content: String,
    /// Per-file symbol lists, keyed by normalized absolute path. Files that
    /// could not be read do not appear here (no record update for them).
    pub file_symbols: Vec<(String, Vec<String>)>,
    pub errors: usize,
}

impl DirectoryReport {
    pub fn symbol_count(&self) -> usize {
        self.file_symbols.iter().map(|(_, s)| s.len()).sum()
    }
}

/// Build the markdown report for one directory and collect its symbols.
///
/// A parse failure for one file produces a visible placeholder block and
/// does not abort the rest of the directory; an unreadable file is skipped
/// entirely so the next run retries it.
pub fn build_directory_report(
    rel_dir: &str,
    files: &[PathBuf],
    root: &Path,
    registry: &ParserRegistry,
    dense: bool,
) -> DirectoryReport {
    let mut sections = Vec::new();
    let mut file_symbols = Vec::new();
    let mut errors = 0;

    let dir_name = if rel_dir.is_empty() {
        "Root Directory"
    } else {
        rel_dir
    };
    let file_names: Vec<String> = files
        .iter()
        .filter_map(|f| f.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();

    let mut header = format!("# {dir_name}\n\n");
    header.push_str(&format!("> {}\n\n", purpose::infer(rel_dir, &file_names)));
    header.push_str("## Files\n");

    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });

    for file in sorted {
        let Some(parser) = registry.resolve(file) else {
            continue;
        };
        let rel_path = file
            .strip_prefix(root)
            .unwrap_or(file)
            .to_string_lossy()
            .replace('\\', "/");

        let mut block = String::new();
        if dense {
            block.push_str(&format!("### {rel_path}\n"));
        } else {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| rel_path.clone());
            block.push_str(&format!("### {name}\n"));
            block.push_str(&format!("**Path**: `{rel_path}`\n"));
            block.push_str(&format!("**Language**: {}\n\n", parser.language_name()));
        }

        match std::fs::read(file) {
            Ok(bytes) => {
                let source = String::from_utf8_lossy(&bytes);
                let signature = parser.parse(&source);
                if signature.is_failure() {
                    errors += 1;
                }
                block.push_str(&render_signature(&signature, dense));

                let key = file.to_string_lossy().replace('\\', "/");
                file_symbols.push((key, signature.symbol_strings()));
            }
            Err(e) => {
                // Read failure: visible in the report, but no record update,
                // so needs_reindex re-attempts the file next run.
                warn!("failed to read {}: {e}", file.display());
                block.push_str("_Error reading file: skipped this run_\n");
                errors += 1;
            }
        }

        sections.push(block);
    }

    let mut content = header;
    for section in sections {
        content.push('\n');
        content.push_str(&section);
        content.push_str(SECTION_SEPARATOR);
    }

    DirectoryReport {
        content,
        file_symbols,
        errors,
    }
}

/// Render one file's extracted signature as markdown.
pub fn render_signature(sig: &FileSignature, dense: bool) -> String {
    let mut lines = Vec::new();

    if let Some(doc) = &sig.module_doc {
        lines.push(format!("> {doc}"));
        lines.push(String::new());
    }

    if sig.exports.is_empty() {
        lines.push("_No exports detected_".to_string());
    } else if dense {
        for export in &sig.exports {
            lines.push(format!("`{}`", export.signature));
        }
    } else {
        lines.push("**Exports**:".to_string());
        for export in &sig.exports {
            match &export.docstring {
                Some(doc) => lines.push(format!("- `{}` — {doc}", export.signature)),
                None => lines.push(format!("- `{}`", export.signature)),
            }
        }
    }

    if !sig.imports.is_empty() {
        lines.push(String::new());
        let shown: Vec<String> = sig.imports.iter().take(5).map(|i| format!("`{i}`")).collect();
        let mut deps = format!("**Dependencies**: {}", shown.join(", "));
        if sig.imports.len() > 5 {
            deps.push_str(&format!(" _(+{} more)_", sig.imports.len() - 5));
        }
        lines.push(deps);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Filesystem-safe artifact base name for a directory.
pub fn artifact_base_name(rel_dir: &str) -> String {
    if rel_dir.is_empty() {
        "root".to_string()
    } else {
        rel_dir.replace(['/', '\\'], "_")
    }
}

/// Write the top-level `INDEX.md`: project info, usage notes, directory
/// tree, and links to every per-directory artifact.
pub fn write_main_index(
    root: &Path,
    index_dir: &Path,
    project_type: &str,
    tech_stack: &[String],
    stats: &StoreStats,
    tree: &str,
) -> io::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut lines = vec![
        format!("# Project Index: {project_name}"),
        String::new(),
        "## Project Information".to_string(),
        format!("- **Type**: {project_type}"),
        format!(
            "- **Tech Stack**: {}",
            if tech_stack.is_empty() {
                "Unknown".to_string()
            } else {
                tech_stack.join(", ")
            }
        ),
        format!("- **Total Files**: {}", stats.file_count),
        format!("- **Total Symbols**: {}", stats.symbol_count),
        format!("- **Generated**: {timestamp}"),
        String::new(),
        "## How to Use This Index".to_string(),
        String::new(),
        "1. Start with this page to understand the project structure".to_string(),
        "2. Open a directory page below for per-file export summaries".to_string(),
        "3. Use `--search` to find a symbol across the whole codebase".to_string(),
        String::new(),
        "## Directory Structure".to_string(),
        String::new(),
        "```".to_string(),
        tree.to_string(),
        "```".to_string(),
        String::new(),
        "## Directory Index Navigation".to_string(),
        String::new(),
    ];

    // Deterministic navigation: sorted artifact names.
    let directories_dir = index_dir.join("directories");
    let mut artifacts = BTreeMap::new();
    if directories_dir.is_dir() {
        for entry in std::fs::read_dir(&directories_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("md") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    artifacts.insert(stem.to_string(), format!("directories/{stem}.md"));
                }
            }
        }
    }
    for (name, rel) in &artifacts {
        lines.push(format!("- [{name}]({rel})"));
    }
    lines.push(String::new());

    std::fs::write(index_dir.join("INDEX.md"), lines.join("\n"))
}

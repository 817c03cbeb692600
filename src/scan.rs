//! Source file discovery.
//!
//! Walks the project root honoring `.gitignore`, filters to extensions the
//! parser registry supports, and groups results by directory so reports can
//! be produced one directory at a time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::parsers::ParserRegistry;
use crate::tree::SKIP_DIRS;

/// Walk `root` and collect parseable files grouped by their directory
/// relative to `root` (forward slashes, `""` for the root itself).
///
/// The output directory is never descended into, so a previous run's
/// artifacts are not indexed as project sources. Both the directory keys
/// and the file lists come back sorted, so iteration order is stable across
/// runs on an unchanged tree.
pub fn collect_source_files(
    root: &Path,
    registry: &ParserRegistry,
    output_dir: &str,
) -> BTreeMap<String, Vec<PathBuf>> {
    let output_name = output_dir.to_string();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_some_and(|t| t.is_dir()) {
                !SKIP_DIRS.contains(&name.as_ref()) && name != output_name
            } else {
                true
            }
        })
        .build();

    let mut grouped: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if registry.resolve(path).is_none() {
            continue;
        }

        let rel_dir = path
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();

        grouped.entry(rel_dir).or_default().push(path.to_path_buf());
    }

    for files in grouped.values_mut() {
        files.sort();
    }
    debug!("collected {} director(ies) of source files", grouped.len());
    grouped
}

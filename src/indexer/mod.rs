//! Index builder: orchestrates scanning, parsing, artifact writing, and
//! metadata bookkeeping for one run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::chunker;
use crate::config::Config;
use crate::error::IndexError;
use crate::parsers::ParserRegistry;
use crate::project;
use crate::report;
use crate::scan;
use crate::store::{DB_NAME, MetaStore};
use crate::tree;

/// How much existing state a run trusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// No prior index: process everything.
    Full,
    /// Trust stored fingerprints, reprocess only changed directories.
    Incremental,
    /// Prior index exists but fingerprints are ignored.
    Forced,
}

impl RunMode {
    /// Pick the mode from the CLI flags and the presence of a prior store.
    pub fn resolve(index_dir: &Path, update: bool, force: bool) -> Self {
        if force {
            RunMode::Forced
        } else if update && index_dir.join(DB_NAME).exists() {
            RunMode::Incremental
        } else {
            RunMode::Full
        }
    }
}

/// Counters reported after a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub files_indexed: usize,
    pub symbols_found: usize,
    pub errors: usize,
    pub dirs_skipped: usize,
    pub artifacts_written: usize,
    pub files_removed: usize,
}

/// One indexing run over a project root.
pub struct IndexBuilder {
    root: PathBuf,
    config: Config,
    registry: ParserRegistry,
    mode: RunMode,
    store: MetaStore,
}

impl IndexBuilder {
    pub fn new(root: PathBuf, config: Config, mode: RunMode) -> Result<Self, IndexError> {
        let store = MetaStore::open(root.join(&config.output_dir))?;
        Ok(Self {
            root,
            config,
            registry: ParserRegistry::with_defaults(),
            mode,
            store,
        })
    }

    pub fn index_dir(&self) -> PathBuf {
        self.root.join(&self.config.output_dir)
    }

    /// Execute the run. Parse failures are tolerated per file; store and
    /// artifact write failures abort the run.
    pub fn run(&mut self) -> Result<IndexStats, IndexError> {
        let index_dir = self.index_dir();
        let directories_dir = index_dir.join("directories");
        info!("indexing {} ({:?})", self.root.display(), self.mode);
        debug!(
            "registered extensions: {}",
            self.registry.supported_extensions().join(", ")
        );

        let info = project::detect(&self.root);
        self.store.set_project_type(&info.project_type)?;

        let grouped = scan::collect_source_files(&self.root, &self.registry, &self.config.output_dir);

        let mut stats = IndexStats::default();
        let mut current_paths: HashSet<String> = HashSet::new();

        for (rel_dir, files) in &grouped {
            for file in files {
                current_paths.insert(file.to_string_lossy().replace('\\', "/"));
            }

            if self.mode == RunMode::Incremental && !self.dir_changed(files)? {
                debug!("unchanged, skipping: {rel_dir:?}");
                stats.dirs_skipped += 1;
                continue;
            }

            let dir_report = report::build_directory_report(
                rel_dir,
                files,
                &self.root,
                &self.registry,
                self.config.dense,
            );
            stats.errors += dir_report.errors;
            stats.symbols_found += dir_report.symbol_count();

            let base = report::artifact_base_name(rel_dir);
            let written = chunker::write_chunked(
                &dir_report.content,
                &directories_dir,
                &base,
                self.config.max_chars_per_file,
            )?;
            stats.artifacts_written += written.len();

            // Files are associated with the first artifact holding this
            // directory's report; part lookups go through it.
            let artifact_id = written
                .first()
                .and_then(|p| p.strip_prefix(&index_dir).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_else(|| format!("directories/{base}.md"));

            for (path, symbols) in &dir_report.file_symbols {
                self.store.record_file(path, &artifact_id, symbols)?;
                stats.files_indexed += 1;
            }
        }

        // Drop records for files that no longer exist on disk.
        let deleted = self.store.deleted_files(&current_paths)?;
        stats.files_removed = deleted.len();
        self.store.cleanup(&deleted)?;

        let skip = vec![self.config.output_dir.clone()];
        let tree = tree::render(&self.root, self.config.tree_depth, &skip);
        report::write_main_index(
            &self.root,
            &index_dir,
            &info.project_type,
            &info.tech_stack,
            &self.store.stats()?,
            &tree,
        )?;

        self.store.touch_updated_at()?;
        info!(
            "indexed {} file(s), {} symbol(s), {} director(ies) unchanged",
            stats.files_indexed, stats.symbols_found, stats.dirs_skipped
        );
        Ok(stats)
    }

    /// Search the persisted index without touching artifacts.
    pub fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<crate::store::SearchHit>, IndexError> {
        Ok(self.store.search(query, limit)?)
    }

    /// A directory needs rebuilding when any of its files changed, appeared,
    /// or was never recorded. Deletions inside the directory are caught by
    /// the run-level GC, which also leaves the stale artifact to be rewritten
    /// on the next change.
    fn dir_changed(&self, files: &[PathBuf]) -> Result<bool, IndexError> {
        for file in files {
            let key = file.to_string_lossy().replace('\\', "/");
            if self.store.needs_reindex(&key)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_project() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(
            temp.path().join("main.py"),
            "\"\"\"Entry point.\"\"\"\n\ndef main():\n    pass\n",
        )
        .unwrap();
        fs::write(
            src.join("auth.ts"),
            "export function checkAuthToken(token: string): boolean {\n  return true;\n}\n",
        )
        .unwrap();
        temp
    }

    fn build(root: &Path, mode: RunMode) -> IndexBuilder {
        IndexBuilder::new(root.to_path_buf(), Config::default(), mode).unwrap()
    }

    #[test]
    fn test_full_run_writes_artifacts_and_records() {
        let temp = sample_project();
        let mut builder = build(temp.path(), RunMode::Full);
        let stats = builder.run().unwrap();

        assert_eq!(stats.files_indexed, 2);
        assert!(stats.symbols_found >= 2);
        assert_eq!(stats.errors, 0);

        let index_dir = temp.path().join("project-index");
        assert!(index_dir.join("INDEX.md").exists());
        assert!(index_dir.join("directories").join("root.md").exists());
        assert!(index_dir.join("directories").join("src.md").exists());

        let root_md = fs::read_to_string(index_dir.join("directories").join("root.md")).unwrap();
        assert!(root_md.contains("def main()"));
        assert!(root_md.contains("> Entry point."));
    }

    #[test]
    fn test_incremental_skips_unchanged() {
        let temp = sample_project();
        build(temp.path(), RunMode::Full).run().unwrap();

        let index_dir = temp.path().join("project-index");
        let mode = RunMode::resolve(&index_dir, true, false);
        assert_eq!(mode, RunMode::Incremental);

        let stats = build(temp.path(), mode).run().unwrap();
        assert_eq!(stats.files_indexed, 0);
        assert_eq!(stats.dirs_skipped, 2);

        // Touching one file reprocesses only its directory.
        fs::write(temp.path().join("main.py"), "def main():\n    pass\n\ndef extra():\n    pass\n")
            .unwrap();
        let stats = build(temp.path(), RunMode::Incremental).run().unwrap();
        assert_eq!(stats.files_indexed, 1);
        assert_eq!(stats.dirs_skipped, 1);
    }

    #[test]
    fn test_forced_ignores_fingerprints() {
        let temp = sample_project();
        build(temp.path(), RunMode::Full).run().unwrap();

        let stats = build(temp.path(), RunMode::Forced).run().unwrap();
        assert_eq!(stats.files_indexed, 2);
        assert_eq!(stats.dirs_skipped, 0);
    }

    #[test]
    fn test_deleted_file_garbage_collected() {
        let temp = sample_project();
        build(temp.path(), RunMode::Full).run().unwrap();

        fs::remove_file(temp.path().join("src").join("auth.ts")).unwrap();
        let stats = build(temp.path(), RunMode::Incremental).run().unwrap();
        assert_eq!(stats.files_removed, 1);

        let builder = build(temp.path(), RunMode::Incremental);
        assert!(builder.search("checkAuthToken", 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_after_index() {
        let temp = sample_project();
        let mut builder = build(temp.path(), RunMode::Full);
        builder.run().unwrap();

        let hits = builder.search("checkAuthToken", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].path.ends_with("auth.ts"));
        assert_eq!(hits[0].symbol, "checkAuthToken");
    }

    #[test]
    fn test_mode_resolution() {
        let temp = tempfile::tempdir().unwrap();
        // No prior store: --update falls back to a full run.
        assert_eq!(RunMode::resolve(temp.path(), true, false), RunMode::Full);
        assert_eq!(RunMode::resolve(temp.path(), false, false), RunMode::Full);
        assert_eq!(RunMode::resolve(temp.path(), true, true), RunMode::Forced);

        fs::write(temp.path().join(DB_NAME), "").unwrap();
        assert_eq!(
            RunMode::resolve(temp.path(), true, false),
            RunMode::Incremental
        );
    }
}

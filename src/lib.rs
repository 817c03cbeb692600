//! # codeatlas — Project Symbol Indexer
//!
//! Generates a browsable markdown index of a codebase: per-directory pages
//! listing each file's exported signatures, a top-level navigation page, and
//! a SQLite-backed symbol search with incremental re-indexing.
//!
//! ## Architecture
//!
//! - **[`parsers`]** — Per-language signature extraction (tree-sitter for
//!   Python and Rust, regex for TypeScript/JavaScript and Go)
//! - **[`store`]** — SQLite metadata store (fingerprints, symbols, search)
//! - **[`indexer`]** — Run orchestration: scan, parse, write, reconcile
//! - **[`report`]** — Markdown rendering of extracted signatures
//! - **[`chunker`]** — Section-boundary artifact splitting
//! - **[`scan`]** — Gitignore-aware source discovery
//! - **[`project`]** — Project type and tech stack detection
//! - **[`config`]** — Configuration loading and validation

pub mod chunker;
pub mod config;
pub mod error;
pub mod indexer;
pub mod parsers;
pub mod project;
pub mod purpose;
pub mod report;
pub mod scan;
pub mod store;
pub mod tree;

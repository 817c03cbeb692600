use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use codeatlas::config::Config;
use codeatlas::indexer::{IndexBuilder, RunMode};
use codeatlas::tree;

/// Generate a browsable markdown index of a codebase.
#[derive(Parser, Debug)]
#[command(name = "codeatlas", version, about)]
struct Cli {
    /// Project root to index.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Config file path (JSON).
    #[arg(short, long, default_value = "")]
    config: String,

    /// Output directory name, relative to the project root.
    #[arg(short, long)]
    output: Option<String>,

    /// Re-index only changed directories.
    #[arg(short, long)]
    update: bool,

    /// Re-index everything, ignoring stored fingerprints.
    #[arg(short, long)]
    force: bool,

    /// Compact signature-only rendering.
    #[arg(long)]
    dense: bool,

    /// Search the existing index for a symbol instead of indexing.
    #[arg(short, long)]
    search: Option<String>,

    /// Maximum number of search results.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print the directory tree and exit without indexing.
    #[arg(long)]
    structure_only: bool,

    /// Write a default config file and exit.
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = if cli.config.is_empty() {
            "codeatlas.json"
        } else {
            cli.config.as_str()
        };
        Config::default().save(path)?;
        println!("Wrote default config to {path}");
        return Ok(());
    }

    let mut config = Config::load(&cli.config)?;
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if cli.dense {
        config.dense = true;
    }
    config.validate()?;

    let root = std::path::absolute(&cli.path)
        .with_context(|| format!("cannot resolve path: {}", cli.path.display()))?;
    anyhow::ensure!(root.is_dir(), "not a directory: {}", root.display());

    if cli.structure_only {
        let skip = vec![config.output_dir.clone()];
        println!("{}", tree::render(&root, config.tree_depth, &skip));
        return Ok(());
    }

    if let Some(query) = cli.search {
        return run_search(&root, &config, &query, cli.limit.unwrap_or(config.search_limit));
    }

    let index_dir = root.join(&config.output_dir);
    let mode = RunMode::resolve(&index_dir, cli.update, cli.force);
    let mut builder = IndexBuilder::new(root, config, mode)?;
    let stats = builder.run()?;

    println!("Indexed {} file(s), {} symbol(s)", stats.files_indexed, stats.symbols_found);
    if stats.dirs_skipped > 0 {
        println!("Skipped {} unchanged director(ies)", stats.dirs_skipped);
    }
    if stats.files_removed > 0 {
        println!("Removed {} deleted file(s) from the index", stats.files_removed);
    }
    if stats.errors > 0 {
        println!("{} file(s) had parse or read errors", stats.errors);
    }
    println!("Index written to {}", builder.index_dir().display());
    Ok(())
}

fn run_search(root: &std::path::Path, config: &Config, query: &str, limit: usize) -> Result<()> {
    let index_dir = root.join(&config.output_dir);
    anyhow::ensure!(
        index_dir.join(codeatlas::store::DB_NAME).exists(),
        "no index found at {}; run without --search first",
        index_dir.display()
    );

    let builder = IndexBuilder::new(root.to_path_buf(), config.clone(), RunMode::Incremental)?;
    let hits = builder.search(query, limit)?;
    if hits.is_empty() {
        println!("No matches for '{query}'");
        return Ok(());
    }

    for hit in &hits {
        let rel = hit
            .path
            .strip_prefix(&format!("{}/", root.to_string_lossy().replace('\\', "/")))
            .unwrap_or(&hit.path);
        println!("{rel}: {}", hit.context);
    }
    println!("{} match(es)", hits.len());
    Ok(())
}

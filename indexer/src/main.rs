use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docsearch_core::config::DEFAULT_RESULT_LIMIT;
use docsearch_core::persist::{read_index_file, DEFAULT_INDEX_FILE};
use docsearch_core::{
    ensure_index, index_directory_with_report, read_document, save_index, search_directory, search_index, EngineConfig,
    ScoringMode,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "docsearch-indexer")]
#[command(about = "Build and query a keyword index over a documentation directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Rescan files under the root without an index
    Direct,
    /// Score every document in the saved index
    Index,
    /// Score only documents whose keywords contain a query term
    Pruned,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the document root and save the index file
    Build {
        /// Document root
        #[arg(long, default_value = "./docs")]
        root: String,
        /// Output index file
        #[arg(long, default_value = DEFAULT_INDEX_FILE)]
        output: String,
        /// Allowed file extensions (repeatable); defaults to md, txt, html
        #[arg(long = "ext")]
        extensions: Vec<String>,
    },
    /// Search the documents and print ranked results as JSON
    Search {
        #[arg(long, default_value = "./docs")]
        root: String,
        /// Index file; rebuilt from the root when missing or empty
        #[arg(long, default_value = DEFAULT_INDEX_FILE)]
        index: String,
        #[arg(long)]
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = DEFAULT_RESULT_LIMIT)]
        k: usize,
        #[arg(long, value_enum, default_value_t = Mode::Index)]
        mode: Mode,
        #[arg(long = "ext")]
        extensions: Vec<String>,
    },
    /// Print one document as JSON
    Read {
        #[arg(long)]
        path: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { root, output, extensions } => build(&config_for(&root, extensions), &output),
        Commands::Search { root, index, query, k, mode, extensions } => {
            search(config_for(&root, extensions), &index, &query, k, mode)
        }
        Commands::Read { path } => {
            let doc = read_document(&path)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
    }
}

fn config_for(root: &str, extensions: Vec<String>) -> EngineConfig {
    let config = EngineConfig::new(root);
    if extensions.is_empty() { config } else { config.with_extensions(extensions) }
}

fn build(config: &EngineConfig, output: &str) -> Result<()> {
    let report = index_directory_with_report(config)?;
    for skip in &report.skipped {
        tracing::warn!(path = %skip.path.display(), reason = %skip.reason, "not indexed");
    }
    save_index(&report.index, output)?;
    tracing::info!(output, num_docs = report.index.len(), "index saved");
    Ok(())
}

fn search(config: EngineConfig, index_path: &str, query: &str, k: usize, mode: Mode) -> Result<()> {
    if k == 0 {
        bail!("-k must be at least 1");
    }
    let results = match mode {
        Mode::Direct => search_directory(query, k, &config)?,
        Mode::Index | Mode::Pruned => {
            let scoring = if matches!(mode, Mode::Pruned) { ScoringMode::Pruned } else { ScoringMode::Exhaustive };
            let config = config.with_scoring(scoring);
            let index = ensure_index(read_index_file(index_path)?, &config)?;
            search_index(&index, query, k, &config)?
        }
    };
    if results.is_empty() {
        eprintln!("no matches for {query:?}");
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

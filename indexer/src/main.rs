mod source;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use searchify_core::{
    DocId, DocMeta, Indexer, IndexerConfig, MemoryStore, SearchConfig, Searcher, SledStore,
    Snapshot, StoreConfig,
};
use source::{collect_files, extract, read_path, ExtractedDoc};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build, extend and query a Searchify index", long_about = None)]
struct Cli {
    /// Index directory (sled database)
    #[arg(long, global = true, default_value = "data/index")]
    index: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every supported file under a directory (or a single file)
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
    },
    /// Index one local file or http(s) URL
    Add {
        #[arg(long)]
        source: String,
    },
    /// Run a query against the index
    Search {
        #[arg(long)]
        query: String,
        /// Number of results to print
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Search a JSON dump in memory instead of the sled index
        #[arg(long)]
        snapshot: Option<String>,
    },
    /// Write the whole index as JSON for inspection
    Dump {
        #[arg(long)]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    if let Commands::Search { query, k, snapshot: Some(path) } = &cli.command {
        return search_snapshot(path, query, *k).await;
    }

    let store = Arc::new(
        SledStore::open(&StoreConfig::new(&cli.index))
            .with_context(|| format!("opening index at {}", cli.index))?,
    );

    match cli.command {
        Commands::Build { input } => build(&store, &input).await?,
        Commands::Add { source } => add(&store, &source).await?,
        Commands::Search { query, k, .. } => search(&store, &query, k).await?,
        Commands::Dump { output } => {
            store.snapshot()?.save(&output)?;
            tracing::info!(output, "snapshot written");
        }
    }

    store.flush().await?;
    Ok(())
}

fn now_rfc3339() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

async fn index_doc(indexer: &Indexer<SledStore>, doc: ExtractedDoc) -> Result<DocId> {
    let report = indexer.index_next(&doc.text).await?;
    let id = report.document_id;
    let meta = DocMeta { source: doc.source, title: doc.title, indexed_at: now_rfc3339() };
    indexer.store().put_doc_meta(id, &meta)?;
    tracing::debug!(id, source = %meta.source, terms = report.terms, "stored document");
    Ok(id)
}

async fn build(store: &Arc<SledStore>, input: &str) -> Result<()> {
    let indexer = Indexer::new(store.clone(), IndexerConfig::default());
    let files = collect_files(Path::new(input));
    let mut indexed = 0usize;

    for file in &files {
        let docs = match read_path(file) {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(error = %e, "skipping input");
                continue;
            }
        };
        for doc in docs {
            index_doc(&indexer, doc).await?;
            indexed += 1;
        }
    }

    tracing::info!(files = files.len(), documents = indexed, terms = store.num_terms(), "index build complete");
    Ok(())
}

async fn add(store: &Arc<SledStore>, location: &str) -> Result<()> {
    let client = Client::builder()
        .user_agent("SearchifyIndexer/0.1 (+https://example.local)")
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(20))
        .build()?;
    let indexer = Indexer::new(store.clone(), IndexerConfig::default());

    for doc in extract(&client, location).await? {
        let id = index_doc(&indexer, doc).await?;
        println!("{id}\t{location}");
    }
    Ok(())
}

async fn search(store: &Arc<SledStore>, query: &str, k: usize) -> Result<()> {
    let searcher = Searcher::new(store.clone(), SearchConfig { max_results: Some(k) });
    for hit in searcher.search_scored(query).await? {
        let source = store.doc_meta(hit.doc_id)?.map(|m| m.source).unwrap_or_default();
        println!("{}\t{:.4}\t{}", hit.doc_id, hit.score, source);
    }
    Ok(())
}

async fn search_snapshot(path: &str, query: &str, k: usize) -> Result<()> {
    let index = Snapshot::load(path).with_context(|| format!("loading snapshot {path}"))?.into_index();
    tracing::info!(path, terms = index.num_terms(), last = index.last_document_id, "snapshot loaded");
    let store = Arc::new(MemoryStore::from_index(index));
    let searcher = Searcher::new(store, SearchConfig { max_results: Some(k) });
    for hit in searcher.search_scored(query).await? {
        println!("{}\t{:.4}", hit.doc_id, hit.score);
    }
    Ok(())
}

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use concierge_core::config::{DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K};
use concierge_core::loader::load_assets;
use concierge_core::{Asset, IdfWeighting, IndexConfig, IndexStats, RetrievalIndex};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the concierge knowledge-base index and query it offline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Input path (.json / .jsonl file or directory)
    #[arg(long)]
    input: PathBuf,
    /// IDF weighting: classic = ln(N/(df+1)), smoothed = ln(1 + N/df)
    #[arg(long, default_value_t = IdfWeighting::default())]
    idf: IdfWeighting,
    /// Results must score strictly above this cosine similarity
    #[arg(long, default_value_t = DEFAULT_MIN_SIMILARITY)]
    min_similarity: f64,
}

impl IndexArgs {
    fn build(&self) -> Result<RetrievalIndex<Asset>> {
        let assets = load_assets(&self.input)?;
        let config = IndexConfig { min_similarity: self.min_similarity, idf: self.idf, ..IndexConfig::default() };
        Ok(RetrievalIndex::<Asset>::build(assets, config)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the input records against a query
    Query {
        #[command(flatten)]
        index: IndexArgs,
        /// Free-text query
        #[arg(long, short)]
        q: String,
        /// Maximum number of results
        #[arg(long, short, default_value_t = DEFAULT_TOP_K)]
        k: usize,
        /// Include every document and its score, ignoring threshold and k
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Print index statistics, optionally with the IDF table
    Stats {
        #[command(flatten)]
        index: IndexArgs,
        /// Also list every vocabulary term with its IDF
        #[arg(long, default_value_t = false)]
        terms: bool,
    },
}

#[derive(Serialize)]
struct QueryHit {
    id: String,
    title: String,
    category: String,
    score: f64,
}

#[derive(Serialize)]
struct QueryOutput {
    query: String,
    took_s: f64,
    results: Vec<QueryHit>,
}

#[derive(Serialize)]
struct TermOutput<'a> {
    term: &'a str,
    idf: f64,
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    #[serde(flatten)]
    stats: IndexStats,
    idf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    terms: Option<Vec<TermOutput<'a>>>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { index, q, k, all } => run_query(&index, q, k, all),
        Commands::Stats { index, terms } => run_stats(&index, terms),
    }
}

fn run_query(args: &IndexArgs, q: String, k: usize, all: bool) -> Result<()> {
    let index = args.build()?;
    let start = std::time::Instant::now();
    let scored = if all { index.rank(&q) } else { index.search_scored(&q, k) };
    let results = scored
        .into_iter()
        .map(|s| QueryHit { id: s.record.id.clone(), title: s.record.title.clone(), category: s.record.category.clone(), score: s.score })
        .collect();
    let out = QueryOutput { query: q, took_s: start.elapsed().as_secs_f64(), results };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_stats(args: &IndexArgs, terms: bool) -> Result<()> {
    let index = args.build()?;
    let terms = terms.then(|| {
        index
            .vocabulary()
            .iter()
            .filter_map(|t| index.idf(t).map(|idf| TermOutput { term: t.as_str(), idf }))
            .collect::<Vec<_>>()
    });
    let out = StatsOutput { stats: index.stats(), idf: index.config().idf.to_string(), terms };
    println!("{}", serde_json::to_string_pretty(&out)?);
    tracing::info!(input = %args.input.display(), "stats complete");
    Ok(())
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mdsearch_core::{Bm25Params, FieldBoosts, SearchConfig, SearchRequest};
use mdsearch_indexer::loader::{self, InputKind};
use mdsearch_indexer::report::{format_results, ResultView};
use mdsearch_indexer::build_index;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mdsearch")]
#[command(about = "Index a documentation tree in memory and search it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and run one or more queries against it
    Search {
        #[command(flatten)]
        index: IndexArgs,
        /// Queries to run, one result list each
        #[arg(required = true)]
        queries: Vec<String>,
        /// Number of results per query (defaults to the config's default_k)
        #[arg(short = 'k', long)]
        num_results: Option<usize>,
        /// Field boost as field=factor, e.g. filename=2.0 (repeatable)
        #[arg(long = "boost")]
        boosts: Vec<String>,
        /// Exact-match keyword filter as name=value (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Print results as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Build the index and print its statistics
    Stats {
        #[command(flatten)]
        index: IndexArgs,
    },
}

#[derive(Args)]
struct IndexArgs {
    /// Input path: a directory or .zip archive of .md/.mdx files, or .json/.jsonl record files
    #[arg(long)]
    input: PathBuf,
    /// Treat the input as JSON/JSONL records even when it is a directory
    #[arg(long, default_value_t = false)]
    records: bool,
    /// JSON search configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// BM25 term frequency saturation
    #[arg(long)]
    k1: Option<f64>,
    /// BM25 length normalization
    #[arg(long)]
    b: Option<f64>,
    /// Disable English stemming
    #[arg(long, default_value_t = false)]
    no_stem: bool,
    /// Drop English stopwords
    #[arg(long, default_value_t = false)]
    stopwords: bool,
    /// Keyword field to index for --filter (repeatable)
    #[arg(long = "keyword-field")]
    keyword_fields: Vec<String>,
}

impl IndexArgs {
    fn config(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SearchConfig::default(),
        };
        if self.k1.is_some() || self.b.is_some() {
            let k1 = self.k1.unwrap_or(config.bm25.k1());
            let b = self.b.unwrap_or(config.bm25.b());
            config.bm25 = Bm25Params::new(k1, b)?;
        }
        if self.no_stem {
            config.tokenizer.stem = false;
        }
        if self.stopwords {
            config.tokenizer.stopwords = true;
        }
        config.keyword_fields.extend(self.keyword_fields.iter().cloned());
        config.validate()?;
        Ok(config)
    }

    fn input_kind(&self) -> InputKind {
        if self.records { InputKind::Records } else { InputKind::Auto }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { index, queries, num_results, boosts, filters, json } => {
            run_search(&index, &queries, num_results, &boosts, &filters, json)
        }
        Commands::Stats { index } => run_stats(&index),
    }
}

fn run_search(
    args: &IndexArgs,
    queries: &[String],
    num_results: Option<usize>,
    boost_specs: &[String],
    filter_specs: &[String],
    json: bool,
) -> Result<()> {
    let config = args.config()?;
    let mut boosts = config.boosts.clone();
    for spec in boost_specs {
        let (field, value) = FieldBoosts::parse_entry(spec)?;
        boosts.set(field, value)?;
    }
    let k = num_results.unwrap_or(config.default_k);

    let records = loader::load(&args.input, args.input_kind())?;
    let index = build_index(records, &config);

    let mut all = serde_json::Map::new();
    for query in queries {
        let mut request = SearchRequest::new(query).k(k).boosts(boosts.clone());
        for spec in filter_specs {
            let (name, value) = spec
                .split_once('=')
                .with_context(|| format!("filter must be name=value, got '{spec}'"))?;
            request = request.filter(name.trim(), value.trim());
        }
        let results = index.search_request(&request)?;
        if json {
            let views: Vec<ResultView<'_>> = results.iter().map(|r| ResultView::new(r, config.preview_chars)).collect();
            all.insert(query.clone(), serde_json::to_value(views)?);
        } else {
            println!("{}\n", format_results(query, &results, config.preview_chars));
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    }
    Ok(())
}

fn run_stats(args: &IndexArgs) -> Result<()> {
    let config = args.config()?;
    let records = loader::load(&args.input, args.input_kind())?;
    let index = build_index(records, &config);
    println!("{}", serde_json::to_string_pretty(&index.stats())?);
    Ok(())
}

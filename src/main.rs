//! Curation pipeline — binary entrypoint.
//!
//! Three modes: collect only (writes a pending batch file), process a given
//! batch file, or run the full pipeline with an item cap and an audio-skip
//! flag. Per-item failures are logged in the summary and do not change the
//! process exit code.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ai_blog_curator::collect::rss::HttpFeedFetcher;
use ai_blog_curator::{
    CandidateItem, Collector, Localizer, Pipeline, PipelineConfig, Publisher, Scorer, SeenLedger,
    Transformer,
};

#[derive(Parser)]
#[clap(
    name = "ai-blog-curator",
    version,
    about = "Collect, score, rewrite, translate, and publish feed content"
)]
struct Cli {
    /// Collect new candidate items and write them to a pending batch file
    #[clap(long, conflicts_with = "process")]
    collect: bool,
    /// Transform a previously collected batch file (JSON array of items)
    #[clap(long, value_name = "FILE")]
    process: Option<PathBuf>,
    /// Maximum number of items to publish in one run
    #[clap(long)]
    max: Option<usize>,
    /// Skip speech synthesis for this run
    #[clap(long)]
    skip_audio: bool,
    /// Path to the pipeline config file
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Where `--collect` writes the pending batch
    #[clap(long, value_name = "FILE", default_value = "data/pending_articles.json")]
    pending: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn build_pipeline(cfg: &PipelineConfig) -> Result<Pipeline<HttpFeedFetcher>> {
    let ledger = SeenLedger::open(&cfg.paths.ledger_path)?;
    let collector = Collector::new(
        HttpFeedFetcher::new(),
        ledger,
        Scorer::new(&cfg.scoring),
        cfg.sources.feeds.clone(),
        cfg.content.clone(),
    );
    let transformer = Transformer::from_config(&cfg.generator, cfg.content.max_input_chars);
    let localizer = Localizer::from_config(&cfg.translation, &cfg.speech, &cfg.paths);
    let publisher = Publisher::from_config(&cfg.paths, &cfg.translation);
    Ok(Pipeline::new(collector, transformer, localizer, publisher))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = PipelineConfig::load(cli.config.as_deref())?;
    let mut pipeline = build_pipeline(&cfg)?;

    if cli.collect {
        let batch = pipeline.collect_only().await;
        if let Some(parent) = cli.pending.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        // The pending file holds bare items, round-trippable into --process.
        let items: Vec<&CandidateItem> = batch.iter().map(|s| &s.item).collect();
        let json = serde_json::to_string_pretty(&items)?;
        fs::write(&cli.pending, json)
            .with_context(|| format!("writing {}", cli.pending.display()))?;
        println!("collected {} items -> {}", batch.len(), cli.pending.display());
        for scored in batch.iter().take(5) {
            println!(
                "  [{:5.1}] {}",
                scored.composite,
                scored.item.title.chars().take(60).collect::<String>()
            );
        }
        return Ok(());
    }

    if let Some(file) = cli.process {
        let content =
            fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
        let items: Vec<CandidateItem> =
            serde_json::from_str(&content).context("parsing batch file")?;
        let articles = pipeline.process_batch(&items).await;
        println!("transformed {} of {} items", articles.len(), items.len());
        return Ok(());
    }

    let max = cli.max.unwrap_or(cfg.content.posts_per_run);
    info!(max, skip_audio = cli.skip_audio, "starting full pipeline run");
    let summary = pipeline.run(Some(max), !cli.skip_audio).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Dispatch to the appropriate subcommand handler
// 3. For a crawl: count pages, start the producer, the worker pool, the
//    deadline and the Ctrl-C handler, then drain both output streams
// 4. Exit with proper code (0 = success, 1 = some downloads failed, 2 = error)
// =============================================================================

mod cli;
mod crawl;
mod error;
mod source;

use clap::Parser;
use cli::{Cli, Commands, PipelineArgs, SiteArgs};
use crawl::{FailureRecord, PoolOptions, PoolReport, ResultRecord, Stage};
use serde::Serialize;
use source::{HttpSource, SiteLayout};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use anyhow::Result;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Crawl {
            site,
            pipeline,
            json,
        } => handle_crawl(&site, &pipeline, json).await,
        Commands::Count { site, json } => handle_count(&site, json).await,
    }
}

// Diagnostics go to stderr; RUST_LOG wins over --verbose
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "recipe_harvest=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_source(site: &SiteArgs) -> Result<HttpSource> {
    let layout = SiteLayout::new(&site.base_url)?;
    let source = HttpSource::new(layout, Duration::from_secs(site.timeout_secs))?;
    Ok(source)
}

// Handles the 'count' subcommand
async fn handle_count(site: &SiteArgs, json: bool) -> Result<i32> {
    let source = build_source(site)?;
    let pages = crawl::discover_page_count(&source).await?;

    if json {
        println!("{}", serde_json::json!({ "pages": pages }));
    } else {
        println!("📄 {} listing page(s) at {}", pages, source.layout().base_url);
    }

    Ok(0)
}

// Handles the 'crawl' subcommand
async fn handle_crawl(site: &SiteArgs, pipeline: &PipelineArgs, json: bool) -> Result<i32> {
    let source = build_source(site)?;

    if !json {
        println!("🔍 Crawling recipes from: {}", source.layout().base_url);
    }

    // One blocking probe before anything concurrent starts
    let page_count = crawl::discover_page_count(&source).await?;
    let mut report = CrawlReport::new(page_count);

    if page_count == 0 {
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("✅ No listing pages found, nothing to download");
        }
        return Ok(0);
    }

    if !json {
        println!(
            "📄 {} listing page(s), {} worker(s)\n",
            page_count, pipeline.workers
        );
    }

    let token = CancellationToken::new();
    let (work, producer) =
        crawl::spawn_work_source(page_count, pipeline.queue_capacity, token.clone())?;
    let pool = crawl::run_pool(
        Arc::new(source),
        token.clone(),
        work,
        PoolOptions {
            workers: pipeline.workers,
            output_capacity: pipeline.output_capacity,
        },
    )?;

    let interrupt = crawl::spawn_interrupt_handler(token.clone());
    let deadline = (pipeline.deadline_secs > 0).then(|| {
        crawl::spawn_deadline(token.clone(), Duration::from_secs(pipeline.deadline_secs))
    });

    let mut recipes = Vec::new();
    let mut failures = Vec::new();
    crawl::drain(
        pool.results,
        pool.failures,
        |record| {
            if !json {
                println!(
                    "📥 page {:<5} {} ({} bytes)",
                    record.page,
                    record.url,
                    record.payload.len()
                );
            }
            recipes.push(RecipeEntry::new(record, json));
        },
        |failure| {
            if !json {
                eprintln!("❌ {}", failure);
            }
            failures.push(FailureEntry::from(failure));
        },
    )
    .await;

    report.pages_published = producer.await?;
    report.workers = pool.supervisor.await?;
    report.cancelled = token.is_cancelled();
    report.recipes = recipes;
    report.failures = failures;

    // The crawl is over; the helpers have nothing left to cancel
    interrupt.abort();
    if let Some(deadline) = deadline {
        deadline.abort();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if report.failures.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Everything we learned from one crawl, in the shape printed by --json
#[derive(Debug, Serialize)]
struct CrawlReport {
    pages: u32,
    pages_published: u32,
    cancelled: bool,
    workers: PoolReport,
    recipes: Vec<RecipeEntry>,
    failures: Vec<FailureEntry>,
}

impl CrawlReport {
    fn new(pages: u32) -> Self {
        Self {
            pages,
            pages_published: 0,
            cancelled: false,
            workers: PoolReport::default(),
            recipes: Vec::new(),
            failures: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RecipeEntry {
    page: u32,
    url: String,
    bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl RecipeEntry {
    // Bodies are only kept when they are going to be printed
    fn new(record: ResultRecord, keep_content: bool) -> Self {
        Self {
            page: record.page,
            url: record.url.to_string(),
            bytes: record.payload.len(),
            content: keep_content.then(|| record.text().into_owned()),
        }
    }
}

#[derive(Debug, Serialize)]
struct FailureEntry {
    page: u32,
    stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    error: String,
}

impl From<FailureRecord> for FailureEntry {
    fn from(failure: FailureRecord) -> Self {
        Self {
            page: failure.page,
            stage: failure.stage,
            url: failure.url.map(|u| u.to_string()),
            error: failure.error.to_string(),
        }
    }
}

// Prints a human-readable summary of the crawl
fn print_summary(report: &CrawlReport) {
    println!();
    println!("📊 Summary:");
    println!(
        "   📄 Pages: {} of {} dispatched",
        report.pages_published, report.pages
    );
    println!("   ✅ Recipes downloaded: {}", report.recipes.len());
    println!("   ❌ Failures: {}", report.failures.len());
    println!(
        "   👷 Workers finished: {}/{}",
        report.workers.workers_finished, report.workers.workers_started
    );

    if report.workers.workers_panicked > 0 {
        println!("   💥 Workers crashed: {}", report.workers.workers_panicked);
    }
    if report.cancelled {
        println!("   ⏱️  Crawl was cancelled before finishing");
    }
}

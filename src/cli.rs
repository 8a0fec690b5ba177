// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every setting can also come from the environment (RECIPE_HARVEST_*), so the
// tool can be configured the same way in a container as on a terminal.
// =============================================================================

use clap::{Args, Parser, Subcommand};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "recipe-harvest",
    version = "0.1.0",
    about = "Crawl a paginated recipe listing and download every recipe",
    long_about = "recipe-harvest discovers how many listing pages a recipe site has, then \
                  downloads every recipe linked from them with a fixed pool of workers. \
                  The crawl stops early when the deadline passes or on Ctrl-C."
)]
pub struct Cli {
    /// Log debug output from the crawl (RUST_LOG overrides this)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every recipe from every listing page
    ///
    /// Example: recipe-harvest crawl --workers 20 --deadline-secs 60
    Crawl {
        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output results in JSON format (recipe bodies included)
        #[arg(long)]
        json: bool,
    },

    /// Only report how many listing pages there are
    ///
    /// Example: recipe-harvest count --base-url https://mirror.example
    Count {
        #[command(flatten)]
        site: SiteArgs,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },
}

// Where the recipes live and how patient we are with each request
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Root URL of the recipe site
    #[arg(long, env = "RECIPE_HARVEST_BASE_URL", default_value = "https://www.brewtoad.com")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "RECIPE_HARVEST_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

// Sizing and lifetime of the worker pool
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Number of concurrent workers
    #[arg(long, env = "RECIPE_HARVEST_WORKERS", default_value_t = 50)]
    pub workers: usize,

    /// Cancel the crawl after this many seconds (0 = no deadline)
    #[arg(long, env = "RECIPE_HARVEST_DEADLINE_SECS", default_value_t = 30)]
    pub deadline_secs: u64,

    /// How many page indices may wait for a free worker
    #[arg(long, env = "RECIPE_HARVEST_QUEUE_CAPACITY", default_value_t = 1)]
    pub queue_capacity: usize,

    /// How many finished records may wait for the consumer
    #[arg(long, env = "RECIPE_HARVEST_OUTPUT_CAPACITY", default_value_t = 16)]
    pub output_capacity: usize,
}

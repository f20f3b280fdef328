//! popscatter: interactive 3D viewer for population-genomics embeddings
//!
//! Loads precomputed dual-PCA / kernel-PCA embeddings of genomic samples and
//! renders them as a 3D scatter plot, partitioned and colored by
//! super-population, population or gender.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

mod config;
mod embedding;
mod error;
mod figure;
mod output;
mod resolve;
mod samples;
mod scheme;
mod selection;
#[cfg(feature = "serve")]
mod serve;
mod store;

use crate::config::DatasetConfig;
use crate::output::RenderOutput;
use crate::selection::Selection;
use crate::store::DatasetStore;

/// 3D scatter viewer for precomputed genome embeddings
#[derive(Parser, Debug)]
#[command(name = "popscatter")]
#[command(version)]
#[command(about = "Explore dual/kernel PCA embeddings of genomic samples by population and gender")]
struct Cli {
    /// YAML dataset configuration (overrides --data-dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory using the standard dimReduc/ + cleaned/ layout
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate the dataset, then print group sizes
    Check,

    /// Resolve one selection and write the figure JSON
    Render(RenderArgs),

    /// Start the interactive viewer in the browser
    #[cfg(feature = "serve")]
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Projection method: dual or kernel
    #[arg(long, default_value = "dual")]
    pca_type: String,

    /// Feature set: whole-genome (all) or exclude-xy (autosomes-only)
    #[arg(long, default_value = "whole-genome")]
    include_xy: String,

    /// Grouping: spop, pop or gender
    #[arg(long, default_value = "spop")]
    group_by: String,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use compact JSON (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Compress output with gzip (.json.gz)
    #[arg(long)]
    gzip: bool,
}

#[cfg(feature = "serve")]
#[derive(Parser, Debug)]
struct ServeArgs {
    /// Port for the web server
    #[arg(long, default_value_t = 8050)]
    port: u16,

    /// Do not open a browser window
    #[arg(long)]
    no_browser: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("popscatter v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration: {}", path.display());
            DatasetConfig::from_yaml(path)?
        }
        None => {
            info!("Using standard layout under {}", cli.data_dir.display());
            DatasetConfig::default_layout(&cli.data_dir)
        }
    };

    match cli.command {
        Commands::Check => run_check(&config),
        Commands::Render(args) => run_render(&config, args),
        #[cfg(feature = "serve")]
        Commands::Serve(args) => run_serve(&config, args),
    }
}

fn load_store(config: &DatasetConfig) -> Result<DatasetStore> {
    let store = DatasetStore::load(config).context("Dataset failed validation; refusing to start")?;
    info!("Dataset loaded: {} samples", store.samples().len());
    Ok(store)
}

/// Run the check subcommand: load everything and report group sizes
fn run_check(config: &DatasetConfig) -> Result<()> {
    let store = load_store(config)?;
    let summary = store.summary();

    for scheme in &summary.schemes {
        let non_empty = scheme.groups.iter().filter(|g| g.count > 0).count();
        info!(
            "{}: {} categories ({} populated)",
            scheme.scheme,
            scheme.groups.len(),
            non_empty
        );
        for g in &scheme.groups {
            info!("  {:<6} {:>6}  {}", g.category, g.count, g.label);
        }
    }

    info!("Done! All embeddings aligned with {} samples", summary.total_samples);
    Ok(())
}

/// Run the render subcommand: one selection to a figure file
fn run_render(config: &DatasetConfig, args: RenderArgs) -> Result<()> {
    // Reject bad selector values before touching the data
    let selection = Selection::parse(
        Some(args.pca_type.as_str()),
        Some(args.include_xy.as_str()),
        Some(args.group_by.as_str()),
    )?;

    let store = load_store(config)?;
    let groups = resolve::resolve(&store, selection);
    let rendered = RenderOutput::new(selection, &groups);

    let Some(output) = args.output else {
        println!("{}", rendered.to_json(args.compact)?);
        return Ok(());
    };

    let use_gzip = args.gzip || output.extension().map(|e| e == "gz").unwrap_or(false);
    if use_gzip {
        let output_path = if output.extension().map(|e| e == "gz").unwrap_or(false) {
            output
        } else {
            output.with_extension("json.gz")
        };
        rendered.save_gzip(&output_path, args.compact)?;
        info!("Gzipped figure saved to: {}", output_path.display());
    } else if args.compact {
        rendered.save_compact(&output)?;
        info!("Compact figure saved to: {}", output.display());
    } else {
        rendered.save(&output)?;
        info!("Figure saved to: {}", output.display());
    }

    info!("{}: {} traces", selection, groups.len());
    Ok(())
}

/// Run the serve subcommand
#[cfg(feature = "serve")]
fn run_serve(config: &DatasetConfig, args: ServeArgs) -> Result<()> {
    let store = load_store(config)?;
    serve::start_server(&store, args.port, !args.no_browser)
}

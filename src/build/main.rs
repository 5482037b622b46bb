//! Crosswalk build pipeline.
//!
//! Loads the standardized boundary collection, builds the spatial candidate
//! index once, then derives longform and wide crosswalk tables for every
//! primary geography type and records the run parameters.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crosswalk::load::load_boundaries;
use crosswalk::models::GeographyRegistry;
use crosswalk::output::{LongformTable, RunMeta, WideTable};
use crosswalk::overlay::{BoundaryIndex, CrosswalkEngine, CrosswalkParams};

#[derive(Parser, Debug)]
#[command(name = "build")]
#[command(about = "Build crosswalk CSVs (longform and wide) from unified boundaries")]
struct Args {
    /// Standardized boundaries GeoJSON file, optionally gzipped
    #[arg(long)]
    boundaries: PathBuf,

    /// Output run directory, e.g. outputs/<run-id>/
    #[arg(long)]
    run_dir: PathBuf,

    /// Buffer applied only in intersection calculations, in feet
    /// (negative shrinks)
    #[arg(long, default_value_t = -50.0, allow_hyphen_values = true)]
    buffer_feet: f64,

    /// Minimum intersection area (sq ft) to include a pair
    #[arg(long, default_value_t = 100.0)]
    min_area_final: f64,

    /// Tiny epsilon area to suppress numeric noise
    #[arg(long, default_value_t = 1e-6)]
    epsilon: f64,

    /// Geography IDs to exclude entirely
    #[arg(long, num_args = 0.., default_values_t = vec![String::from("cc_upcoming")])]
    exclude_ids: Vec<String>,

    /// If provided, build only for these primary IDs
    #[arg(long, num_args = 1..)]
    primary_only: Option<Vec<String>>,

    /// If provided, limit target geography IDs to this set
    #[arg(long, num_args = 1..)]
    targets: Option<Vec<String>>,

    /// Limit number of primary regions per type (for smoke tests)
    #[arg(long)]
    max_primaries: Option<usize>,

    /// Optional TOML registry of geography types (display names for logs
    /// and metadata)
    #[arg(long)]
    types: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Crosswalk Build Pipeline");
    info!("Boundaries: {}", args.boundaries.display());

    let registry = match &args.types {
        Some(path) => GeographyRegistry::load_from_file(path)?,
        None => GeographyRegistry::default(),
    };

    // Collection-level load failure is the only fatal error in the run
    let collection = load_boundaries(&args.boundaries)
        .context("Failed to load boundary collection")?;

    // Determine geography IDs
    let all_ids = collection.type_ids();
    let ids: Vec<String> = all_ids
        .iter()
        .filter(|id| !args.exclude_ids.contains(id))
        .cloned()
        .collect();

    let primary_ids: Vec<String> = match &args.primary_only {
        Some(only) => only.iter().filter(|id| ids.contains(id)).cloned().collect(),
        None => ids.clone(),
    };
    let target_ids: Vec<String> = match &args.targets {
        Some(targets) => targets
            .iter()
            .filter(|id| ids.contains(id))
            .cloned()
            .collect(),
        None => ids.clone(),
    };

    info!(
        "Geography types: {} total, {} primary, {} target",
        ids.len(),
        primary_ids.len(),
        target_ids.len()
    );

    let long_dir = args.run_dir.join("longform");
    let wide_dir = args.run_dir.join("wide");
    fs::create_dir_all(&long_dir).context("Failed to create longform output directory")?;
    fs::create_dir_all(&wide_dir).context("Failed to create wide output directory")?;

    let params = CrosswalkParams {
        buffer_feet: args.buffer_feet,
        min_area_final: args.min_area_final,
        epsilon: args.epsilon,
        max_primaries: args.max_primaries,
    };

    let index = BoundaryIndex::build(&collection);
    let engine = CrosswalkEngine::new(&collection, &index, params.clone());

    let pb = ProgressBar::new(primary_ids.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    for primary_id in &primary_ids {
        pb.set_message(primary_id.clone());

        if collection.of_type(primary_id).is_empty() {
            warn!("No features for primary id={}", primary_id);
            pb.inc(1);
            continue;
        }

        info!(
            "Building crosswalks for primary={} ({})",
            primary_id,
            registry.display_name(primary_id)
        );
        let regions = engine.build_for_primary(primary_id, &target_ids);

        // A missing artifact for an id is the normal "nothing qualified"
        // signal; a failed write is logged and must not stop sibling ids.
        match LongformTable::assemble(&regions) {
            Some(table) => {
                let path = long_dir.join(format!("longform_{}_crosswalk.csv", primary_id));
                match table.write_csv(&path) {
                    Ok(()) => info!("Saved longform: {} ({} rows)", path.display(), table.len()),
                    Err(e) => error!("Failed to save longform for {}: {:#}", primary_id, e),
                }
            }
            None => info!("No longform rows produced for primary={}", primary_id),
        }

        match WideTable::assemble(primary_id, &target_ids, &regions) {
            Some(table) => {
                let path = wide_dir.join(format!("wide_{}_crosswalk.csv", primary_id));
                match table.write_csv(&path) {
                    Ok(()) => info!(
                        "Saved wide: {} ({} rows)",
                        path.display(),
                        table.rows().len()
                    ),
                    Err(e) => error!("Failed to save wide for {}: {:#}", primary_id, e),
                }
            }
            None => info!("No wide rows produced for primary={}", primary_id),
        }

        pb.inc(1);
    }
    pb.finish_with_message("done");

    let meta = RunMeta::new(
        &args.boundaries,
        &params,
        args.exclude_ids.clone(),
        primary_ids,
        target_ids,
    );
    let meta_path = args.run_dir.join("crosswalks_meta.json");
    match meta.write_json(&meta_path) {
        Ok(()) => info!("Saved crosswalks meta to {}", meta_path.display()),
        Err(e) => error!("Failed to write crosswalks meta: {:#}", e),
    }

    Ok(())
}

//! Dungeonify command-line harness.
//!
//! Reads the map-ingestion JSON, runs the footprint pipeline and writes
//! either the render plan (for the compositing tool) or the finished
//! `.dd2vtt` battlemap.
//!
//! Usage:
//!   dungeonify plan --input map.json --out plan.json
//!   dungeonify export --input map.json --image map.png --out Battlemap.dd2vtt --report

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dungeonify_logic::assets::AssetCatalog;
use dungeonify_logic::config::{FailurePolicy, GenerationConfig};
use dungeonify_logic::error::{AssetError, ExportError};
use dungeonify_logic::frame::MapInput;
use dungeonify_logic::metrics::{area_report, discovery_metrics, mean};
use dungeonify_logic::pipeline::{generate, Generation};
use dungeonify_logic::render::{CompositeRenderer, RenderPlan};
use serde::de::DeserializeOwned;

#[derive(Parser, Debug)]
#[command(name = "dungeonify")]
#[command(about = "Turn building footprints into grid battlemaps")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the render plan for the compositing tool.
    #[command(name = "plan")]
    Plan(PlanArgs),
    /// Write the .dd2vtt document around a composited image.
    #[command(name = "export")]
    Export(ExportArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Map-ingestion JSON (structures, roads, inches per pixel).
    #[arg(long, required = true)]
    input: PathBuf,
    /// Generation config JSON; missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Asset catalog JSON; defaults to the built-in catalog.
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Overrides the config's run seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Leave failing structures out instead of aborting.
    #[arg(long)]
    skip_failed: bool,
}

#[derive(Args, Debug, Clone)]
struct PlanArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value = "plan.json")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Composite PNG rendered from a plan with the same input and seed.
    #[arg(long, required = true)]
    image: PathBuf,
    #[arg(long, default_value = "Battlemap.dd2vtt")]
    out: PathBuf,
    /// Print area and discovery metrics.
    #[arg(long)]
    report: bool,
}

/// A composite image produced ahead of time from a written plan.
struct PrebakedImage {
    path: PathBuf,
}

impl CompositeRenderer for PrebakedImage {
    fn render(&self, plan: &RenderPlan) -> dungeonify_logic::Result<Vec<u8>> {
        log::debug!(
            "using prebaked image {} for {} tiles",
            self.path.display(),
            plan.tile_count()
        );
        fs::read(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => AssetError::NotFound {
                category: format!("composite image {}", self.path.display()),
            }
            .into(),
            _ => ExportError::Io {
                path: self.path.display().to_string(),
                source,
            }
            .into(),
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Plan(args) => run_plan(args),
        Command::Export(args) => run_export(args),
    }
}

fn run_plan(args: PlanArgs) -> Result<()> {
    let (config, generation) = run_pipeline(&args.common)?;
    let plan = generation.render_plan(&config);
    let bytes = serde_json::to_vec_pretty(&plan).context("serializing render plan")?;
    fs::write(&args.out, bytes).with_context(|| format!("writing plan {}", args.out.display()))?;
    log::info!(
        "wrote render plan with {} structures to {}",
        plan.structures.len(),
        args.out.display()
    );
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let (config, generation) = run_pipeline(&args.common)?;
    let renderer = PrebakedImage {
        path: args.image.clone(),
    };
    generation
        .export(&config, &renderer, &args.out)
        .with_context(|| format!("exporting {}", args.out.display()))?;
    if args.report {
        print_report(&generation, &config);
    }
    Ok(())
}

fn run_pipeline(common: &CommonArgs) -> Result<(GenerationConfig, Generation)> {
    let input: MapInput = read_json(&common.input)?;
    let mut config: GenerationConfig = match &common.config {
        Some(path) => read_json(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = common.seed {
        config.seed = seed;
    }
    if common.skip_failed {
        config.failure_policy = FailurePolicy::Skip;
    }
    let catalog: AssetCatalog = match &common.assets {
        Some(path) => read_json(path)?,
        None => AssetCatalog::default(),
    };

    let generation = generate(&input, &config, &catalog).context("generating floor plans")?;
    Ok((config, generation))
}

fn print_report(generation: &Generation, config: &GenerationConfig) {
    let areas = area_report(generation);
    println!("=== Dungeonify Report ===\n");
    println!("Structure areas before: {:?}", areas.before);
    println!("Structure areas after:  {:?}", areas.after);
    println!("Area differences:       {:?}", areas.differences);
    println!("Mean area difference:   {:.2}", areas.mean_difference);

    let metrics = discovery_metrics(generation, config);
    println!("\nDiscovery metrics: {:?}", metrics);
    if let Some(m) = mean(&metrics) {
        println!("Mean discovery metric: {:.4}", m);
    }
    if !generation.skipped.is_empty() {
        println!("\nSkipped structures: {:?}", generation.skipped);
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

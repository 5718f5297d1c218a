use std::path::PathBuf;

use anyhow::Context;
use burden_core::calculations::MedianMode;
use burden_core::{BurdenPipeline, PipelineReport};
use burden_data::{HouseholdTableLoader, PersonTableLoader, RunConfig};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Household tax burden ratio.
///
/// Reads a household table and a person table from a household expenditure
/// survey and prints the weighted median household tax divided by the
/// weighted aggregate household tax.
#[derive(Debug, Parser)]
#[command(name = "burden-ratio")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Household table (CSV with a header row).
    #[arg(long)]
    households: PathBuf,

    /// Person table (CSV with a header row).
    #[arg(long)]
    persons: PathBuf,

    /// TOML file with fiscal totals, contribution rules and column names.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to read the weighted median. Overrides the config file.
    #[arg(long, value_enum)]
    median_mode: Option<MedianArg>,

    /// Shorthand for `--median-mode interpolated`.
    #[arg(long, default_value_t = false, conflicts_with = "median_mode")]
    interpolate: bool,

    /// Print the ratio as a percentage.
    #[arg(long, default_value_t = false)]
    percent: bool,

    /// Log the intermediate results of the run.
    #[arg(long, default_value_t = false)]
    breakdown: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MedianArg {
    /// First value whose cumulative weight reaches half the total.
    Threshold,
    /// Linear interpolation at the midpoint of the weight mass.
    Interpolated,
}

impl From<MedianArg> for MedianMode {
    fn from(arg: MedianArg) -> Self {
        match arg {
            MedianArg::Threshold => MedianMode::Threshold,
            MedianArg::Interpolated => MedianMode::Interpolated,
        }
    }
}

impl Cli {
    /// The median mode requested on the command line, if any.
    fn median_mode(&self) -> Option<MedianMode> {
        if self.interpolate {
            Some(MedianMode::Interpolated)
        } else {
            self.median_mode.map(MedianMode::from)
        }
    }
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info`.
/// * Writes to stderr; stdout carries only the result.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn log_breakdown(report: &PipelineReport) {
    let assessment = &report.assessment;
    info!(
        households = assessment.households.len(),
        employer_households = report.employer_tax.len(),
        dropped_persons = report.dropped_persons,
        "Input sizes"
    );
    info!(
        weighted_consumption = %assessment.weighted_consumption,
        indirect_tax_pool = %assessment.indirect_tax_pool,
        "Indirect tax pool"
    );
    info!(
        median_total_tax = %report.summary.median_total_tax,
        aggregate_total_tax = %report.summary.aggregate_total_tax,
        "Burden summary"
    );
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(mode) = cli.median_mode() {
        config.burden.median_mode = mode;
    }

    let households =
        HouseholdTableLoader::load_from_file(&cli.households, &config.columns.households)
            .with_context(|| format!("Failed to load households: {}", cli.households.display()))?;
    let persons = PersonTableLoader::load_from_file(&cli.persons, &config.columns.persons)
        .with_context(|| format!("Failed to load persons: {}", cli.persons.display()))?;
    debug!(
        households = households.len(),
        persons = persons.len(),
        "Loaded survey tables"
    );

    let pipeline = BurdenPipeline::new(config.burden).context("Invalid configuration")?;
    let report = pipeline
        .run(&households, &persons)
        .context("Failed to compute burden ratio")?;

    if cli.breakdown {
        log_breakdown(&report);
    }

    let value = if cli.percent {
        report
            .summary
            .as_percentage()
            .context("Burden ratio is too large to print as a percentage")?
    } else {
        report.summary.ratio
    };
    println!("{}", value.normalize());

    Ok(())
}

//! Command-line driver: loads districts, optimizes them and writes the
//! layout reports.
//!
//! ```text
//! smartgrid --data data --district 1 --district 2 --iterations 2000 --seed 7
//! smartgrid --houses h.csv --batteries b.csv --routing direct --output out.json
//! ```
//!
//! Logging goes to stderr and respects `RUST_LOG`.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{error, info};
use u_smartgrid::anneal::{AnnealConfig, CoolingSchedule};
use u_smartgrid::baseline::{BaselineConfig, RandomBaseline};
use u_smartgrid::io::{load_batteries, load_houses, Report};
use u_smartgrid::route::RoutingStrategy;
use u_smartgrid::solver::{solve_districts, Layout, SmartGrid, SolverConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Routing {
    Shared,
    Direct,
}

impl From<Routing> for RoutingStrategy {
    fn from(r: Routing) -> Self {
        match r {
            Routing::Shared => RoutingStrategy::Shared,
            Routing::Direct => RoutingStrategy::Direct,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Cooling {
    LundyMees,
    Geometric,
    Linear,
}

#[derive(Debug, Parser)]
#[command(name = "smartgrid", version, about = "Optimize smart-grid cable layouts")]
struct Cli {
    /// Root directory holding `district_<n>/` input folders.
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// District numbers to solve; may be repeated.
    #[arg(long = "district", default_value = "1")]
    districts: Vec<u32>,

    /// Houses CSV; overrides the data directory layout.
    #[arg(long, requires = "batteries")]
    houses: Option<PathBuf>,

    /// Batteries CSV; overrides the data directory layout.
    #[arg(long, requires = "houses")]
    batteries: Option<PathBuf>,

    /// Annealing iterations.
    #[arg(long, default_value_t = 500)]
    iterations: usize,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Routing::Shared)]
    routing: Routing,

    #[arg(long, value_enum, default_value_t = Cooling::LundyMees)]
    cooling: Cooling,

    /// Cooling factor for the geometric schedule.
    #[arg(long, default_value_t = 0.99)]
    alpha: f64,

    /// Sample this many random layouts per district instead of optimizing.
    #[arg(long, value_name = "RUNS")]
    baseline: Option<usize>,

    /// Report destination; stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Cli {
    fn solver_config(&self) -> SolverConfig {
        let cooling = match self.cooling {
            Cooling::LundyMees => CoolingSchedule::default(),
            Cooling::Geometric => CoolingSchedule::Geometric { alpha: self.alpha },
            Cooling::Linear => CoolingSchedule::Linear,
        };
        let mut anneal = AnnealConfig::default()
            .with_iterations(self.iterations)
            .with_cooling(cooling);
        if let Some(seed) = self.seed {
            anneal = anneal.with_seed(seed);
        }
        SolverConfig::default()
            .with_anneal(anneal)
            .with_routing(self.routing.into())
    }

    fn districts(&self, config: &SolverConfig) -> Result<Vec<SmartGrid>> {
        if let (Some(houses), Some(batteries)) = (&self.houses, &self.batteries) {
            let district = self.districts.first().copied().unwrap_or(1);
            let h = load_houses(houses)
                .with_context(|| format!("loading houses from {}", houses.display()))?;
            let b = load_batteries(batteries)
                .with_context(|| format!("loading batteries from {}", batteries.display()))?;
            return Ok(vec![SmartGrid::new(district, &h, &b, config.clone())?]);
        }
        self.districts
            .iter()
            .map(|&d| {
                SmartGrid::from_dir(&self.data, d, config.clone()).with_context(|| {
                    format!("loading district {d} from {}", self.data.display())
                })
            })
            .collect()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.solver_config();
    config.validate()?;

    let districts = cli.districts(&config)?;
    if let Some(runs) = cli.baseline {
        return run_baseline(&cli, &districts, runs);
    }
    info!(count = districts.len(), "solving districts");

    let layouts = solve_districts(districts)
        .into_iter()
        .collect::<Result<Vec<Layout>, _>>()?;

    let reports: Vec<_> = layouts.iter().map(Layout::report).collect();
    write_reports(&reports, cli.output.as_ref())?;

    let mut infeasible = 0;
    for layout in &layouts {
        info!(
            district = layout.district(),
            cost = %layout.total_cost(),
            cables = layout.cable_count(),
            "layout"
        );
        if let Err(e) = layout.ensure_feasible() {
            error!(district = layout.district(), "{e}");
            infeasible += 1;
        }
    }
    if infeasible > 0 {
        bail!("{infeasible} district(s) could not place every house");
    }
    Ok(())
}

fn run_baseline(cli: &Cli, districts: &[SmartGrid], runs: usize) -> Result<()> {
    let mut config = BaselineConfig::default().with_runs(runs);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let mut summaries = Vec::with_capacity(districts.len());
    for district in districts {
        let summary = RandomBaseline::sample(district.grid(), &config).with_context(|| {
            format!("sampling baseline for district {}", district.district())
        })?;
        summaries.push(serde_json::json!({
            "district": district.district(),
            "runs": summary.runs,
            "failures": summary.failures,
            "failure-percentage": summary.failure_percentage(),
            "mean-cost": summary.mean_cost(),
            "costs": summary.costs,
        }));
    }

    match cli.output.as_ref() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating baseline report {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &summaries)?;
            writer.flush()?;
        }
        None => {
            let mut lock = io::stdout().lock();
            serde_json::to_writer_pretty(&mut lock, &summaries)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

fn write_reports(reports: &[Report], output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating report {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_all(reports, &mut writer)?;
            writer.flush()?;
            info!(path = %path.display(), "report written");
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_all(reports, &mut lock)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

/// A single district is written as its own array; several as an array of
/// reports.
fn write_all<W: Write>(reports: &[Report], writer: &mut W) -> Result<()> {
    match reports {
        [single] => single.write_json(writer)?,
        many => serde_json::to_writer_pretty(writer, many)?,
    }
    Ok(())
}

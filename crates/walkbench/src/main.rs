//! Validation tooling for the Disimpy random-walk simulator.
//!
//! Three subcommands, each a one-shot offline step:
//!
//! - `normalize-mesh`: shift a PLY substrate to the origin and convert it
//!   from micrometres to metres
//! - `runtime`: compare runtimes against Camino and extrapolate the
//!   configurations Camino was too slow to run
//! - `signals`: compare simulated signal attenuation against Camino

mod figures;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkbench_analysis::{
    DEFAULT_STEPS, Endianness, MAX_DECADES, ResultPaths, RuntimeComparison, RuntimeConfig,
    SignalComparison, SignalConfig,
};
use walkbench_mesh::{DEFAULT_SCALE, NormalizeOptions, normalize_file};

use crate::figures::FigureStyle;

#[derive(Parser)]
#[command(name = "walkbench", version)]
#[command(about = "Disimpy validation figures and mesh preprocessing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Shift a PLY mesh so its minimum is at the origin and rescale it
    NormalizeMesh(NormalizeArgs),
    /// Compare runtimes and extrapolate the unmeasured Camino runs
    Runtime(RuntimeArgs),
    /// Compare normalised signals against Camino
    Signals(SignalArgs),
}

#[derive(Args)]
struct NormalizeArgs {
    /// ASCII PLY mesh to read
    #[arg(short, long, default_value = "original_mesh.ply")]
    input: PathBuf,

    /// Where to write the normalized mesh
    #[arg(short, long, default_value = "neuron-model.ply")]
    output: PathBuf,

    /// Factor applied to the shifted coordinates
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: f64,
}

#[derive(Args)]
struct StyleArgs {
    /// Figure resolution in dots per inch
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,
}

impl From<&StyleArgs> for FigureStyle {
    fn from(args: &StyleArgs) -> Self {
        Self {
            dpi: args.dpi,
            ..Self::default()
        }
    }
}

#[derive(Args)]
struct RuntimeArgs {
    /// Directory holding the runtime files
    #[arg(long, default_value = "results")]
    results: PathBuf,

    /// Output figure
    #[arg(long, default_value = "figures/runtime_comparison.png")]
    figure: PathBuf,

    /// Walker counts are 10^0 .. 10^(decades - 1)
    #[arg(
        long,
        default_value_t = 7,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DECADES))
    )]
    decades: u32,

    /// Number of leading walker counts Camino was run at
    #[arg(long, default_value_t = 5)]
    measured: usize,

    /// Simulated time steps
    #[arg(long, default_value_t = DEFAULT_STEPS)]
    steps: u64,

    /// Also write a JSON summary here
    #[arg(long)]
    summary: Option<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Args)]
struct SignalArgs {
    /// Directory holding the signal files
    #[arg(long, default_value = "results")]
    results: PathBuf,

    /// Output figure
    #[arg(long, default_value = "figures/signal_comparison.png")]
    figure: PathBuf,

    /// Number of random walkers
    #[arg(long, default_value_t = 10_000)]
    walkers: u64,

    /// Simulated time steps
    #[arg(long, default_value_t = DEFAULT_STEPS)]
    steps: u64,

    /// Camino signals were written little-endian
    #[arg(long)]
    little_endian: bool,

    /// Also write a JSON summary here
    #[arg(long)]
    summary: Option<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::NormalizeMesh(args) => normalize_mesh(&args),
        Command::Runtime(args) => runtime(&args),
        Command::Signals(args) => signals(&args),
    }
}

fn normalize_mesh(args: &NormalizeArgs) -> Result<()> {
    let options = NormalizeOptions { scale: args.scale };
    let report = normalize_file(&args.input, &args.output, &options)
        .with_context(|| format!("failed to normalize {}", args.input.display()))?;

    println!(
        "shift = [{}, {}, {}]",
        report.shift.x, report.shift.y, report.shift.z
    );
    println!(
        "wrote {} vertices ({} lines) to {}",
        report.vertex_count,
        report.line_count,
        report.output.display()
    );
    Ok(())
}

fn runtime(args: &RuntimeArgs) -> Result<()> {
    let config = RuntimeConfig {
        decades: args.decades,
        measured: args.measured,
        steps: args.steps,
    };
    let analysis = RuntimeComparison::load(&ResultPaths::new(&args.results), &config)
        .context("failed to load runtimes")?
        .analyze()?;

    figures::render_runtime(&analysis, &args.figure, &FigureStyle::from(&args.style))?;
    if let Some(path) = &args.summary {
        summary::write(path, &summary::RuntimeSummary::new(&analysis, &args.figure))?;
    }

    match analysis.max_speedup() {
        Some(best) => println!(
            "max extrapolated speed-up: {:.1}x at {} walkers",
            best.speedup, best.walkers
        ),
        None => warn!("every walker count was measured; nothing to extrapolate"),
    }
    Ok(())
}

fn signals(args: &SignalArgs) -> Result<()> {
    let config = SignalConfig {
        walkers: args.walkers,
        steps: args.steps,
        endianness: if args.little_endian {
            Endianness::Little
        } else {
            Endianness::Big
        },
        ..SignalConfig::default()
    };
    let analysis = SignalComparison::load(&ResultPaths::new(&args.results), &config)
        .context("failed to load signals")?
        .analyze();

    figures::render_signals(&analysis, &args.figure, &FigureStyle::from(&args.style))?;
    if let Some(path) = &args.summary {
        let summary = summary::SignalSummary {
            figure: &args.figure,
            walkers: args.walkers,
            analysis: &analysis,
        };
        summary::write(path, &summary)?;
    }

    println!(
        "max |S/S0| difference: {:.3e} at b = {:.2} ms/um^2",
        analysis.max_abs_difference, analysis.max_difference_b
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_reproduce_original_paths() {
        let cli = Cli::try_parse_from(["walkbench", "normalize-mesh"]).unwrap();
        let Command::NormalizeMesh(args) = cli.command else {
            panic!("expected normalize-mesh");
        };
        assert_eq!(args.input, PathBuf::from("original_mesh.ply"));
        assert_eq!(args.output, PathBuf::from("neuron-model.ply"));
        assert!((args.scale - 1e-6).abs() < f64::EPSILON);

        let cli = Cli::try_parse_from(["walkbench", "runtime"]).unwrap();
        let Command::Runtime(args) = cli.command else {
            panic!("expected runtime");
        };
        assert_eq!(args.figure, PathBuf::from("figures/runtime_comparison.png"));
        assert_eq!((args.decades, args.measured, args.steps), (7, 5, 10_000));
        assert_eq!(FigureStyle::from(&args.style), FigureStyle::default());
    }

    #[test]
    fn signal_options_parse() {
        let cli = Cli::try_parse_from([
            "walkbench",
            "signals",
            "--walkers",
            "1000",
            "--little-endian",
            "--dpi",
            "150",
            "--summary",
            "out/signals.json",
        ])
        .unwrap();
        let Command::Signals(args) = cli.command else {
            panic!("expected signals");
        };
        assert_eq!(args.walkers, 1000);
        assert!(args.little_endian);
        assert_eq!(args.style.dpi, 150);
        assert_eq!(args.summary, Some(PathBuf::from("out/signals.json")));
    }

    #[test]
    fn zero_dpi_is_rejected() {
        assert!(Cli::try_parse_from(["walkbench", "runtime", "--dpi", "0"]).is_err());
    }

    #[test]
    fn decades_are_bounded_by_walker_range() {
        assert!(Cli::try_parse_from(["walkbench", "runtime", "--decades", "20"]).is_ok());
        assert!(Cli::try_parse_from(["walkbench", "runtime", "--decades", "21"]).is_err());
        assert!(Cli::try_parse_from(["walkbench", "runtime", "--decades", "0"]).is_err());
    }
}

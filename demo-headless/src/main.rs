use clap::Parser;
use comfort_sim_core::{
    evaluate_typologies, AnalysisPeriod, BoundaryConditions, CachePolicy, Result, SpatialComfort,
    SpatialConfig, TypologyCatalog, UtciSummary,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Outdoor comfort demo over a sensor-grid simulation
#[derive(Parser, Debug)]
#[command(name = "comfort-sim-demo")]
#[command(about = "Spatial and typology UTCI comfort demo", long_about = None)]
struct Args {
    /// Boundary conditions JSON (annual hourly series)
    #[arg(short, long)]
    boundary: PathBuf,

    /// Sensor-grid simulation directory; skips the spatial run when absent
    #[arg(short, long)]
    simulation_dir: Option<PathBuf>,

    /// Spatial configuration JSON (defaults when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use cached matrices without checking their inputs
    #[arg(long)]
    trust_cache: bool,

    /// Worker threads for typology evaluation (0 = one per core)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Analysis period start month (1-12)
    #[arg(long, default_value_t = 1)]
    start_month: u32,

    /// Analysis period end month (1-12)
    #[arg(long, default_value_t = 12)]
    end_month: u32,

    /// Analysis period start hour (0-23)
    #[arg(long, default_value_t = 0)]
    start_hour: u32,

    /// Analysis period end hour (0-23)
    #[arg(long, default_value_t = 23)]
    end_hour: u32,

    /// Month of the typical-hour UTCI map (1-12)
    #[arg(long, default_value_t = 6)]
    month: u32,

    /// Hour of the typical-hour UTCI map (0-23)
    #[arg(long, default_value_t = 12)]
    hour: u32,

    /// Evaluate typologies by name; with no names, the whole catalog
    #[arg(short, long, num_args = 0..)]
    typologies: Option<Vec<String>>,

    /// Custom typology catalog JSON instead of the presets
    #[arg(long)]
    typologies_file: Option<PathBuf>,

    /// Print typology summaries as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(&Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Comfort simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    println!("=== Outdoor Comfort Demo ===\n");

    let mut config = match &args.config {
        Some(path) => SpatialConfig::from_json_file(path)?,
        None => SpatialConfig::default(),
    };
    if args.trust_cache {
        config.cache_policy = CachePolicy::Trust;
    }
    if let Some(workers) = args.workers {
        config.worker_threads = workers;
    }

    let boundary = BoundaryConditions::from_json_file(&args.boundary)?;
    let period = AnalysisPeriod::new(args.start_month, args.end_month, args.start_hour, args.end_hour)?;
    println!("Analysis period: {}", period.describe());
    println!(
        "Comfort limits: {}°C to {}°C\n",
        config.comfort_limits.low, config.comfort_limits.high
    );

    if let Some(dir) = &args.simulation_dir {
        run_spatial(dir, boundary.clone(), config.clone(), &period, args)?;
    }

    if let Some(names) = &args.typologies {
        run_typologies(&boundary, &config, &period, names, args)?;
    }

    Ok(())
}

fn run_spatial(
    dir: &Path,
    boundary: BoundaryConditions,
    config: SpatialConfig,
    period: &AnalysisPeriod,
    args: &Args,
) -> Result<()> {
    let comfort = SpatialComfort::new(dir, boundary, config)?;
    println!(
        "Simulation: {} ({} moisture sources)",
        comfort.simulation_dir().display(),
        comfort.moisture_sources().len()
    );
    let result = comfort.into_result();
    println!("Sensor points: {}\n", result.n_points()?);

    let matrices = [
        ("Mean radiant temperature", result.mean_radiant_temperature()?),
        ("Dry bulb temperature", result.dry_bulb_temperature()?),
        ("Relative humidity", result.relative_humidity()?),
        ("Wind speed", result.wind_speed()?),
        ("UTCI", result.universal_thermal_climate_index()?),
    ];
    for (name, matrix) in matrices {
        let values: Vec<f64> = matrix.values().iter().map(|&v| f64::from(v)).collect();
        let (min, max, mean) = stats(&values);
        println!("{name:<26} min {min:>7.2}  mean {mean:>7.2}  max {max:>7.2}");
    }

    let comfortable = result.comfortable_hours(period, true)?;
    println!("\n--- Time comfortable ({}) ---", period.describe());
    for (point, percent) in result.points()?.iter().zip(&comfortable) {
        println!("  ({:>8.2}, {:>8.2})  {percent:>5.1}%", point.x, point.y);
    }
    let (min, max, mean) = stats(&comfortable);
    println!("  min {min:.1}%  mean {mean:.1}%  max {max:.1}%");

    let typical = result.typical_utci(args.month, args.hour)?;
    let (min, max, mean) = stats(&typical);
    println!("\n--- Typical UTCI, month {} at {:02}:00 ---", args.month, args.hour);
    println!("  min {min:.1}°C  mean {mean:.1}°C  max {max:.1}°C\n");
    Ok(())
}

fn run_typologies(
    boundary: &BoundaryConditions,
    config: &SpatialConfig,
    period: &AnalysisPeriod,
    names: &[String],
    args: &Args,
) -> Result<()> {
    let catalog = match &args.typologies_file {
        Some(path) => TypologyCatalog::from_json_file(path)?,
        None => TypologyCatalog::presets()?,
    };
    let selected = if names.is_empty() {
        catalog.typologies().to_vec()
    } else {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            match catalog.get(name) {
                Some(t) => selected.push(t.clone()),
                None => println!("Unknown typology '{}', skipping (known: {})", name, catalog.names().join(", ")),
            }
        }
        selected
    };

    let results = evaluate_typologies(&selected, boundary, config)?;
    let summaries = results
        .iter()
        .map(|r| Ok((r.typology.name.clone(), r.summary(period, config)?)))
        .collect::<Result<Vec<(String, UtciSummary)>>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for (name, summary) in &summaries {
        println!("--- {name} ---");
        println!("{summary}\n");
    }
    Ok(())
}

/// (min, max, mean) of a non-empty slice
fn stats(values: &[f64]) -> (f64, f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
    (min, max, mean)
}

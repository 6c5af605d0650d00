use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use podsim::algorithm::default_algorithm_resolver;
use podsim::config::{Config, RawConfig};
use podsim::metrics::CsvMetricsWriter;
use podsim::simulation::Simulation;
use podsim::trace::JobTrace;

#[derive(Parser, Debug)]
#[command(author, version, about = "Job pool autoscaling simulator", long_about = None)]
struct Args {
    /// The CSV trace to load, or '-' for stdin.
    #[arg(short, long)]
    input: String,
    /// Path to a simulation config in YAML format. Command line options take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Multiplier applied to the forecast. Default: 1.0
    #[arg(short, long)]
    multiplier: Option<f64>,
    /// Target pickup seconds. Default: 300
    #[arg(short, long)]
    target: Option<f64>,
    /// Workers per pod. Default: 3
    #[arg(short, long)]
    workers: Option<usize>,
    /// Min pods. Default: 1
    #[arg(long)]
    min_pods: Option<usize>,
    /// Max pods. Default: 30
    #[arg(long)]
    max_pods: Option<usize>,
    /// Pod startup seconds. Default: 180
    #[arg(long)]
    startup: Option<f64>,
    /// Pod shutdown seconds. Default: 0
    #[arg(long)]
    shutdown: Option<f64>,
    /// Forecasting algorithm, e.g. percentile90_5, average5 or Percentile[percentile=0.9,lookback=600].
    #[arg(long)]
    algorithm: Option<String>,
    /// Write state interval in seconds. Default: 60
    #[arg(long)]
    write_state_interval: Option<f64>,
    /// Directory for kpis.csv and queueLengths.csv.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Verbose mode.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn raw_config(&self) -> RawConfig {
        RawConfig {
            target_pickup: self.target,
            workers_per_pod: self.workers,
            min_pods: self.min_pods,
            max_pods: self.max_pods,
            pod_startup_time: self.startup,
            pod_shutdown_time: self.shutdown,
            algorithm: self.algorithm.clone(),
            multiplier: self.multiplier,
            write_state_interval: self.write_state_interval,
        }
    }
}

fn print_parameters(config: &Config) {
    let s = &config.scaling;
    println!("Parameters:");
    println!("  target_pickup_s = {:.2}", s.target_pickup);
    println!("  workers_per_pod = {}", s.workers_per_pod);
    println!("         max_pods = {}", s.max_pods);
    println!("         min_pods = {}", s.min_pods);
    println!("        algorithm = {}", config.algorithm.name());
    println!(" pod_startup_time = {}", s.pod_startup_time);
    println!("pod_shutdown_time = {}", s.pod_shutdown_time);
    println!("       multiplier = {}", s.multiplier);
    println!();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = Builder::from_default_env();
    builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    if args.verbose {
        builder.filter_level(LevelFilter::Trace);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();

    let base = match &args.config {
        Some(path) => RawConfig::from_yaml(path)?,
        None => RawConfig::default(),
    };
    let config = Config::from_raw(base.merged_with(&args.raw_config()), &default_algorithm_resolver)?;

    let trace = if args.input == "-" {
        JobTrace::from_reader(std::io::stdin().lock())?
    } else {
        JobTrace::from_path(&PathBuf::from(&args.input))?
    };
    if trace.skipped_rows() > 0 {
        log::warn!("skipped {} malformed rows", trace.skipped_rows());
    }

    print_parameters(&config);
    let mut sim = Simulation::new(config);
    sim.load_trace(&trace);
    let writer = CsvMetricsWriter::create(&args.output_dir)
        .with_context(|| format!("cannot create metrics files in {}", args.output_dir.display()))?;
    sim.add_observer(Box::new(writer));

    match sim.run() {
        Some(summary) => summary.print_summary(),
        None => println!("no events"),
    }
    Ok(())
}

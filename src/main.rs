//! anofox-stream - anomaly detection on a simulated periodic stream.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime or configuration error

mod cli;

use anofox_stream::config::{Config, DEFAULT_CONFIG_FILE};
use anofox_stream::report::{write_report, Report};
use anofox_stream::utils::MetricsAccumulator;
use anyhow::{Context, Result};
use cli::Args;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config(Path::new(DEFAULT_CONFIG_FILE)) {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);

    info!("anofox-stream v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args, io::stdout().lock()) {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: write a default configuration to `path`.
fn handle_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            path.display()
        );
    }

    let content = Config::default_toml().context("Failed to render default configuration")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {} with default settings.", path.display());
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over the verbosity flags. Logs go to stderr so
/// that reports on stdout stay machine-readable.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Build the simulation, run it and write the report to `--output` or `stdout`.
///
/// Metrics cover every generated sample; the points in the report are the
/// retained window.
fn run<W: Write>(args: &Args, stdout: W) -> Result<()> {
    let start = Instant::now();

    let mut config = Config::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let mut sim = config
        .build_simulation()
        .context("Failed to build simulation")?;
    info!(
        detector = sim.detector_name(),
        steps = args.steps,
        delta = config.simulation.delta,
        every_n = config.simulation.every_n_sample,
        "Starting simulation"
    );

    let mut metrics = MetricsAccumulator::new();
    sim.run(args.steps, args.batch_size, |batch| {
        metrics.extend(batch);
        Ok(())
    })?;

    let report = Report::new(&sim, metrics.finish());
    if let Some(m) = &report.metrics {
        info!(
            flagged = m.flagged(),
            injected = m.injected(),
            precision = m.precision(),
            recall = m.recall(),
            "Simulation finished"
        );
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_report(args.format, &report, &mut out)?;
            out.flush()?;
            info!("Report written to {}", path.display());
        }
        None => {
            let mut out = stdout;
            write_report(args.format, &report, &mut out)?;
            out.flush()?;
        }
    }

    debug!("Completed in {:.2?}", start.elapsed());
    Ok(())
}

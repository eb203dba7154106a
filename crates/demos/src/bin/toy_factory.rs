use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;
use tf_pipeline::{Factory, FactoryConfig, ItemGenerator};
use tf_runtime::init_tracing;
use tf_runtime::metrics::RunTimer;
use tf_timing::{RandomSource, SeededRandom, DEFAULT_TIME_SCALE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Toy factory pipeline simulation", long_about = None)]
struct Cli {
    /// Number of toys fed into the assembly station
    #[arg(long, default_value_t = 5)]
    items: u32,
    /// Seed for colors and dwell times; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Real seconds slept per simulated second
    #[arg(long, default_value_t = DEFAULT_TIME_SCALE)]
    time_scale: f64,
    /// Run each station on its own worker thread
    #[arg(long)]
    concurrent: bool,
    /// Print finished items and the metrics snapshot as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    ensure!(cli.time_scale >= 0.0, "--time-scale must not be negative");

    let cfg = FactoryConfig { seed: cli.seed, time_scale: cli.time_scale };
    info!(?cfg, items = cli.items, concurrent = cli.concurrent, "toy_factory starting");

    let mut colors: Box<dyn RandomSource> = match cfg.seed {
        Some(seed) => Box::new(SeededRandom::from_seed(seed.wrapping_add(1))),
        None => Box::new(SeededRandom::from_entropy()),
    };
    let mut generator = ItemGenerator::new();
    let mut factory = Factory::new(&cfg);

    for _ in 0..cli.items {
        let item = generator
            .next_item(colors.as_mut())
            .context("failed to create toy")?;
        println!("{}", item.describe());
        factory.inject(item);
    }

    let timer = RunTimer::start();
    let done = if cli.concurrent {
        factory.run_pipeline_concurrent()
    } else {
        factory.run_pipeline()
    };
    let elapsed = timer.elapsed();

    for item in &done {
        println!("{} completed: {}", item.describe(), item.completed_stages().join(" -> "));
        if cli.json {
            println!("{}", item.to_json().context("failed to encode toy")?);
        }
    }

    let snapshot = factory.metrics().snapshot();
    if cli.json {
        println!("{}", snapshot.to_json_line("final", Some(elapsed)));
    }
    info!(?snapshot, elapsed_ms = elapsed.as_millis(), "toy_factory finished");
    Ok(())
}

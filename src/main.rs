use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;

use parking_sim::simulation::{reference_config, ActivationOrder, SimConfig, SimWorld};

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Fixed,
    Shuffled,
}

impl From<OrderArg> for ActivationOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Fixed => ActivationOrder::Fixed,
            OrderArg::Shuffled => ActivationOrder::Shuffled,
        }
    }
}

#[derive(Parser)]
#[command(name = "parking_sim")]
#[command(about = "Grid traffic simulation of cars looking for parking")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "200")]
    ticks: u64,

    /// Seed for every random decision; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// JSON map configuration; the built-in reference map when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Activation order within a tick, overriding the configuration
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Print the world every N ticks (0 prints only the initial and final state)
    #[arg(long, default_value = "50")]
    report_every: u64,

    /// Print the final snapshot as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Skip drawing the map
    #[arg(long)]
    quiet_map: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    run_headless(&cli, &config)
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SimConfig::from_json_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => reference_config(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(order) = cli.order {
        config.activation_order = order.into();
    }
    Ok(config)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli, config: &SimConfig) -> Result<()> {
    let mut world = SimWorld::from_config(config).context("Failed to build world")?;
    info!("Running parking simulation for {} ticks", cli.ticks);

    if !cli.json {
        println!("Initial state:");
        report(&world, cli);
    }

    while world.tick_count() < cli.ticks {
        world
            .tick()
            .with_context(|| format!("Tick {} failed", world.tick_count() + 1))?;

        let tick = world.tick_count();
        if !cli.json && cli.report_every > 0 && tick % cli.report_every == 0 && tick < cli.ticks {
            println!("--- After tick {} ---", tick);
            report(&world, cli);
        }
    }

    if cli.json {
        println!("{}", world.snapshot().to_json()?);
    } else {
        println!("=== Final State ===");
        report(&world, cli);
    }

    world
        .stats()
        .log_summary(world.cars().count(), world.parking().len());
    Ok(())
}

fn report(world: &SimWorld, cli: &Cli) {
    world.print_summary();
    if !cli.quiet_map {
        world.draw_map();
    }
    println!();
}

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use evac_sim::simulation::{HazardKind, NeighborSearch, Position, SimWorld};

#[derive(Parser)]
#[command(name = "evac_sim")]
#[command(about = "Headless crowd evacuation simulation")]
struct Cli {
    /// Maximum number of simulation ticks to run
    #[arg(long, default_value = "5000")]
    ticks: u32,

    /// Global simulation speed scale (0.5 to 3.0)
    #[arg(long, default_value = "1.0")]
    speed: f32,

    /// Seed for reproducible agent placement
    #[arg(long)]
    seed: Option<u64>,

    /// Place a fire in the office before starting
    #[arg(long)]
    hazard: bool,

    /// Use a full neighbour scan instead of the spatial grid
    #[arg(long)]
    scan: bool,

    /// Print a summary every this many ticks
    #[arg(long, default_value = "600")]
    report_every: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,evac_sim=info"))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_headless(&cli) {
        error!("Simulation failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Run the demo evacuation without any graphics
fn run_headless(cli: &Cli) -> Result<()> {
    println!("Running evacuation simulation in headless mode...");
    println!("Max ticks: {}, Speed: {:.1}x", cli.ticks, cli.speed);
    println!();

    let mut world = match cli.seed {
        Some(seed) => SimWorld::create_demo_world_with_seed(seed),
        None => SimWorld::create_demo_world(),
    };
    world.set_speed_scale(cli.speed)?;
    if cli.scan {
        world.config.neighbor_search = NeighborSearch::Scan;
    }
    if cli.hazard {
        world.place_hazard(HazardKind::Fire, Position::new(150.0, 375.0))?;
    }

    println!("Initial state:");
    world.print_summary();
    println!();

    world.start()?;

    let report_every = cli.report_every.max(1);
    for tick in 1..=cli.ticks {
        let report = world.tick();

        for event in &report.group_events {
            println!(
                "Group {:?} evacuated at {:.1}s",
                event.group.0 .0, event.time
            );
        }

        if report.finished {
            break;
        }

        if tick % report_every == 0 {
            println!(
                "--- After tick {} ({:.1}s simulated time) ---",
                tick,
                world.elapsed()
            );
            world.print_summary();
            println!();
        }
    }

    let progress = world.progress();
    let groups = world.group_summaries();
    info!("=== SIMULATION COMPLETE ===");
    info!("Elapsed time: {:.2}s", world.elapsed());
    info!("Total agents: {}", progress.total);
    info!("Evacuated: {}", progress.evacuated);
    info!(
        "Groups evacuated: {}/{}",
        groups.iter().filter(|g| g.all_evacuated()).count(),
        groups.len()
    );
    info!("Success rate: {:.1}%", progress.percent());

    println!("=== Final State ===");
    world.print_summary();

    Ok(())
}

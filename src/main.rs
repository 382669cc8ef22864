//! Circle Diagram - Entry Point
//!
//! Generates a map from a TOML request or command-line flags, optionally
//! seeds it and runs diffusion epochs, then prints a summary and preview.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use circle_diagram::core::config::{parse_weights, MapRequest};
use circle_diagram::core::error::Result;
use circle_diagram::epoch::{EpochController, InMemoryRepository, Map};
use circle_diagram::output::{text_preview, MapSnapshot};
use circle_diagram::simulation::{CellMap, DiffusionStats};
use circle_diagram::{EngineConfig, GridConfig};

/// Zone placement and token diffusion on a discrete grid
#[derive(Parser, Debug)]
#[command(name = "circle-diagram")]
#[command(about = "Place spawn/bedroom zones, fill the grid with tokens and diffuse them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place circles and print the layout
    Generate(Shared),
    /// Place circles and seed tokens
    Distribute {
        #[command(flatten)]
        shared: Shared,
        /// Comma-separated probability weights, e.g. "90,10"
        #[arg(long)]
        probs: Option<String>,
    },
    /// Place, seed and advance a number of epochs
    Simulate {
        #[command(flatten)]
        shared: Shared,
        /// Comma-separated probability weights, e.g. "90,10"
        #[arg(long)]
        probs: Option<String>,
        /// Comma-separated movement percentages, e.g. "50,20"
        #[arg(long)]
        speeds: Option<String>,
        /// Number of epochs to advance
        #[arg(long, default_value_t = 1)]
        epochs: u32,
    },
}

#[derive(Args, Debug)]
struct Shared {
    /// Map request TOML (defaults to built-in grid settings)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Map name
    #[arg(long)]
    name: Option<String>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<i32>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<i32>,

    /// Number of spawn circles
    #[arg(long)]
    spawns: Option<i32>,

    /// Number of bedroom circles
    #[arg(long)]
    bedrooms: Option<i32>,

    /// Spawn circle radius
    #[arg(long)]
    spawn_radius: Option<i32>,

    /// Bedroom circle radius
    #[arg(long)]
    bedroom_radius: Option<i32>,

    /// Largest allowed gap to the nearest neighbour
    #[arg(long)]
    max_gap: Option<i32>,

    /// Fail when a circle is farther than max_gap from every other
    #[arg(long)]
    strict_gap: bool,

    /// Skip the text preview
    #[arg(long)]
    no_preview: bool,

    /// Write the final snapshot as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Shared {
    fn request(&self) -> Result<MapRequest> {
        let mut request = match &self.config {
            Some(path) => MapRequest::load_from_toml(path)?,
            None => MapRequest {
                name: None,
                seed: None,
                grid: GridConfig::default(),
                engine: EngineConfig::default(),
                probabilities: None,
                speeds: None,
            },
        };

        let grid = &mut request.grid;
        let overrides = [
            (&mut grid.width, self.width),
            (&mut grid.height, self.height),
            (&mut grid.spawn_count, self.spawns),
            (&mut grid.bedroom_count, self.bedrooms),
            (&mut grid.spawn_radius, self.spawn_radius),
            (&mut grid.bedroom_radius, self.bedroom_radius),
            (&mut grid.max_gap, self.max_gap),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        if self.strict_gap {
            request.engine.strict_gap = true;
        }
        if self.seed.is_some() {
            request.seed = self.seed;
        }
        if self.name.is_some() {
            request.name = self.name.clone();
        }

        request.validate()?;
        Ok(request)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("circle_diagram=info")),
        )
        .init();

    if let Err(err) = run(Cli::parse()) {
        tracing::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(shared) => {
            let request = shared.request()?;
            let (controller, map) = create(&request)?;
            let cells = controller.cells(map.id)?.unwrap_or_default();
            report(&shared, controller.map(map.id)?, &cells, None)
        }
        Command::Distribute { shared, probs } => {
            let request = shared.request()?;
            let probabilities = probabilities(&request, probs.as_deref())?;
            let (mut controller, map) = create(&request)?;
            let cells = controller.seed_distribution(map.id, &probabilities)?;
            report(&shared, controller.map(map.id)?, &cells, None)
        }
        Command::Simulate {
            shared,
            probs,
            speeds,
            epochs,
        } => {
            let request = shared.request()?;
            let probabilities = probabilities(&request, probs.as_deref())?;
            let speeds = match speeds.as_deref() {
                Some(text) => parse_weights(text)?,
                None => request.speeds.clone().unwrap_or_default(),
            };

            let (mut controller, map) = create(&request)?;
            let mut cells = controller.seed_distribution(map.id, &probabilities)?;
            if !speeds.is_empty() {
                controller.set_speeds(map.id, &speeds)?;
            }

            let mut last_step = None;
            for _ in 0..epochs {
                let outcome = controller.advance_epoch(map.id)?;
                println!(
                    "Epoch {}: {} moved, {} stayed, {} blocked",
                    outcome.epoch, outcome.stats.moved, outcome.stats.stayed, outcome.stats.blocked
                );
                last_step = Some(outcome.stats);
                cells = outcome.cells;
            }
            report(&shared, controller.map(map.id)?, &cells, last_step)
        }
    }
}

fn create(request: &MapRequest) -> Result<(EpochController<InMemoryRepository>, Map)> {
    let seed = request.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "Generating map");

    let mut controller =
        EpochController::new(InMemoryRepository::new(), request.engine.clone(), seed);
    let name = request.name.clone().unwrap_or_default();
    let map = controller.create_map(&name, request.grid)?;
    Ok((controller, map))
}

fn probabilities(request: &MapRequest, flag: Option<&str>) -> Result<Vec<f64>> {
    Ok(match flag {
        Some(text) => parse_weights(text)?,
        None => request
            .probabilities
            .clone()
            .unwrap_or_else(|| request.engine.default_probabilities.clone()),
    })
}

fn report(
    shared: &Shared,
    map: Map,
    cells: &CellMap,
    last_step: Option<DiffusionStats>,
) -> Result<()> {
    if !shared.no_preview {
        print!("{}", text_preview(&map.kinds(), cells));
    }

    let snapshot = MapSnapshot::new(map, cells.to_cells(), last_step);
    println!("{}", snapshot.summary());

    if let Some(path) = &shared.output {
        std::fs::write(path, snapshot.to_json()?)?;
        println!("Snapshot written to {}", path.display());
    }
    Ok(())
}

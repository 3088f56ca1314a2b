// main.rs - Command-line front end for toroid_life

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use toroid_life::{
    BackendKind, ConsoleRenderer, Figure, Grid, PopulateConfig, Simulation, SimulationConfig, WorkerPool,
    entropy, logging, persist, populate, report,
};

#[derive(Parser)]
#[command(name = "toroid_life", version, about = "Toroidal Game of Life with scalar and GPU backends")]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Populate {
    /// Leave the world empty
    None,
    /// Uniform random 0/1 per cell
    Simple,
    /// Stamp figures until the target entropy, one at a time
    Entropy,
    /// Stamp figures until the target entropy on every worker
    Parallel,
}

#[derive(Subcommand)]
enum Command {
    /// Create a world, optionally populate it, and save it
    New {
        #[arg(long)]
        height: usize,
        #[arg(long)]
        width: usize,
        #[arg(long, value_enum, default_value_t = Populate::None)]
        populate: Populate,
        #[arg(long, default_value_t = 0.7)]
        target_entropy: f64,
        #[arg(long, default_value_t = 10_000)]
        max_iterations: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Load a world and run generations on it
    Run {
        file: PathBuf,
        #[arg(short = 'n', long, default_value_t = 100)]
        generations: usize,
        /// "CL" selects the GPU backend, anything else the scalar one
        #[arg(short, long, default_value = "scalar")]
        mode: String,
        /// Print the grid before every generation
        #[arg(long)]
        display: bool,
        /// Print raw values and neighbour counts instead of glyphs
        #[arg(long)]
        debug: bool,
        #[arg(long, default_value_t = 200)]
        delay_ms: u64,
        /// Save the final generation here
        #[arg(long)]
        save: Option<PathBuf>,
        /// Append per-generation timings to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Stamp a figure (Glider, Toad, Beacon, Methuselah) at x y
    Stamp {
        file: PathBuf,
        figure: String,
        #[arg(allow_hyphen_values = true)]
        x: i64,
        #[arg(allow_hyphen_values = true)]
        y: i64,
        /// Write here instead of overwriting the input
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Read or write a single cell
    Cell {
        #[command(subcommand)]
        action: CellAction,
    },
    /// Print the Shannon entropy of a world
    Entropy { file: PathBuf },
}

#[derive(Subcommand)]
enum CellAction {
    Get {
        file: PathBuf,
        #[arg(allow_hyphen_values = true)]
        x: i64,
        #[arg(allow_hyphen_values = true)]
        y: i64,
    },
    Set {
        file: PathBuf,
        #[arg(allow_hyphen_values = true)]
        x: i64,
        #[arg(allow_hyphen_values = true)]
        y: i64,
        /// 0 or 1
        state: u8,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(e) = execute(cli.command) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn load(path: &Path) -> Result<Grid> {
    persist::load_path(path).with_context(|| format!("loading {}", path.display()))
}

fn save(grid: &Grid, path: &Path) -> Result<()> {
    persist::save_path(grid, path).with_context(|| format!("saving {}", path.display()))
}

fn execute(command: Command) -> Result<()> {
    match command {
        Command::New { height, width, populate: mode, target_entropy, max_iterations, seed, out } => {
            let mut grid = Grid::new(height, width)?;
            let mut config = PopulateConfig::default()
                .with_target_entropy(target_entropy)
                .with_max_iterations(max_iterations);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            match mode {
                Populate::None => {}
                Populate::Simple => {
                    let mut rng = match seed {
                        Some(seed) => StdRng::seed_from_u64(seed),
                        None => StdRng::from_entropy(),
                    };
                    populate::scatter(&mut grid, &mut rng);
                }
                Populate::Entropy => {
                    populate::populate_serial(&mut grid, &config);
                }
                Populate::Parallel => {
                    let pool = WorkerPool::new()?;
                    populate::populate_concurrent(&mut grid, &pool, &config)?;
                }
            }
            info!(live = grid.live_cells(), entropy = entropy::shannon_entropy(grid.present()), "world created");
            save(&grid, &out)
        }

        Command::Run { file, generations, mode, display, debug, delay_ms, save: save_to, report: report_to } => {
            let grid = load(&file)?;
            let config = SimulationConfig::default()
                .with_display(display)
                .with_debug(debug)
                .with_frame_delay(Duration::from_millis(delay_ms));
            let mut sim = Simulation::new(grid, config);
            let mut renderer = ConsoleRenderer::stdout();

            let outcome = sim
                .run(generations, BackendKind::from_mode(&mode), Some(&mut renderer))
                .context("simulation aborted")?;
            if let Some(notice) = &outcome.notice {
                println!("{notice}");
            }
            println!(
                "{} generations on {} backend, stopped: {:?}",
                outcome.generations, outcome.backend, outcome.state
            );
            report::write_summary(sim.record(), std::io::stdout().lock())?;

            if let Some(path) = report_to {
                report::append_record(sim.record(), &path)
                    .with_context(|| format!("writing report {}", path.display()))?;
            }
            if let Some(path) = save_to {
                save(sim.grid(), &path)?;
            }
            Ok(())
        }

        Command::Stamp { file, figure, x, y, out } => {
            let mut grid = load(&file)?;
            let figure: Figure = figure.parse()?;
            figure.stamp(&mut grid, x, y);
            let (nx, ny) = grid.normalize(x, y);
            info!(%figure, x = nx, y = ny, "figure stamped");
            save(&grid, out.as_deref().unwrap_or(&file))
        }

        Command::Cell { action: CellAction::Get { file, x, y } } => {
            let grid = load(&file)?;
            println!("{}", grid.get(x, y) as u8);
            Ok(())
        }

        Command::Cell { action: CellAction::Set { file, x, y, state } } => {
            if state > 1 {
                bail!("cell state must be 0 or 1, got {state}");
            }
            let mut grid = load(&file)?;
            grid.set(x, y, state == 1);
            save(&grid, &file)
        }

        Command::Entropy { file } => {
            let grid = load(&file)?;
            let pool = WorkerPool::new()?;
            let value = entropy::shannon_entropy_parallel(&pool, grid.present())?;
            println!("{value:.6}");
            Ok(())
        }
    }
}

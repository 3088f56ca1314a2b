// main.rs - Desktop viewer for toroid_life

use anyhow::{Result, anyhow};
use clap::Parser;
use eframe::egui;
use tracing::info;

use toroid_life::{BackendKind, Grid, logging, persist};

mod app;
mod ui;

use app::LifeView;

#[derive(Parser)]
#[command(name = "life_view", version, about = "Interactive toroidal Game of Life")]
struct Args {
    /// Start from a saved grid instead of an empty one
    file: Option<std::path::PathBuf>,
    #[arg(long, default_value_t = 50)]
    height: usize,
    #[arg(long, default_value_t = 50)]
    width: usize,
    /// "CL" selects the GPU backend, anything else the scalar one
    #[arg(short, long, default_value = "scalar")]
    mode: String,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let grid = match &args.file {
        Some(path) => persist::load_path(path)?,
        None => Grid::new(args.height, args.width)?,
    };
    info!(height = grid.height(), width = grid.width(), mode = %args.mode, "starting viewer");
    let view = LifeView::new(grid, BackendKind::from_mode(&args.mode))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 960.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Toroidal Game of Life",
        options,
        Box::new(|_cc| Box::new(view)),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

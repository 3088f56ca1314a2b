// app.rs - Viewer state and the operations behind the controls

use std::time::{Duration, Instant};

use anyhow::Result;
use egui::Color32;
use tracing::{info, warn};

use toroid_life::backend::{self, Selection};
use toroid_life::{
    Backend, BackendKind, Figure, Grid, PopulateConfig, Simulation, SimulationConfig, WorkerPool, entropy, populate,
};

pub struct LifeView {
    sim: Simulation,
    backend: Box<dyn Backend>,
    pool: WorkerPool,
    pub is_running: bool,
    pub last_update: Instant,
    pub update_interval: Duration,
    pub live_color: Color32,
    pub dead_color: Color32,
    pub selected_figure: Figure,
    pub status: String,
}

impl LifeView {
    pub fn new(grid: Grid, requested: BackendKind) -> Result<Self> {
        let Selection { backend, notice } = backend::select(requested, grid.dims())?;
        let status = match notice {
            Some(notice) => notice.to_string(),
            None => format!("{} backend", backend.kind()),
        };
        Ok(Self {
            sim: Simulation::new(grid, SimulationConfig::default()),
            backend,
            pool: WorkerPool::new()?,
            is_running: false,
            last_update: Instant::now(),
            update_interval: SimulationConfig::default().frame_delay,
            live_color: Color32::from_rgb(0, 200, 0),
            dead_color: Color32::from_rgb(40, 40, 40),
            selected_figure: Figure::Glider,
            status,
        })
    }

    pub fn grid(&self) -> &Grid { self.sim.grid() }
    pub fn generation(&self) -> usize { self.sim.generation() }

    pub fn entropy(&self) -> f64 {
        entropy::shannon_entropy(self.sim.grid().present())
    }

    /// One generation. Stops the run once the grid settles or the device fails.
    pub fn step(&mut self) {
        match self.sim.step_with(self.backend.as_mut()) {
            Ok(true) => {
                self.is_running = false;
                self.status = format!("stable after generation {}", self.sim.generation());
                info!(generation = self.sim.generation(), "stable, pausing");
            }
            Ok(false) => {}
            Err(e) => {
                self.is_running = false;
                self.status = format!("stopped: {e}");
                warn!("step failed: {e}");
            }
        }
    }

    pub fn clear(&mut self) {
        self.sim.grid_mut().clear();
        self.status = "cleared".to_string();
    }

    /// Stamps the selected figure at the centre of the torus.
    pub fn stamp_selected(&mut self) {
        let grid = self.sim.grid_mut();
        let (cx, cy) = ((grid.width() / 2) as i64, (grid.height() / 2) as i64);
        self.selected_figure.stamp(grid, cx, cy);
        self.status = format!("stamped {}", self.selected_figure);
    }

    /// Stamps random figures from every worker until the target entropy.
    pub fn populate(&mut self) {
        match populate::populate_concurrent(self.sim.grid_mut(), &self.pool, &PopulateConfig::default()) {
            Ok(report) => {
                self.status = format!(
                    "populated in {} stamps, entropy {:.3}",
                    report.iterations, report.entropy
                );
            }
            Err(e) => {
                self.status = format!("populate failed: {e}");
                warn!("populate failed: {e}");
            }
        }
    }

    pub fn toggle(&mut self, x: i64, y: i64) {
        let grid = self.sim.grid_mut();
        let alive = grid.get(x, y);
        grid.set(x, y, !alive);
    }
}

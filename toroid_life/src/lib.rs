//! Toroidal Game of Life with interchangeable scalar and GPU backends.
//!
//! A [`Grid`] holds three generation buffers (`past`, `present`, `future`)
//! on a torus. A [`Simulation`] advances it generation by generation on a
//! [`Backend`] selected per run and stops early once the pattern is a still
//! life or a period-2 oscillator. [`populate`] seeds the grid with figures
//! until its Shannon entropy reaches a target, serially or across a
//! [`WorkerPool`].
//!
//! # Example
//!
//! ```
//! use toroid_life::{BackendKind, Figure, Grid, RunState, Simulation, SimulationConfig};
//!
//! let mut grid = Grid::new(10, 10)?;
//! Figure::Glider.stamp(&mut grid, 5, 5);
//!
//! let mut sim = Simulation::new(grid, SimulationConfig::default());
//! let outcome = sim.run(4, BackendKind::from_mode("scalar"), None)?;
//! assert_eq!(outcome.state, RunState::StoppedBudget);
//! assert_eq!(sim.record().len(), 4);
//! # Ok::<(), toroid_life::LifeError>(())
//! ```

pub mod backend;
pub mod config;
pub mod driver;
pub mod entropy;
pub mod error;
pub mod grid;
pub mod logging;
pub mod neighbors;
pub mod patterns;
pub mod persist;
pub mod pool;
pub mod populate;
pub mod render;
pub mod report;
pub mod rules;
pub mod stability;

pub use backend::{Backend, BackendKind, FallbackNotice, ScalarBackend, TILE};
#[cfg(feature = "gpu")]
pub use backend::OffloadBackend;
pub use config::{PopulateConfig, SimulationConfig};
pub use driver::{RunOutcome, RunState, Simulation};
pub use error::{LifeError, Result};
pub use grid::{ALIVE, Cell, DEAD, Dimensions, Grid};
pub use patterns::Figure;
pub use persist::LoadError;
pub use pool::WorkerPool;
pub use populate::PopulateReport;
pub use render::{ConsoleRenderer, Frame, Renderer};
pub use report::GenerationRecord;

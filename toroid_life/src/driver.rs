// driver.rs - Runs generations on the selected backend until stable or out of budget

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::backend::{self, Backend, BackendKind, FallbackNotice};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::neighbors::count_neighbors;
use crate::render::{Frame, Renderer};
use crate::report::GenerationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// `future` repeated `present` or `past`.
    StoppedStable,
    /// Requested generation count exhausted.
    StoppedBudget,
    /// The backend reported a device error; the run was abandoned.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub state: RunState,
    /// Generations advanced during this run.
    pub generations: usize,
    pub backend: BackendKind,
    pub notice: Option<FallbackNotice>,
}

/// Owns the grid and the timing record for a session.
pub struct Simulation {
    grid: Grid,
    config: SimulationConfig,
    record: GenerationRecord,
    state: RunState,
    generation: usize,
}

impl Simulation {
    pub fn new(grid: Grid, config: SimulationConfig) -> Self {
        Self {
            grid,
            config,
            record: GenerationRecord::new(),
            state: RunState::Idle,
            generation: 0,
        }
    }

    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn grid_mut(&mut self) -> &mut Grid { &mut self.grid }
    pub fn into_grid(self) -> Grid { self.grid }

    pub fn config(&self) -> &SimulationConfig { &self.config }
    pub fn set_config(&mut self, config: SimulationConfig) { self.config = config; }

    /// Timings of every generation advanced so far, across runs.
    pub fn record(&self) -> &GenerationRecord { &self.record }
    pub fn state(&self) -> RunState { self.state }
    pub fn generation(&self) -> usize { self.generation }

    /// Advances up to `generations` steps on the backend chosen by `requested`.
    pub fn run(
        &mut self,
        generations: usize,
        requested: BackendKind,
        renderer: Option<&mut dyn Renderer>,
    ) -> Result<RunOutcome> {
        let backend::Selection { backend, notice } = backend::select(requested, self.grid.dims())?;
        self.run_on(generations, backend, notice, renderer)
    }

    /// Advances up to `generations` steps on an already selected backend.
    ///
    /// The backend is consumed and dropped when this returns, so device
    /// resources are released on every path, including a device error.
    pub fn run_on(
        &mut self,
        generations: usize,
        mut backend: Box<dyn Backend>,
        notice: Option<FallbackNotice>,
        mut renderer: Option<&mut dyn Renderer>,
    ) -> Result<RunOutcome> {
        self.state = RunState::Running;
        info!(generations, backend = %backend.kind(), "simulation started");

        let mut advanced = 0;
        for _ in 0..generations {
            if self.config.display {
                if let Some(r) = renderer.as_deref_mut() {
                    self.render(r)?;
                    std::thread::sleep(self.config.frame_delay);
                }
            }

            let stable = match self.step_with(backend.as_mut()) {
                Ok(stable) => stable,
                Err(e) => {
                    self.state = RunState::Failed;
                    warn!(generation = self.generation, "run aborted: {e}");
                    return Err(e);
                }
            };
            if stable {
                self.state = RunState::StoppedStable;
                info!(generation = self.generation, "the system is stable, simulation stopped");
                break;
            }
            advanced += 1;

            if self.config.debug {
                debug!(generation = self.generation, "generation finished");
            }
        }

        if self.state == RunState::Running {
            self.state = RunState::StoppedBudget;
        }
        info!(advanced, state = ?self.state, total_ms = self.record.total().as_millis() as u64, "simulation finished");

        Ok(RunOutcome { state: self.state, generations: advanced, backend: backend.kind(), notice })
    }

    /// One generation: time the evolve call, check stability, record, rotate.
    ///
    /// Only `advance` is timed; the stability check (a second dispatch on the
    /// offload backend) is not part of the recorded duration. A stable step is
    /// neither recorded nor rotated, so `present` keeps the last generation
    /// before the repeat and the generation counter does not move.
    ///
    /// Returns whether the computed generation is stable.
    pub fn step_with(&mut self, backend: &mut dyn Backend) -> Result<bool> {
        let start = Instant::now();
        let (dims, present, future) = self.grid.split_for_advance();
        backend.advance(dims, present, future)?;
        let elapsed = start.elapsed();

        let stable = backend.check_stable(self.grid.past(), self.grid.present(), self.grid.future())?;
        if stable {
            debug!(generation = self.generation, "repeat detected, not advancing");
            return Ok(true);
        }
        self.record.push(elapsed);
        self.grid.rotate();
        self.generation += 1;
        debug!(generation = self.generation, elapsed_us = elapsed.as_micros() as u64, "advanced");
        Ok(false)
    }

    /// Hands the current `present` (and neighbour map in debug mode) to a renderer.
    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        let neighbors = self
            .config
            .debug
            .then(|| count_neighbors(self.grid.dims(), self.grid.present()));
        renderer.render(&Frame {
            generation: self.generation,
            dims: self.grid.dims(),
            present: self.grid.present(),
            neighbors: neighbors.as_deref(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScalarBackend;
    use crate::error::LifeError;
    use crate::grid::{Cell, Dimensions};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct CountingRenderer {
        frames: Vec<(usize, usize, bool)>,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
            let live = frame.present.iter().filter(|&&c| c == 1).count();
            self.frames.push((frame.generation, live, frame.neighbors.is_some()));
            Ok(())
        }
    }

    /// Fails every advance; raises `dropped` when released.
    #[derive(Default)]
    struct FailingBackend {
        dropped: Arc<AtomicBool>,
    }

    impl Drop for FailingBackend {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    impl Backend for FailingBackend {
        fn kind(&self) -> BackendKind { BackendKind::Offload }

        fn advance(&mut self, _: Dimensions, _: &[Cell], _: &mut [Cell]) -> Result<()> {
            Err(LifeError::Device("queue lost".into()))
        }

        fn check_stable(&mut self, _: &[Cell], _: &[Cell], _: &[Cell]) -> Result<bool> {
            Ok(false)
        }
    }

    fn blinker() -> Grid {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set_states(&[(1, 2, true), (2, 2, true), (3, 2, true)]);
        grid
    }

    #[test]
    fn empty_grid_stops_stable_on_first_step() {
        let mut sim = Simulation::new(Grid::new(8, 8).unwrap(), SimulationConfig::default());
        let outcome = sim.run(50, BackendKind::Scalar, None).unwrap();
        assert_eq!(outcome.state, RunState::StoppedStable);
        assert_eq!(outcome.generations, 0);
        assert_eq!(sim.generation(), 0);
        assert!(sim.record().is_empty());
    }

    #[test]
    fn blinker_stops_without_recording_the_repeat() {
        let mut sim = Simulation::new(blinker(), SimulationConfig::default());
        let outcome = sim.run(10, BackendKind::Scalar, None).unwrap();
        assert_eq!(outcome.state, RunState::StoppedStable);
        assert_eq!(outcome.generations, 1);
        assert_eq!(sim.record().len(), 1);
        // present is left in the vertical phase, the one before the repeat
        let grid = sim.grid();
        assert!(grid.get(2, 1) && grid.get(2, 2) && grid.get(2, 3));
        assert!(!grid.get(1, 2) && !grid.get(3, 2));
        assert_eq!(grid.live_cells(), 3);
    }

    #[test]
    fn budget_stops_a_moving_pattern() {
        let mut grid = Grid::new(10, 10).unwrap();
        crate::patterns::Figure::Glider.stamp(&mut grid, 5, 5);
        let mut sim = Simulation::new(grid, SimulationConfig::default());
        let outcome = sim.run(3, BackendKind::Scalar, None).unwrap();
        assert_eq!(outcome.state, RunState::StoppedBudget);
        assert_eq!(outcome.generations, 3);
        assert_eq!(sim.generation(), 3);
        assert_eq!(sim.record().len(), 3);
    }

    #[test]
    fn renderer_sees_each_generation_when_enabled() {
        let config = SimulationConfig::default()
            .with_display(true)
            .with_debug(true)
            .with_frame_delay(Duration::ZERO);
        let mut sim = Simulation::new(blinker(), config);
        let mut renderer = CountingRenderer { frames: Vec::new() };
        sim.run(10, BackendKind::Scalar, Some(&mut renderer)).unwrap();
        assert_eq!(renderer.frames, vec![(0, 3, true), (1, 3, true)]);
    }

    #[test]
    fn renderer_is_silent_when_display_is_off() {
        let mut sim = Simulation::new(blinker(), SimulationConfig::default());
        let mut renderer = CountingRenderer { frames: Vec::new() };
        sim.run(10, BackendKind::Scalar, Some(&mut renderer)).unwrap();
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn device_error_fails_the_step() {
        let mut sim = Simulation::new(blinker(), SimulationConfig::default());
        let before = sim.grid().clone();
        let err = sim.step_with(&mut FailingBackend::default()).unwrap_err();
        assert!(matches!(err, LifeError::Device(_)));
        assert_eq!(sim.grid(), &before);
        assert!(sim.record().is_empty());
    }

    #[test]
    fn device_error_fails_the_run_and_releases_the_backend() {
        let mut sim = Simulation::new(blinker(), SimulationConfig::default());
        sim.step_with(&mut ScalarBackend::new()).unwrap();
        let record_before = sim.record().clone();
        let grid_before = sim.grid().clone();

        let backend = FailingBackend::default();
        let dropped = Arc::clone(&backend.dropped);
        let err = sim.run_on(5, Box::new(backend), None, None).unwrap_err();

        assert!(matches!(err, LifeError::Device(_)));
        assert_eq!(sim.state(), RunState::Failed);
        assert_eq!(sim.record(), &record_before);
        assert_eq!(sim.grid(), &grid_before);
        assert_eq!(sim.generation(), 1);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn run_on_reports_the_given_notice() {
        let dims = Dimensions::new(15, 20).unwrap();
        let notice = FallbackNotice::TileMismatch { dims };
        let mut sim = Simulation::new(Grid::new(15, 20).unwrap(), SimulationConfig::default());
        let outcome = sim
            .run_on(3, Box::new(ScalarBackend::new()), Some(notice.clone()), None)
            .unwrap();
        assert_eq!(outcome.backend, BackendKind::Scalar);
        assert_eq!(outcome.notice, Some(notice));
    }

    #[test]
    fn step_with_rotates_buffers() {
        let mut sim = Simulation::new(blinker(), SimulationConfig::default());
        let start = sim.grid().present().to_vec();
        let stable = sim.step_with(&mut ScalarBackend::new()).unwrap();
        assert!(!stable);
        assert_eq!(sim.grid().past(), start.as_slice());
        assert!(sim.grid().get(2, 1) && sim.grid().get(2, 3));
    }
}

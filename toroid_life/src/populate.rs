// populate.rs - Random and entropy-guided population of the present generation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::{CONVERGENCE_MARGIN, PopulateConfig};
use crate::entropy::shannon_entropy;
use crate::error::Result;
use crate::grid::{Cell, Dimensions, Grid};
use crate::patterns::{BEACON, CLUSTER, GLIDER, METHUSELAH, Pattern, TOAD};
use crate::pool::WorkerPool;

// Alternatives drawn uniformly on every populate iteration
const STAMPS: [&Pattern; 5] = [&CLUSTER, &BEACON, &TOAD, &GLIDER, &METHUSELAH];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulateReport {
    /// Stamps actually applied.
    pub iterations: usize,
    /// Entropy of `present` after the last stamp.
    pub entropy: f64,
    pub converged: bool,
}

/// Stop condition: entropy has risen at least [`CONVERGENCE_MARGIN`] above the target.
///
/// Overshoot is not corrected; a grid that starts above the target is left as is.
pub fn has_converged(entropy: f64, target: f64) -> bool {
    entropy - target >= CONVERGENCE_MARGIN
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn draw<R: Rng>(rng: &mut R, dims: Dimensions) -> (&'static Pattern, i64, i64) {
    let stamp = STAMPS[rng.gen_range(0..STAMPS.len())];
    let x = rng.gen_range(0..dims.width) as i64;
    let y = rng.gen_range(0..dims.height) as i64;
    (stamp, x, y)
}

/// Fills `present` with independent uniform 0/1 cells. Meant for large grids.
pub fn scatter<R: Rng>(grid: &mut Grid, rng: &mut R) {
    for cell in grid.present_mut() {
        *cell = rng.gen_range(0..=1);
    }
}

/// One stamp per iteration until the entropy converges or the budget runs out.
pub fn populate_serial(grid: &mut Grid, config: &PopulateConfig) -> PopulateReport {
    let mut rng = rng_for(config.seed);
    populate_serial_with(grid, config, &mut rng)
}

pub fn populate_serial_with<R: Rng>(grid: &mut Grid, config: &PopulateConfig, rng: &mut R) -> PopulateReport {
    let dims = grid.dims();
    let mut entropy = shannon_entropy(grid.present());
    let mut iterations = 0;

    while !has_converged(entropy, config.target_entropy) && iterations < config.max_iterations {
        let (stamp, x, y) = draw(rng, dims);
        stamp.stamp(grid, x, y);
        entropy = shannon_entropy(grid.present());
        iterations += 1;
        trace!(iterations, entropy, figure = stamp.name, x, y, "stamped");
    }

    let report = PopulateReport { iterations, entropy, converged: has_converged(entropy, config.target_entropy) };
    info!(iterations, entropy, converged = report.converged, "serial populate finished");
    report
}

struct Canvas {
    cells: Vec<Cell>,
    entropy: f64,
}

struct SharedCanvas {
    canvas: Mutex<Canvas>,
    cancel: AtomicBool,
    claimed: AtomicUsize,
}

/// Concurrent populate across the pool.
///
/// Every worker draws its own figure and anchor. Stamping and recomputing the
/// entropy happen under one lock so no worker sees a partial stamp or a stale
/// entropy. The worker that observes convergence raises the cancel flag;
/// others stop at their next iteration boundary, so in-flight stamps may push
/// the entropy slightly past the target.
pub fn populate_concurrent(grid: &mut Grid, pool: &WorkerPool, config: &PopulateConfig) -> Result<PopulateReport> {
    let dims = grid.dims();
    let cells = grid.take_present();
    let entropy = shannon_entropy(&cells);

    let shared = Arc::new(SharedCanvas {
        canvas: Mutex::new(Canvas { cells, entropy }),
        cancel: AtomicBool::new(has_converged(entropy, config.target_entropy)),
        claimed: AtomicUsize::new(0),
    });

    let target = config.target_entropy;
    let budget = config.max_iterations;
    let base_seed = config.seed.unwrap_or_else(rand::random);
    let worker_shared = Arc::clone(&shared);

    let outcome = pool.run_each(move |worker| {
        let shared = &worker_shared;
        let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(worker as u64));
        let mut stamped = 0usize;
        loop {
            if shared.cancel.load(Ordering::Acquire) {
                break;
            }
            let iteration = shared.claimed.fetch_add(1, Ordering::Relaxed);
            if iteration >= budget {
                break;
            }
            let (stamp, x, y) = draw(&mut rng, dims);

            let converged = {
                let mut canvas = shared.canvas.lock();
                stamp.stamp_cells(dims, &mut canvas.cells, x, y);
                canvas.entropy = shannon_entropy(&canvas.cells);
                trace!(worker, iteration, entropy = canvas.entropy, figure = stamp.name, "stamped");
                has_converged(canvas.entropy, target)
            };
            stamped += 1;

            if converged {
                shared.cancel.store(true, Ordering::Release);
            }
        }
        debug!(worker, stamped, "populate worker done");
        stamped
    });

    // Put the buffer back before surfacing any worker failure
    let canvas = match Arc::try_unwrap(shared) {
        Ok(shared) => shared.canvas.into_inner(),
        Err(shared) => {
            let canvas = shared.canvas.lock();
            Canvas { cells: canvas.cells.clone(), entropy: canvas.entropy }
        }
    };
    grid.restore_present(canvas.cells);

    let iterations = outcome?.into_iter().sum();
    let report = PopulateReport {
        iterations,
        entropy: canvas.entropy,
        converged: has_converged(canvas.entropy, target),
    };
    info!(iterations, entropy = report.entropy, converged = report.converged, workers = pool.workers(), "concurrent populate finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_leaves_grid_unchanged() {
        let mut grid = Grid::new(20, 20).unwrap();
        Pattern::stamp(&GLIDER, &mut grid, 3, 3);
        let before = grid.clone();
        let config = PopulateConfig::default().with_target_entropy(0.0).with_max_iterations(0);
        let report = populate_serial(&mut grid, &config);
        assert_eq!(report.iterations, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn serial_reaches_target_entropy() {
        let mut grid = Grid::new(40, 40).unwrap();
        let config = PopulateConfig::default().with_seed(7);
        let report = populate_serial(&mut grid, &config);
        assert!(report.converged);
        assert!(report.entropy > 0.709);
        assert!(report.iterations > 0 && report.iterations < config.max_iterations);
        assert_eq!(report.entropy, shannon_entropy(grid.present()));
    }

    #[test]
    fn serial_stops_at_budget() {
        let mut grid = Grid::new(40, 40).unwrap();
        let config = PopulateConfig::default().with_seed(3).with_max_iterations(5);
        let report = populate_serial(&mut grid, &config);
        assert_eq!(report.iterations, 5);
        assert!(!report.converged);
        assert!(grid.live_cells() > 0);
    }

    #[test]
    fn seeded_serial_runs_are_reproducible() {
        let config = PopulateConfig::default().with_seed(42);
        let mut a = Grid::new(30, 30).unwrap();
        let mut b = Grid::new(30, 30).unwrap();
        populate_serial(&mut a, &config);
        populate_serial(&mut b, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn already_converged_grid_is_not_touched() {
        let cells: Vec<Cell> = (0..100).map(|i| (i % 2) as Cell).collect();
        let mut grid = Grid::from_cells(10, 10, cells).unwrap();
        let before = grid.clone();
        let pool = WorkerPool::with_workers(2).unwrap();
        let report = populate_concurrent(&mut grid, &pool, &PopulateConfig::default()).unwrap();
        assert_eq!(report.iterations, 0);
        assert!(report.converged);
        assert_eq!(grid, before);

        let report = populate_serial(&mut grid, &PopulateConfig::default());
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn concurrent_reaches_target_and_cancels_early() {
        let mut grid = Grid::new(50, 50).unwrap();
        let pool = WorkerPool::with_workers(4).unwrap();
        let config = PopulateConfig::default().with_seed(11);
        let report = populate_concurrent(&mut grid, &pool, &config).unwrap();
        assert!(report.converged);
        assert!(report.iterations < config.max_iterations);
        assert_eq!(grid.present().len(), grid.size());
        assert!((report.entropy - shannon_entropy(grid.present())).abs() < 1e-12);
    }

    #[test]
    fn concurrent_respects_budget() {
        let mut grid = Grid::new(50, 50).unwrap();
        let pool = WorkerPool::with_workers(3).unwrap();
        let config = PopulateConfig::default().with_target_entropy(2.0).with_max_iterations(37).with_seed(5);
        let report = populate_concurrent(&mut grid, &pool, &config).unwrap();
        assert_eq!(report.iterations, 37);
        assert!(!report.converged);
    }

    #[test]
    fn scatter_produces_binary_cells() {
        let mut grid = Grid::new(64, 64).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        scatter(&mut grid, &mut rng);
        assert!(grid.present().iter().all(|&c| c <= 1));
        let live = grid.live_cells();
        assert!(live > 1500 && live < 2600, "live = {live}");
    }
}

// config.rs - Run and populate settings

use std::time::Duration;

/// Entropy must exceed the target by at least this much to stop populating.
pub const CONVERGENCE_MARGIN: f64 = 0.01;

/// Display and pacing options for a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Render `present` before every generation.
    pub display: bool,
    /// Render raw values plus the neighbour map, and log each generation.
    pub debug: bool,
    /// Pause after each rendered frame.
    pub frame_delay: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            display: false,
            debug: false,
            frame_delay: Duration::from_millis(200),
        }
    }
}

impl SimulationConfig {
    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }
}

/// Settings for the entropy-guided populators.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateConfig {
    pub target_entropy: f64,
    pub max_iterations: usize,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for PopulateConfig {
    fn default() -> Self {
        Self {
            target_entropy: 0.7,
            max_iterations: 10_000,
            seed: None,
        }
    }
}

impl PopulateConfig {
    pub fn with_target_entropy(mut self, target: f64) -> Self {
        self.target_entropy = target;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

//! Error types for grid, backend and populate operations.

use thiserror::Error;

/// Result type for toroid_life operations.
pub type Result<T> = std::result::Result<T, LifeError>;

#[derive(Error, Debug)]
pub enum LifeError {
    /// Both dimensions must be positive.
    #[error("invalid grid dimensions {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },

    #[error("expected {expected} cells, found {found}")]
    CellCountMismatch { expected: usize, found: usize },

    #[error("cell {index} has non-binary state {value}")]
    InvalidState { index: usize, value: u8 },

    /// Linear cell index outside the grid. Reported, never panicked on.
    #[error("invalid cell index {index} (grid holds {size} cells)")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("unknown figure '{0}' (expected Glider, Toad, Beacon or Methuselah)")]
    UnknownFigure(String),

    /// A pool worker panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),

    /// Any failure from the offload device. Fatal to the run that hit it.
    #[error("offload device error: {0}")]
    Device(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

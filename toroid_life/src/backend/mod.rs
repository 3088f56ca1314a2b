//! Execution backends for the generation step.
//!
//! A backend turns `present` into `future` and decides whether the run has
//! settled. The driver only ever sees `Box<dyn Backend>`, chosen once per run:
//!
//! ```text
//!            ┌──────────────────────────┐
//!            │      Backend trait       │
//!            │  advance / check_stable  │
//!            └────────────┬─────────────┘
//!                 ┌───────┴───────┐
//!                 ▼               ▼
//!          ┌────────────┐  ┌────────────┐
//!          │   Scalar   │  │  Offload   │
//!          │ (host, 1T) │  │ (wgpu, GPU)│
//!          └────────────┘  └────────────┘
//! ```

mod scalar;
#[cfg(feature = "gpu")]
mod offload;

pub use scalar::ScalarBackend;
#[cfg(feature = "gpu")]
pub use offload::OffloadBackend;

use std::fmt;

use tracing::{info, warn};

use crate::error::Result;
use crate::grid::{Cell, Dimensions};

/// Work-group tile edge of the offload kernels. Both grid dimensions must be
/// multiples of it for the offload backend to be used.
pub const TILE: usize = 10;

pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Computes the generation after `present` into `future`.
    fn advance(&mut self, dims: Dimensions, present: &[Cell], future: &mut [Cell]) -> Result<()>;

    /// Fixed point (`future == present`) or period-2 (`future == past`).
    fn check_stable(&mut self, past: &[Cell], present: &[Cell], future: &[Cell]) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Scalar,
    Offload,
}

impl BackendKind {
    /// Exactly `"CL"` selects the offload backend; any other string is scalar.
    pub fn from_mode(mode: &str) -> Self {
        if mode == "CL" { BackendKind::Offload } else { BackendKind::Scalar }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Scalar  => f.write_str("scalar"),
            BackendKind::Offload => f.write_str("CL"),
        }
    }
}

/// Reason the requested backend was replaced by the scalar one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackNotice {
    /// Grid dimensions are not multiples of [`TILE`].
    TileMismatch { dims: Dimensions },
    /// Built without the `gpu` feature.
    Unavailable,
}

impl fmt::Display for FallbackNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackNotice::TileMismatch { dims } => write!(
                f,
                "grid {}x{} does not match the {TILE}x{TILE} work-group size, using scalar",
                dims.height, dims.width
            ),
            FallbackNotice::Unavailable => f.write_str("offload backend not compiled in, using scalar"),
        }
    }
}

/// Backend chosen for a run, plus the notice if a fallback happened.
pub struct Selection {
    pub backend: Box<dyn Backend>,
    pub notice: Option<FallbackNotice>,
}

/// Picks the backend for a run.
///
/// Geometry that does not fit the offload tile falls back to scalar with a
/// notice. Device setup failures are returned as errors, there is no silent
/// fallback once the offload backend was selected.
pub fn select(requested: BackendKind, dims: Dimensions) -> Result<Selection> {
    let selection = match requested {
        BackendKind::Scalar => Selection { backend: Box::new(ScalarBackend::new()), notice: None },
        BackendKind::Offload if !dims.divisible_by(TILE) => {
            fallback(FallbackNotice::TileMismatch { dims })
        }
        BackendKind::Offload => offload(dims)?,
    };
    info!(backend = %selection.backend.kind(), "backend selected");
    Ok(selection)
}

fn fallback(notice: FallbackNotice) -> Selection {
    warn!("{notice}");
    Selection { backend: Box::new(ScalarBackend::new()), notice: Some(notice) }
}

#[cfg(feature = "gpu")]
fn offload(dims: Dimensions) -> Result<Selection> {
    Ok(Selection { backend: Box::new(OffloadBackend::new(dims)?), notice: None })
}

#[cfg(not(feature = "gpu"))]
fn offload(_dims: Dimensions) -> Result<Selection> {
    Ok(fallback(FallbackNotice::Unavailable))
}

// scalar.rs - Sequential host evolve step

use super::{Backend, BackendKind};
use crate::error::Result;
use crate::grid::{Cell, Dimensions};
use crate::neighbors::count_neighbors;
use crate::rules::next_state;
use crate::stability::is_stable;

/// Neighbour counts first, then the rule applied element-wise. Single-threaded.
#[derive(Debug, Default)]
pub struct ScalarBackend;

impl ScalarBackend {
    pub fn new() -> Self {
        Self
    }
}

/// `present` -> `future` on the host.
pub fn evolve(dims: Dimensions, present: &[Cell], future: &mut [Cell]) {
    let counts = count_neighbors(dims, present);
    for ((next, &cell), &n) in future.iter_mut().zip(present).zip(&counts) {
        *next = next_state(cell, n);
    }
}

impl Backend for ScalarBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Scalar
    }

    fn advance(&mut self, dims: Dimensions, present: &[Cell], future: &mut [Cell]) -> Result<()> {
        evolve(dims, present, future);
        Ok(())
    }

    fn check_stable(&mut self, past: &[Cell], present: &[Cell], future: &[Cell]) -> Result<bool> {
        Ok(is_stable(past, present, future))
    }
}

// grid.rs - Toroidal grid with past/present/future generation buffers

use tracing::warn;

use crate::error::{LifeError, Result};

pub type Cell = u8;

pub const DEAD: Cell = 0;
pub const ALIVE: Cell = 1;

/// Grid geometry plus the toroidal addressing shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub height: usize,
    pub width: usize,
}

impl Dimensions {
    pub fn new(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(LifeError::InvalidDimensions { height, width });
        }
        Ok(Self { height, width })
    }

    pub fn size(&self) -> usize {
        self.height * self.width
    }

    /// Wraps logical coordinates onto the torus.
    ///
    /// Uses Euclidean remainder so negative coordinates land on the far edge
    /// instead of producing a negative offset.
    pub fn normalize(&self, x: i64, y: i64) -> (usize, usize) {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        (x, y)
    }

    /// Row-major buffer index of the (wrapped) coordinate.
    pub fn index(&self, x: i64, y: i64) -> usize {
        let (x, y) = self.normalize(x, y);
        y * self.width + x
    }

    pub fn divisible_by(&self, tile: usize) -> bool {
        self.height % tile == 0 && self.width % tile == 0
    }
}

/// Three same-sized generation buffers.
///
/// `present` is the generation being displayed and mutated by patterns and
/// populators, `future` receives the next generation from a backend and
/// `past` keeps the previous one for period-2 detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    dims: Dimensions,
    past: Vec<Cell>,
    present: Vec<Cell>,
    future: Vec<Cell>,
}

impl Grid {
    /// Creates an all-dead grid.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        let dims = Dimensions::new(height, width)?;
        Ok(Self {
            dims,
            past: vec![DEAD; dims.size()],
            present: vec![DEAD; dims.size()],
            future: vec![DEAD; dims.size()],
        })
    }

    /// Creates a grid whose `present` generation is `cells` (row-major).
    pub fn from_cells(height: usize, width: usize, cells: Vec<Cell>) -> Result<Self> {
        let dims = Dimensions::new(height, width)?;
        if cells.len() != dims.size() {
            return Err(LifeError::CellCountMismatch { expected: dims.size(), found: cells.len() });
        }
        if let Some(index) = cells.iter().position(|&c| c > ALIVE) {
            return Err(LifeError::InvalidState { index, value: cells[index] });
        }
        Ok(Self {
            dims,
            past: vec![DEAD; dims.size()],
            present: cells,
            future: vec![DEAD; dims.size()],
        })
    }

    pub fn dims(&self) -> Dimensions { self.dims }
    pub fn height(&self) -> usize { self.dims.height }
    pub fn width(&self) -> usize { self.dims.width }
    pub fn size(&self) -> usize { self.dims.size() }

    pub fn normalize(&self, x: i64, y: i64) -> (usize, usize) {
        self.dims.normalize(x, y)
    }

    pub fn past(&self) -> &[Cell] { &self.past }
    pub fn present(&self) -> &[Cell] { &self.present }
    pub fn future(&self) -> &[Cell] { &self.future }

    pub fn present_mut(&mut self) -> &mut [Cell] { &mut self.present }

    /// Borrows what a backend needs for one evolve call.
    pub fn split_for_advance(&mut self) -> (Dimensions, &[Cell], &mut [Cell]) {
        (self.dims, &self.present, &mut self.future)
    }

    pub fn get(&self, x: i64, y: i64) -> bool {
        self.present[self.dims.index(x, y)] == ALIVE
    }

    pub fn set(&mut self, x: i64, y: i64, alive: bool) {
        let i = self.dims.index(x, y);
        self.present[i] = alive as Cell;
    }

    pub fn set_states(&mut self, states: &[(i64, i64, bool)]) {
        for &(x, y, alive) in states {
            self.set(x, y, alive);
        }
    }

    /// Reads a cell by linear index. Out-of-range indices are reported, not panicked on.
    pub fn cell(&self, index: usize) -> Result<bool> {
        match self.present.get(index) {
            Some(&c) => Ok(c == ALIVE),
            None => {
                warn!(index, size = self.size(), "invalid cell index");
                Err(LifeError::IndexOutOfRange { index, size: self.size() })
            }
        }
    }

    /// Writes a cell by linear index; an out-of-range index leaves the grid untouched.
    pub fn set_cell(&mut self, index: usize, alive: bool) -> Result<()> {
        let size = self.size();
        match self.present.get_mut(index) {
            Some(c) => {
                *c = alive as Cell;
                Ok(())
            }
            None => {
                warn!(index, size, "invalid cell index");
                Err(LifeError::IndexOutOfRange { index, size })
            }
        }
    }

    pub fn live_cells(&self) -> usize {
        self.present.iter().filter(|&&c| c == ALIVE).count()
    }

    pub fn clear(&mut self) {
        self.past.fill(DEAD);
        self.present.fill(DEAD);
        self.future.fill(DEAD);
    }

    /// past <- present, present <- future. Buffers are swapped, not copied.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.past, &mut self.present);
        std::mem::swap(&mut self.present, &mut self.future);
    }

    pub(crate) fn take_present(&mut self) -> Vec<Cell> {
        std::mem::take(&mut self.present)
    }

    pub(crate) fn restore_present(&mut self, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.size());
        self.present = cells;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_negative_coordinates() {
        let dims = Dimensions::new(4, 5).unwrap();
        assert_eq!(dims.normalize(-1, -1), (4, 3));
        assert_eq!(dims.normalize(5, 4), (0, 0));
        assert_eq!(dims.normalize(-11, 9), (4, 1));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(Grid::new(0, 3), Err(LifeError::InvalidDimensions { .. })));
        assert!(matches!(Grid::new(3, 0), Err(LifeError::InvalidDimensions { .. })));
    }

    #[test]
    fn coordinate_access_wraps() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set(-1, -1, true);
        assert!(grid.get(2, 2));
        assert!(grid.get(5, 5));
        assert_eq!(grid.live_cells(), 1);
    }

    #[test]
    fn out_of_range_index_is_a_no_op() {
        let mut grid = Grid::new(2, 2).unwrap();
        let before = grid.clone();
        assert!(matches!(grid.set_cell(4, true), Err(LifeError::IndexOutOfRange { index: 4, size: 4 })));
        assert!(grid.cell(4).is_err());
        assert_eq!(grid, before);

        grid.set_cell(3, true).unwrap();
        assert!(grid.cell(3).unwrap());
    }

    #[test]
    fn from_cells_validates_input() {
        assert!(matches!(
            Grid::from_cells(2, 2, vec![0, 1, 0]),
            Err(LifeError::CellCountMismatch { expected: 4, found: 3 })
        ));
        assert!(matches!(
            Grid::from_cells(2, 2, vec![0, 1, 2, 0]),
            Err(LifeError::InvalidState { index: 2, value: 2 })
        ));
    }

    #[test]
    fn rotate_shifts_generations() {
        let mut grid = Grid::from_cells(1, 3, vec![1, 0, 0]).unwrap();
        grid.split_for_advance().2.copy_from_slice(&[0, 1, 0]);
        grid.rotate();
        assert_eq!(grid.past(), &[1, 0, 0]);
        assert_eq!(grid.present(), &[0, 1, 0]);
        assert_eq!(grid.future().len(), 3);
    }
}

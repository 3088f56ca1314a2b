// patterns.rs - Named figures stamped onto the torus at an anchor cell

use std::fmt;
use std::str::FromStr;

use crate::error::LifeError;
use crate::grid::{ALIVE, Cell, Dimensions, Grid};

/// A fixed set of (dx, dy) offsets relative to an anchor cell. `y` grows downward.
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i64, i64)],
}

// Anchor: middle-bottom cell
pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    cells: &[(0, 1), (1, -1), (1, 0), (1, 1), (-1, 0)],
};

// Anchor: middle of the first stick
pub const TOAD: Pattern = Pattern {
    name: "Toad",
    cells: &[(0, 0), (1, 1), (1, -1), (1, 0), (0, -1), (0, -2)],
};

// Anchor: bottom-left corner
pub const BEACON: Pattern = Pattern {
    name: "Beacon",
    cells: &[(0, 0), (0, -1), (1, 0), (3, -3), (3, -2), (2, -3)],
};

// R-pentomino, anchor: figure centre
pub const METHUSELAH: Pattern = Pattern {
    name: "Methuselah",
    cells: &[(0, 0), (-1, 0), (0, 1), (0, -1), (1, -1)],
};

// Unnamed 4-cell cluster used only by the stochastic populator
pub const CLUSTER: Pattern = Pattern {
    name: "Cluster",
    cells: &[(0, 0), (1, 0), (2, 0), (-1, -1)],
};

/// Figures that can be stamped by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    Glider,
    Toad,
    Beacon,
    Methuselah,
}

impl Figure {
    pub const ALL: [Figure; 4] = [Figure::Glider, Figure::Toad, Figure::Beacon, Figure::Methuselah];

    pub fn pattern(self) -> &'static Pattern {
        match self {
            Figure::Glider     => &GLIDER,
            Figure::Toad       => &TOAD,
            Figure::Beacon     => &BEACON,
            Figure::Methuselah => &METHUSELAH,
        }
    }

    pub fn name(self) -> &'static str {
        self.pattern().name
    }

    pub fn stamp(self, grid: &mut Grid, x: i64, y: i64) {
        self.pattern().stamp(grid, x, y);
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Figure {
    type Err = LifeError;

    /// Case-sensitive, matching the figure names exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Figure::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| LifeError::UnknownFigure(s.to_string()))
    }
}

impl Pattern {
    pub fn stamp(&self, grid: &mut Grid, x: i64, y: i64) {
        let dims = grid.dims();
        self.stamp_cells(dims, grid.present_mut(), x, y);
    }

    /// Sets every offset cell alive on a raw row-major buffer.
    pub fn stamp_cells(&self, dims: Dimensions, cells: &mut [Cell], x: i64, y: i64) {
        for &(dx, dy) in self.cells {
            cells[dims.index(x + dx, y + dy)] = ALIVE;
        }
    }
}

/// Stamps a figure given by name. Unknown names stamp nothing.
pub fn stamp_named(grid: &mut Grid, name: &str, x: i64, y: i64) -> Result<Figure, LifeError> {
    let figure: Figure = name.parse()?;
    figure.stamp(grid, x, y);
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glider_cells_relative_to_anchor() {
        let mut grid = Grid::new(10, 10).unwrap();
        Figure::Glider.stamp(&mut grid, 5, 5);
        for (x, y) in [(5, 6), (6, 4), (6, 5), (6, 6), (4, 5)] {
            assert!(grid.get(x, y), "({x},{y}) should be alive");
        }
        assert_eq!(grid.live_cells(), 5);
    }

    #[test]
    fn stamp_wraps_around_edges() {
        let mut grid = Grid::new(6, 6).unwrap();
        Figure::Beacon.stamp(&mut grid, 4, 1);
        // (3,-3) lands on (7,-2) -> (1,4)
        assert!(grid.get(1, 4));
        assert!(grid.get(4, 0));
        assert_eq!(grid.live_cells(), 6);
    }

    #[test]
    fn every_figure_has_its_cell_count() {
        let expected = [5, 6, 6, 5];
        for (figure, n) in Figure::ALL.into_iter().zip(expected) {
            let mut grid = Grid::new(12, 12).unwrap();
            figure.stamp(&mut grid, 6, 6);
            assert_eq!(grid.live_cells(), n, "{figure}");
        }
    }

    #[test]
    fn unknown_name_stamps_nothing() {
        let mut grid = Grid::new(5, 5).unwrap();
        let err = stamp_named(&mut grid, "glider", 2, 2).unwrap_err();
        assert!(matches!(err, LifeError::UnknownFigure(ref n) if n == "glider"));
        assert_eq!(grid.live_cells(), 0);

        assert_eq!(stamp_named(&mut grid, "Toad", 2, 2).unwrap(), Figure::Toad);
        assert_eq!(grid.live_cells(), 6);
    }
}

// neighbors.rs - Moore-neighbourhood counts under toroidal wraparound

use crate::grid::{ALIVE, Cell, Dimensions};

// Neighbour offsets, row above / same row / row below
const OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// Live-neighbour count of the cell at (x, y).
#[inline]
pub fn count_at(dims: Dimensions, cells: &[Cell], x: i64, y: i64) -> u8 {
    OFFSETS
        .iter()
        .filter(|&&(dx, dy)| cells[dims.index(x + dx, y + dy)] == ALIVE)
        .count() as u8
}

/// Per-cell live-neighbour counts for one generation, row-major, each in `0..=8`.
pub fn count_neighbors(dims: Dimensions, cells: &[Cell]) -> Vec<u8> {
    debug_assert_eq!(cells.len(), dims.size());
    let mut counts = Vec::with_capacity(dims.size());
    for y in 0..dims.height as i64 {
        for x in 0..dims.width as i64 {
            counts.push(count_at(dims, cells, x, y));
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn empty_grid_has_no_neighbours() {
        let grid = Grid::new(6, 7).unwrap();
        let counts = count_neighbors(grid.dims(), grid.present());
        assert_eq!(counts.len(), 42);
        assert!(counts.iter().all(|&n| n == 0));
    }

    #[test]
    fn full_grid_counts_eight_everywhere() {
        let grid = Grid::from_cells(3, 3, vec![1; 9]).unwrap();
        let counts = count_neighbors(grid.dims(), grid.present());
        assert!(counts.iter().all(|&n| n == 8));
    }

    #[test]
    fn corner_cell_sees_neighbours_across_edges() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(0, 0, true);
        let counts = count_neighbors(grid.dims(), grid.present());
        let dims = grid.dims();
        for (x, y) in [(4, 4), (0, 4), (1, 4), (4, 0), (1, 0), (4, 1), (0, 1), (1, 1)] {
            assert_eq!(counts[dims.index(x, y)], 1, "cell ({x},{y})");
        }
        assert_eq!(counts[dims.index(0, 0)], 0);
        assert_eq!(counts[dims.index(2, 2)], 0);
    }
}

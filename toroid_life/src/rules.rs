// rules.rs - Standard Life transition (B3/S23)

use crate::grid::{ALIVE, Cell, DEAD};

/// Next state of a cell given its current state and live-neighbour count.
///
/// Both backends implement exactly this table; the offload kernel mirrors it.
#[inline]
pub fn next_state(current: Cell, neighbors: u8) -> Cell {
    match (current == ALIVE, neighbors) {
        (true, 2) | (true, 3) => ALIVE,   // Survival
        (false, 3)            => ALIVE,   // Birth
        _                     => DEAD,    // Death or stays dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_cell_survives_with_two_or_three() {
        for n in 0..=8 {
            let expected = if n == 2 || n == 3 { ALIVE } else { DEAD };
            assert_eq!(next_state(ALIVE, n), expected, "alive with {n} neighbours");
        }
    }

    #[test]
    fn dead_cell_is_born_with_exactly_three() {
        for n in 0..=8 {
            let expected = if n == 3 { ALIVE } else { DEAD };
            assert_eq!(next_state(DEAD, n), expected, "dead with {n} neighbours");
        }
    }
}

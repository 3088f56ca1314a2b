// stability.rs - Fixed-point and period-2 detection

use crate::grid::Cell;

/// True when `future` repeats `present` (still life) or `past` (period-2 oscillator).
pub fn is_stable(past: &[Cell], present: &[Cell], future: &[Cell]) -> bool {
    future == present || future == past
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_is_stable() {
        assert!(is_stable(&[1, 0], &[0, 1], &[0, 1]));
    }

    #[test]
    fn period_two_is_stable() {
        assert!(is_stable(&[1, 0], &[0, 1], &[1, 0]));
    }

    #[test]
    fn changing_generation_is_not_stable() {
        assert!(!is_stable(&[1, 0, 0], &[0, 1, 0], &[0, 0, 1]));
    }
}

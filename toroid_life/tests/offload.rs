//! Offload backend against the scalar reference. These need a GPU adapter.
#![cfg(feature = "gpu")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use toroid_life::{Backend, Cell, Dimensions, OffloadBackend, ScalarBackend};

fn random_cells(dims: Dimensions, seed: u64) -> Vec<Cell> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..dims.size()).map(|_| rng.gen_range(0..=1)).collect()
}

#[test]
#[ignore = "Requires GPU"]
fn offload_matches_scalar_evolve() {
    for (height, width, seed) in [(10, 10, 1), (20, 30, 2), (40, 20, 3)] {
        let dims = Dimensions::new(height, width).unwrap();
        let present = random_cells(dims, seed);

        let mut expected = vec![0; dims.size()];
        ScalarBackend::new().advance(dims, &present, &mut expected).unwrap();

        let mut offload = OffloadBackend::new(dims).unwrap();
        let mut actual = vec![0; dims.size()];
        offload.advance(dims, &present, &mut actual).unwrap();

        assert_eq!(actual, expected, "{height}x{width}");
    }
}

#[test]
#[ignore = "Requires GPU"]
fn offload_stability_check_matches_scalar() {
    let dims = Dimensions::new(10, 10).unwrap();
    let a = random_cells(dims, 11);
    let b = random_cells(dims, 12);
    let c = random_cells(dims, 13);

    let mut scalar = ScalarBackend::new();
    let mut offload = OffloadBackend::new(dims).unwrap();
    for (past, present, future) in [(&a, &b, &c), (&a, &b, &b), (&a, &b, &a), (&c, &c, &c)] {
        assert_eq!(
            offload.check_stable(past, present, future).unwrap(),
            scalar.check_stable(past, present, future).unwrap(),
        );
    }
}

#[test]
fn offload_rejects_mismatched_geometry() {
    // Tile check happens before any device is touched
    let dims = Dimensions::new(15, 20).unwrap();
    assert!(OffloadBackend::new(dims).is_err());
}

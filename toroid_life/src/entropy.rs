// entropy.rs - Shannon entropy of the cell-state distribution

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::Result;
use crate::grid::Cell;
use crate::pool::WorkerPool;

/// Cell value -> number of occurrences.
pub type Frequencies = HashMap<Cell, usize>;

pub fn frequencies(cells: &[Cell]) -> Frequencies {
    let mut freq = Frequencies::new();
    for &c in cells {
        *freq.entry(c).or_insert(0) += 1;
    }
    freq
}

/// Sums partial frequency maps. Order of the partials does not matter.
pub fn merge<I>(partials: I) -> Frequencies
where
    I: IntoIterator<Item = Frequencies>,
{
    let mut total = Frequencies::new();
    for partial in partials {
        for (value, count) in partial {
            *total.entry(value).or_insert(0) += count;
        }
    }
    total
}

/// `-sum p(v) * log2 p(v)` over the observed values, `p(v) = count(v) / total`.
pub fn entropy_of(freq: &Frequencies, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let entropy = freq
        .values()
        .map(|&count| count as f64 / total as f64)
        .filter(|&p| p > 0.0)
        .fold(0.0, |acc, p| acc - p * p.log2());
    trace!(entropy, "entropy computed");
    entropy
}

/// Single-threaded entropy of one generation snapshot.
pub fn shannon_entropy(cells: &[Cell]) -> f64 {
    entropy_of(&frequencies(cells), cells.len())
}

/// Entropy with the counting phase split across the pool.
///
/// Each worker counts its own contiguous partition into a private map; the
/// maps are merged only after every worker has joined.
pub fn shannon_entropy_parallel(pool: &WorkerPool, cells: &[Cell]) -> Result<f64> {
    let total = cells.len();
    let workers = pool.workers();
    if total < workers * 2 {
        return Ok(shannon_entropy(cells));
    }

    let shared: Arc<[Cell]> = Arc::from(cells);
    let chunk = total.div_ceil(workers);
    let partials = pool.run_each(move |worker| {
        let start = (worker * chunk).min(total);
        let end = (start + chunk).min(total);
        frequencies(&shared[start..end])
    })?;

    Ok(entropy_of(&merge(partials), total))
}

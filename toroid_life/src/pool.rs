// pool.rs - Fixed-size worker pool over a multi-thread tokio runtime

use std::sync::Arc;

use tracing::debug;

use crate::error::{LifeError, Result};

/// Worker pool bounded by available hardware parallelism.
///
/// Work is fanned out as one task per worker and joined before returning, so
/// callers see a plain blocking call. Must not be used from inside another
/// tokio runtime.
pub struct WorkerPool {
    runtime: tokio::runtime::Runtime,
    workers: usize,
}

impl WorkerPool {
    /// Pool with one worker per available hardware thread.
    pub fn new() -> Result<Self> {
        let workers = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::with_workers(workers)
    }

    pub fn with_workers(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name("toroid-worker")
            .build()?;
        debug!(workers, "worker pool started");
        Ok(Self { runtime, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `job(worker_index)` once per worker and collects the results in worker order.
    ///
    /// Returns only after every worker has finished.
    pub fn run_each<T, F>(&self, job: F) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(usize) -> T + Send + Sync + 'static,
    {
        let job = Arc::new(job);
        self.runtime.block_on(async {
            let handles: Vec<_> = (0..self.workers)
                .map(|worker| {
                    let job = Arc::clone(&job);
                    tokio::spawn(async move { job(worker) })
                })
                .collect();

            // Join every handle before reporting a failure so no worker outlives the call
            let mut results = Vec::with_capacity(handles.len());
            let mut failure = None;
            for handle in handles {
                match handle.await {
                    Ok(value) => results.push(value),
                    Err(e) => failure = Some(LifeError::Worker(e.to_string())),
                }
            }
            match failure {
                Some(e) => Err(e),
                None => Ok(results),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn runs_each_worker_once() {
        let pool = WorkerPool::with_workers(3).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let ids = pool
            .run_each(move |worker| {
                counter.fetch_add(1, Ordering::SeqCst);
                worker
            })
            .unwrap();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn zero_workers_still_gets_one() {
        let pool = WorkerPool::with_workers(0).unwrap();
        assert_eq!(pool.workers(), 1);
    }

    #[test]
    fn panicking_worker_is_reported() {
        let pool = WorkerPool::with_workers(2).unwrap();
        let result = pool.run_each(|worker| {
            if worker == 1 {
                panic!("boom");
            }
            worker
        });
        assert!(matches!(result, Err(LifeError::Worker(_))));
    }
}

//! Parallel render coordinator.
//!
//! Pages are independent once paginated, so they can be rendered on a
//! worker pool. Each page fills the result slot at its own index; slots are
//! folded in page order afterwards, so the output never depends on which
//! worker finished first.

use rayon::prelude::*;

use crate::error::Result;

#[derive(Debug)]
pub struct RenderCoordinator {
    workers: usize,
    pool: Option<rayon::ThreadPool>,
}

impl RenderCoordinator {
    /// `workers` of 0 or 1 renders on the caller's thread. Larger values get
    /// a dedicated pool of that many threads.
    pub fn new(workers: usize) -> Self {
        let pool = if workers > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!(
                        "failed to start a pool of {} render workers: {}. Rendering sequentially.",
                        workers,
                        e
                    );
                    None
                }
            }
        } else {
            None
        };
        Self { workers, pool }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Run `job` for every item and return the results in item order.
    ///
    /// If any job fails, the error of the lowest failing index is returned
    /// and all other results are discarded.
    pub fn render<T, R, F>(&self, items: &[T], job: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> Result<R> + Sync,
    {
        match &self.pool {
            Some(pool) => {
                let slots: Vec<Result<R>> = pool.install(|| {
                    items
                        .par_iter()
                        .enumerate()
                        .map(|(index, item)| job(index, item))
                        .collect()
                });
                slots.into_iter().collect()
            }
            None => items
                .iter()
                .enumerate()
                .map(|(index, item)| job(index, item))
                .collect(),
        }
    }
}

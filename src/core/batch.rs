use std::time::Instant;

use rayon::{
    prelude::*,
    ThreadPool,
    ThreadPoolBuilder,
};

use super::LazyError;

pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// Fans items out in fixed-size chunks over a bounded pool and hands the
/// results back in input order.
pub struct BatchScheduler {
    chunk_size: usize,
    pool: ThreadPool,
}

impl BatchScheduler {
    /// Pool sized to the available hardware parallelism.
    pub fn new(chunk_size: usize) -> Result<Self, LazyError> {
        Self::build(chunk_size, ThreadPoolBuilder::new())
    }

    pub fn with_workers(chunk_size: usize, workers: usize) -> Result<Self, LazyError> {
        Self::build(chunk_size, ThreadPoolBuilder::new().num_threads(workers.max(1)))
    }

    fn build(chunk_size: usize, builder: ThreadPoolBuilder) -> Result<Self, LazyError> {
        let pool = builder
            .thread_name(|i| format!("fetch-worker-{i}"))
            .build()
            .map_err(|e| LazyError::Custom(format!("Failed to build worker pool: {e}")))?;
        Ok(Self { chunk_size: chunk_size.max(1), pool })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// `worker` receives one chunk at a time and must return one result per item.
    /// Chunk outputs are collected by chunk index, so completion order is irrelevant.
    pub fn run<T, R, F>(&self, items: &[T], worker: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> Vec<R> + Sync,
    {
        let start = Instant::now();

        let chunks: Vec<Vec<R>> = self.pool.install(|| {
            items
                .par_chunks(self.chunk_size)
                .map(|chunk| {
                    let out = worker(chunk);
                    debug_assert_eq!(out.len(), chunk.len(), "worker must map every item");
                    out
                })
                .collect()
        });

        log::debug!(
            "Processed {} items in {} chunks on {} workers ({:.2}s)",
            items.len(),
            chunks.len(),
            self.workers(),
            start.elapsed().as_secs_f32()
        );

        chunks.into_iter().flatten().collect()
    }
}

//! Bounded-concurrency batch scheduling
//!
//! A dedicated rayon pool with `max(1, threads)` threads caps how many
//! encoders run at once. `run_batch` returns only after every track has
//! been processed.

use crate::error::{Result, TransflacError};
use crate::types::FileOutcome;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Scheduler {
    pool: rayon::ThreadPool,
    max_threads: usize,
}

impl Scheduler {
    /// Build a scheduler; a budget of zero is raised to one
    pub fn new(max_threads: usize) -> Result<Self> {
        let max_threads = max_threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .thread_name(|i| format!("transflac-worker-{}", i))
            .build()
            .map_err(|e| {
                TransflacError::ConfigError(format!("Failed to configure thread pool: {}", e))
            })?;
        debug!("Configured thread pool with {} threads", max_threads);
        Ok(Self { pool, max_threads })
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Run `job` once per track and wait for all of them
    ///
    /// Outcomes are returned in track order regardless of completion order.
    pub fn run_batch<F>(
        &self,
        tracks: &[PathBuf],
        progress: &ProgressBar,
        job: F,
    ) -> Vec<(PathBuf, FileOutcome)>
    where
        F: Fn(&Path) -> FileOutcome + Sync,
    {
        self.pool.install(|| {
            tracks
                .par_iter()
                .map(|track| {
                    let outcome = job(track);
                    progress.inc(1);
                    (track.clone(), outcome)
                })
                .collect()
        })
    }
}

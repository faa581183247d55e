//! Transcode pipeline
//!
//! - `worker`: one track through tag resolution, layout and encoding
//! - `scheduler`: bounded-concurrency batches with a full barrier
//! - `ancillary`: mirroring of logs, cues, artwork and other extras
//! - `post`: ReplayGain and torrent creation after a batch
//! - `orchestrator`: directory x codec sequencing

pub mod ancillary;
pub mod orchestrator;
pub mod post;
pub mod scheduler;
pub mod worker;

use crate::process::{CommandRunner, SystemRunner};
use crate::tags::{MetaflacTagReader, TagReader};
use std::sync::Arc;

pub use orchestrator::{run, run_with, RunSummary};
pub use scheduler::Scheduler;
pub use worker::FAILURE_SENTINEL;

/// External collaborators used by a run
#[derive(Clone)]
pub struct Toolchain {
    pub runner: Arc<dyn CommandRunner>,
    pub tags: Arc<dyn TagReader>,
}

impl Toolchain {
    /// Real processes, tags read with metaflac
    pub fn system() -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner::new());
        let tags: Arc<dyn TagReader> = Arc::new(MetaflacTagReader::new(runner.clone()));
        Self { runner, tags }
    }

    pub fn new(runner: Arc<dyn CommandRunner>, tags: Arc<dyn TagReader>) -> Self {
        Self { runner, tags }
    }
}

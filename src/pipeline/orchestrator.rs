//! Pipeline orchestration
//!
//! Source directories are processed one after another. For each, the
//! requested codecs run as strictly sequential batches: transcode all tracks,
//! copy ancillary files, apply ReplayGain, then make the torrent, before the
//! next codec starts.

use super::scheduler::Scheduler;
use super::worker::{self, BatchContext, FAILURE_SENTINEL};
use super::{ancillary, post, Toolchain};
use crate::codec::Codec;
use crate::config::Settings;
use crate::discovery::{self, layout, SourceDirectory};
use crate::error::{Result, TransflacError};
use crate::types::BatchResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Run summary
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Source directories that were transcoded
    pub directories: usize,
    /// Source directories skipped by --ignore
    pub skipped_directories: usize,
    /// Source directories that could not be processed at all
    pub failed_directories: usize,
    pub batches: Vec<BatchResult>,
}

impl RunSummary {
    pub fn encoded(&self) -> usize {
        self.batches.iter().map(BatchResult::encoded).sum()
    }

    pub fn skipped(&self) -> usize {
        self.batches.iter().map(BatchResult::skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.batches.iter().map(BatchResult::failed).sum()
    }
}

/// Run the full transcode pipeline with the system toolchain
pub fn run(settings: &Settings) -> Result<RunSummary> {
    run_with(settings, &Toolchain::system())
}

/// Run the full transcode pipeline with the given collaborators
pub fn run_with(settings: &Settings, toolchain: &Toolchain) -> Result<RunSummary> {
    let pipeline_start = Instant::now();
    let scheduler = Scheduler::new(settings.max_threads)?;
    let mut summary = RunSummary::default();

    for flacdir in &settings.flacdirs {
        if !settings.torrent_dir.exists() {
            std::fs::create_dir_all(&settings.torrent_dir)
                .map_err(|e| TransflacError::output_error(&settings.torrent_dir, e))?;
        }

        let source = match discovery::scan(flacdir) {
            Ok(source) => source,
            Err(e) if settings.ignore_empty => {
                info!("SKIP ({}): {}", e, flacdir.display());
                summary.skipped_directories += 1;
                continue;
            }
            Err(e) => {
                error!("{}", e);
                summary.failed_directories += 1;
                continue;
            }
        };

        if source.is_empty() {
            if settings.ignore_empty {
                info!("SKIP (no flacs in): {}", flacdir.display());
                summary.skipped_directories += 1;
            } else {
                error!(
                    "No lossless files in {}\n  Tip: Use --ignore to skip such directories",
                    source.root.display()
                );
                summary.failed_directories += 1;
            }
            continue;
        }

        if settings.original {
            info!("BEGIN ORIGINAL FLAC");
            post::make_torrent(toolchain.runner.as_ref(), settings, &source.root);
            info!("END ORIGINAL FLAC");
        }

        for &codec in &settings.codecs {
            if let Some(batch) = run_codec(&source, codec, settings, toolchain, &scheduler) {
                summary.batches.push(batch);
            }
        }

        summary.directories += 1;
        debug!("ALL DONE: {}", source.root.display());
    }

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

/// One source directory x codec batch, including its post-processing
fn run_codec(
    source: &SourceDirectory,
    codec: Codec,
    settings: &Settings,
    toolchain: &Toolchain,
    scheduler: &Scheduler,
) -> Option<BatchResult> {
    let output_dir = layout::output_dir(&source.root, codec, &settings.output);
    if layout::trees_overlap(&source.root, &output_dir) {
        error!(
            "SKIP {}: output {} overlaps source {}",
            codec,
            output_dir.display(),
            source.root.display()
        );
        return None;
    }
    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        error!("{}", TransflacError::output_error(&output_dir, e));
        return None;
    }
    clear_stale_sentinel(&output_dir);

    info!("BEGIN {}: {}", codec, source.root.display());
    let batch_start = Instant::now();

    let dir_lock = Mutex::new(());
    let ctx = BatchContext {
        source_root: &source.root,
        output_dir: &output_dir,
        codec,
        settings,
        toolchain,
        dir_lock: &dir_lock,
    };

    let progress = progress_bar(source.tracks.len(), settings);
    let outcomes = scheduler.run_batch(&source.tracks, &progress, |track| {
        worker::transcode(track, &ctx)
    });
    progress.finish_and_clear();

    let mut batch = BatchResult::new(codec, output_dir.clone());
    batch.outcomes = outcomes;
    info!(
        "Encoded {} files in {:.2}s ({} skipped, {} failed)",
        batch.encoded(),
        batch_start.elapsed().as_secs_f64(),
        batch.skipped(),
        batch.failed()
    );
    if batch.has_failures() {
        warn!(
            "{} of {} files failed, see {}",
            batch.failed(),
            source.tracks.len(),
            output_dir.join(FAILURE_SENTINEL).display()
        );
    }

    if settings.copy_other {
        ancillary::copy_other(&source.root, &output_dir, settings.filters, settings.overwrite);
    }
    if settings.replaygain {
        post::replaygain(toolchain.runner.as_ref(), codec, &output_dir);
    }
    post::make_torrent(toolchain.runner.as_ref(), settings, &output_dir);

    info!("END {}: {}", codec, source.root.display());
    Some(batch)
}

/// Remove a sentinel left by an earlier run so it only reflects this batch
fn clear_stale_sentinel(output_dir: &Path) {
    let sentinel = output_dir.join(FAILURE_SENTINEL);
    if sentinel.exists() {
        debug!("Removing stale {}", sentinel.display());
        if let Err(e) = std::fs::remove_file(&sentinel) {
            warn!("Could not remove {}: {}", sentinel.display(), e);
        }
    }
}

fn progress_bar(len: usize, settings: &Settings) -> ProgressBar {
    if settings.silent {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

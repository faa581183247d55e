//! Single-track transcode worker
//!
//! Failures stay local: they are logged, the batch sentinel is touched, and
//! the outcome is returned to the scheduler. Nothing here aborts a batch.

use super::Toolchain;
use crate::codec::Codec;
use crate::command;
use crate::config::Settings;
use crate::discovery::layout;
use crate::error::{Result, TransflacError};
use crate::tags;
use crate::types::FileOutcome;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Marker file written into a batch output root when any track fails
pub const FAILURE_SENTINEL: &str = "FAILURE";

/// Shared, read-only state for every worker in one batch
pub struct BatchContext<'a> {
    pub source_root: &'a Path,
    pub output_dir: &'a Path,
    pub codec: Codec,
    pub settings: &'a Settings,
    pub toolchain: &'a Toolchain,
    /// Serializes directory creation between workers
    pub dir_lock: &'a Mutex<()>,
}

/// Transcode one track, reporting the outcome
pub fn transcode(track: &Path, ctx: &BatchContext<'_>) -> FileOutcome {
    match transcode_inner(track, ctx) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("error encoding {}: {}", display_name(track), e);
            mark_failure(ctx.output_dir);
            FileOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

fn transcode_inner(track: &Path, ctx: &BatchContext<'_>) -> Result<FileOutcome> {
    let settings = ctx.settings;
    let tags = tags::resolve(ctx.toolchain.tags.as_ref(), track)
        .transformed(settings.zeropad, settings.skip_genre);

    let output = layout::output_file(
        track,
        ctx.source_root,
        ctx.output_dir,
        ctx.codec.extension(),
    )?;
    ensure_parent_dir(&output, ctx.dir_lock)?;

    if output.exists() && !settings.overwrite {
        warn!("file {} already exists", relative_to(&output, &settings.output).display());
        return Ok(FileOutcome::SkippedExists);
    }

    let pipeline = command::build(track, &output, ctx.codec, &tags, settings.dither);
    info!("encoding {}", display_name(&pipeline.output));
    debug!("{}", pipeline.display());

    let result = ctx.toolchain.runner.run_pipeline(&pipeline.stages)?;
    if !result.success {
        return Err(TransflacError::encode_error(track, result.failure_reason()));
    }

    if let Some(tagger) = &pipeline.tagger {
        debug!("{}", tagger.display());
        let result = ctx.toolchain.runner.run(tagger)?;
        if !result.success {
            return Err(TransflacError::encode_error(
                track,
                format!("tagging failed: {}", result.failure_reason()),
            ));
        }
    }

    Ok(FileOutcome::Encoded)
}

/// Create the output file's directory; concurrent creation is serialized
fn ensure_parent_dir(output: &Path, lock: &Mutex<()>) -> Result<()> {
    let Some(parent) = output.parent() else {
        return Ok(());
    };
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| TransflacError::output_error(parent, e))?;
    }
    Ok(())
}

/// Touch the batch sentinel; repeated failures just re-open it
pub fn mark_failure(output_dir: &Path) {
    let sentinel = output_dir.join(FAILURE_SENTINEL);
    if let Err(e) = OpenOptions::new().create(true).append(true).open(&sentinel) {
        error!("Could not write {}: {}", sentinel.display(), e);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mark_failure_is_idempotent() {
        let dir = TempDir::new().unwrap();
        mark_failure(dir.path());
        mark_failure(dir.path());
        let sentinel = dir.path().join(FAILURE_SENTINEL);
        assert!(sentinel.is_file());
        assert_eq!(std::fs::metadata(&sentinel).unwrap().len(), 0);
    }

    #[test]
    fn test_ensure_parent_dir_creates_tree() {
        let dir = TempDir::new().unwrap();
        let lock = Mutex::new(());
        let out = dir.path().join("CD1/Sub/01.mp3");
        ensure_parent_dir(&out, &lock).unwrap();
        ensure_parent_dir(&out, &lock).unwrap();
        assert!(dir.path().join("CD1/Sub").is_dir());
    }
}

//! Post-batch steps: ReplayGain and torrent creation
//!
//! Both steps report failures and return; neither stops the run.

use crate::codec::Codec;
use crate::config::Settings;
use crate::process::{CommandRunner, CommandSpec};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Apply ReplayGain to every directory of a finished batch
///
/// The output root and each nested directory (one disc per folder) are
/// processed separately. Returns the number of failed invocations.
pub fn replaygain(runner: &dyn CommandRunner, codec: Codec, output_dir: &Path) -> usize {
    let Some((program, fixed_args)) = codec.encoder().normalizer() else {
        info!("No ReplayGain tool for {}, skipping", codec);
        return 0;
    };
    info!("APPLYING replaygain");

    let mut dirs = vec![output_dir.to_path_buf()];
    dirs.extend(
        WalkDir::new(output_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path()),
    );

    let mut failures = 0;
    for dir in dirs {
        let files = files_with_extension(&dir, codec.extension());
        if files.is_empty() {
            debug!("No {} files in {}", codec.extension(), dir.display());
            continue;
        }
        let cmd = CommandSpec::new(program).args(fixed_args).args(&files);
        debug!("{}", cmd.display());
        match runner.run(&cmd) {
            Ok(out) if out.success => {}
            Ok(out) => {
                error!("replaygain failed in {}: {}", dir.display(), out.failure_reason());
                failures += 1;
            }
            Err(e) => {
                error!("replaygain failed in {}: {}", dir.display(), e);
                failures += 1;
            }
        }
    }
    failures
}

/// Files directly in `dir` ending in `extension`, sorted
fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().ends_with(extension))
                    .unwrap_or(false)
            })
            .collect(),
        Err(e) => {
            error!("Could not read {}: {}", dir.display(), e);
            Vec::new()
        }
    };
    files.sort();
    files
}

/// mktorrent invocation for `target`, or `None` when torrents are off
pub fn torrent_command(settings: &Settings, target: &Path) -> Option<CommandSpec> {
    if !settings.torrents_enabled() {
        return None;
    }
    let tracker = settings.tracker.as_deref()?;

    let mut torrent_name = OsString::from(target.file_name()?);
    torrent_name.push(".torrent");
    let torrent_path = settings.torrent_dir.join(torrent_name);

    let mut cmd = CommandSpec::new("mktorrent")
        .arg("-p")
        .arg("-a")
        .arg(tracker)
        .arg("-o")
        .arg(torrent_path)
        .args(&settings.additional);
    if settings.no_date {
        cmd = cmd.arg("-d");
    }
    Some(cmd.arg(target))
}

/// Create a torrent for `target` if a tracker is configured
///
/// Returns true when mktorrent ran and succeeded.
pub fn make_torrent(runner: &dyn CommandRunner, settings: &Settings, target: &Path) -> bool {
    let Some(cmd) = torrent_command(settings, target) else {
        return false;
    };
    info!(
        "MAKE: {}.torrent",
        target.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    );
    debug!("{}", cmd.display());

    match runner.run(&cmd) {
        Ok(out) if out.success => {
            debug!("{}", out.stdout.trim_end());
            true
        }
        Ok(out) => {
            error!("{}: {}", out.failure_reason(), cmd.display());
            false
        }
        Err(e) => {
            error!("{}: {}", e, cmd.display());
            false
        }
    }
}

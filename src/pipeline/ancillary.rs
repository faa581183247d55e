//! Ancillary file mirroring
//!
//! Copies everything that is neither a lossless track nor a playlist from the
//! source tree into a batch output tree: logs, cues, artwork, scans.

use crate::config::CopyFilters;
use crate::discovery::layout;
use crate::discovery::scanner::is_lossless;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Playlist extensions, never copied since they reference source filenames
const PLAYLIST_EXTENSIONS: [&str; 2] = ["m3u", "m3u8"];

/// Counts for one copy pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Mirror ancillary files from `source_root` into `output_dir`
pub fn copy_other(
    source_root: &Path,
    output_dir: &Path,
    filters: CopyFilters,
    overwrite: bool,
) -> CopyReport {
    info!("COPYING other files");
    let mut report = CopyReport::default();

    for entry in WalkDir::new(source_root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_ancillary(path, filters) {
            continue;
        }

        let dest = match layout::mirror_path(path, source_root, output_dir) {
            Ok(dest) => dest,
            Err(e) => {
                error!("{}", e);
                report.failed += 1;
                continue;
            }
        };

        if layout::same_file(path, &dest) {
            warn!("Not copying {} onto itself", path.display());
            report.skipped += 1;
            continue;
        }

        if dest.exists() && !overwrite {
            debug!("Not copying {}, destination exists", dest.display());
            report.skipped += 1;
            continue;
        }

        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Could not create {}: {}", parent.display(), e);
                report.failed += 1;
                continue;
            }
        }

        match fs::copy(path, &dest) {
            Ok(_) => {
                debug!("Copied {}", dest.display());
                report.copied += 1;
            }
            Err(e) => {
                error!("Could not copy {} to {}: {}", path.display(), dest.display(), e);
                report.failed += 1;
            }
        }
    }

    report
}

/// True if `path` should be mirrored under the given filters
pub fn is_ancillary(path: &Path, filters: CopyFilters) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
        return false;
    };
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if filters.no_logs && ext == "log" {
        return false;
    }
    if filters.no_cues && ext == "cue" {
        return false;
    }
    if filters.no_dotfiles && name.starts_with('.') {
        return false;
    }
    !is_lossless(path) && !PLAYLIST_EXTENSIONS.contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_ancillary_rules() {
        let none = CopyFilters::default();
        assert!(is_ancillary(Path::new("rip.log"), none));
        assert!(is_ancillary(Path::new("cover.jpg"), none));
        assert!(is_ancillary(Path::new(".nfo"), none));
        assert!(!is_ancillary(Path::new("01.flac"), none));
        assert!(!is_ancillary(Path::new("album.M3U"), none));
        assert!(!is_ancillary(Path::new("album.m3u8"), none));

        let all = CopyFilters {
            no_logs: true,
            no_cues: true,
            no_dotfiles: true,
        };
        assert!(!is_ancillary(Path::new("rip.LOG"), all));
        assert!(!is_ancillary(Path::new("album.cue"), all));
        assert!(!is_ancillary(Path::new(".DS_Store"), all));
        assert!(is_ancillary(Path::new("cover.jpg"), all));
    }

    #[test]
    fn test_copy_other_mirrors_tree() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("Scans")).unwrap();
        fs::write(src.path().join("rip.log"), b"log").unwrap();
        fs::write(src.path().join("Scans/front.jpg"), b"jpg").unwrap();
        fs::write(src.path().join("01.flac"), b"flac").unwrap();
        fs::write(src.path().join("album.m3u"), b"m3u").unwrap();

        let report = copy_other(src.path(), out.path(), CopyFilters::default(), false);

        assert_eq!(report.copied, 2);
        assert_eq!(fs::read(out.path().join("rip.log")).unwrap(), b"log");
        assert!(out.path().join("Scans/front.jpg").is_file());
        assert!(!out.path().join("01.flac").exists());
        assert!(!out.path().join("album.m3u").exists());
    }

    #[test]
    fn test_copy_other_respects_overwrite() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(src.path().join("info.txt"), b"new").unwrap();
        fs::write(out.path().join("info.txt"), b"old").unwrap();

        let report = copy_other(src.path(), out.path(), CopyFilters::default(), false);
        assert_eq!(report.skipped, 1);
        assert_eq!(fs::read(out.path().join("info.txt")).unwrap(), b"old");

        let report = copy_other(src.path(), out.path(), CopyFilters::default(), true);
        assert_eq!(report.copied, 1);
        assert_eq!(fs::read(out.path().join("info.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_copy_onto_itself_keeps_content() {
        let src = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("Scans")).unwrap();
        fs::write(src.path().join("rip.log"), b"EAC log").unwrap();
        fs::write(src.path().join("Scans/front.jpg"), b"jpg").unwrap();

        let report = copy_other(src.path(), src.path(), CopyFilters::default(), true);

        assert_eq!(report.copied, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(fs::read(src.path().join("rip.log")).unwrap(), b"EAC log");
        assert_eq!(fs::read(src.path().join("Scans/front.jpg")).unwrap(), b"jpg");
    }
}

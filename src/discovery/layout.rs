//! Output layout mapping
//!
//! Output trees mirror the source tree exactly, so two tracks under one
//! source directory can never map to the same output path.

use crate::codec::{Codec, SOURCE_EXTENSION, SOURCE_FORMAT};
use crate::error::{Result, TransflacError};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

static SOURCE_FORMAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", regex::escape(SOURCE_FORMAT)))
        .expect("source format marker is a valid pattern")
});

/// Output folder name for `source_dir` encoded as `codec`
///
/// "Album [FLAC]" becomes "Album [V0]"; names without the source format
/// marker get " (V0)" appended.
pub fn output_dir_name(source_dir: &Path, codec: Codec) -> String {
    let base = source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if SOURCE_FORMAT_RE.is_match(&base) {
        SOURCE_FORMAT_RE
            .replace_all(&base, NoExpand(codec.id()))
            .into_owned()
    } else {
        format!("{} ({})", base, codec.id())
    }
}

/// Output root for one source directory x codec batch
pub fn output_dir(source_dir: &Path, codec: Codec, output_root: &Path) -> PathBuf {
    output_root.join(output_dir_name(source_dir, codec))
}

/// Re-root `path` from `source_dir` to `dest_dir`
pub fn mirror_path(path: &Path, source_dir: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let relative = path
        .strip_prefix(source_dir)
        .map_err(|_| TransflacError::LayoutError {
            path: path.to_path_buf(),
            root: source_dir.to_path_buf(),
        })?;
    Ok(dest_dir.join(relative))
}

/// Output file for `track`: mirrored under `output_dir`, with the lossless
/// extension replaced by `extension` (which includes its leading dot)
pub fn output_file(
    track: &Path,
    source_dir: &Path,
    output_dir: &Path,
    extension: &str,
) -> Result<PathBuf> {
    let mirrored = mirror_path(track, source_dir, output_dir)?;

    let has_source_ext = mirrored
        .extension()
        .map(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false);
    let stem = if has_source_ext {
        mirrored.with_extension("")
    } else {
        mirrored
    };

    let mut name = OsString::from(stem);
    name.push(extension);
    Ok(PathBuf::from(name))
}

/// `path` with symlinks resolved, for paths that may not exist yet
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended unchanged.
pub fn resolved(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => break,
        }
    }

    let mut out = fs::canonicalize(existing).unwrap_or_else(|_| existing.to_path_buf());
    for name in missing.into_iter().rev() {
        out.push(name);
    }
    out
}

/// True if one tree is, or lies inside, the other
pub fn trees_overlap(a: &Path, b: &Path) -> bool {
    let a = resolved(a);
    let b = resolved(b);
    a.starts_with(&b) || b.starts_with(&a)
}

/// True if both paths exist and name the same file
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dir_name_replaces_marker_case_insensitive() {
        assert_eq!(
            output_dir_name(Path::new("/music/Artist - Album (2001) [FLAC]"), Codec::V0),
            "Artist - Album (2001) [V0]"
        );
        assert_eq!(
            output_dir_name(Path::new("/music/Album flac 24"), Codec::Mp3_320),
            "Album 320 24"
        );
    }

    #[test]
    fn test_dir_name_appends_marker() {
        assert_eq!(
            output_dir_name(Path::new("/music/Album"), Codec::Q8),
            "Album (Q8)"
        );
    }

    #[test]
    fn test_output_dir_joins_root() {
        assert_eq!(
            output_dir(Path::new("/music/Album [FLAC]"), Codec::Aac, Path::new("/out")),
            PathBuf::from("/out/Album [AAC]")
        );
    }

    #[test]
    fn test_output_file_mirrors_and_swaps_extension() {
        let out = output_file(
            Path::new("/music/Album [FLAC]/CD1/01 - Intro.FLAC"),
            Path::new("/music/Album [FLAC]"),
            Path::new("/out/Album [V0]"),
            ".mp3",
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/Album [V0]/CD1/01 - Intro.mp3"));
    }

    #[test]
    fn test_output_file_strips_only_one_extension() {
        let out = output_file(
            Path::new("/in/a.flac.flac"),
            Path::new("/in"),
            Path::new("/out"),
            ".ogg",
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/a.flac.ogg"));
    }

    #[test]
    fn test_output_file_is_pure() {
        let args = (
            Path::new("/in/x/y.flac"),
            Path::new("/in"),
            Path::new("/out"),
        );
        let a = output_file(args.0, args.1, args.2, ".m4a").unwrap();
        let b = output_file(args.0, args.1, args.2, ".m4a").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_output_file_rejects_foreign_track() {
        let err = output_file(Path::new("/elsewhere/a.flac"), Path::new("/in"), Path::new("/out"), ".mp3")
            .unwrap_err();
        assert!(matches!(err, TransflacError::LayoutError { .. }));
    }

    #[test]
    fn test_trees_overlap() {
        let tmp = TempDir::new().unwrap();
        let album = tmp.path().join("Album [FLAC]");
        fs::create_dir_all(&album).unwrap();

        // FLAC output next to a FLAC source lands on the source itself
        let same = output_dir(&album, Codec::Flac, tmp.path());
        assert!(trees_overlap(&album, &same));
        assert!(trees_overlap(&album, &album.join("nested (V0)")));
        assert!(trees_overlap(&album.join("CD1"), &album));

        let sibling = output_dir(&album, Codec::V0, tmp.path());
        assert!(!trees_overlap(&album, &sibling));
        assert!(!trees_overlap(&album, &tmp.path().join("Album [FLAC] 2")));
    }

    #[cfg(unix)]
    #[test]
    fn test_trees_overlap_through_symlink() {
        let tmp = TempDir::new().unwrap();
        let album = tmp.path().join("Album [FLAC]");
        fs::create_dir_all(&album).unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(tmp.path(), &link).unwrap();

        assert!(trees_overlap(&album, &link.join("Album [FLAC]")));
        assert!(same_file(&album, &link.join("Album [FLAC]")));
    }

    #[test]
    fn test_same_file_requires_both_to_exist() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.log");
        fs::write(&a, b"x").unwrap();
        assert!(same_file(&a, &tmp.path().join(".").join("a.log")));
        assert!(!same_file(&a, &tmp.path().join("b.log")));
    }
}

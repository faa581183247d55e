//! Lossless track discovery

use crate::codec::SOURCE_EXTENSION;
use crate::error::{Result, TransflacError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A source album directory and the lossless tracks under it
#[derive(Debug, Clone)]
pub struct SourceDirectory {
    /// Absolute path of the directory
    pub root: PathBuf,
    /// Lossless tracks, sorted for deterministic scheduling
    pub tracks: Vec<PathBuf>,
}

impl SourceDirectory {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Directory base name, used for output folders and torrent names
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scan a directory recursively for lossless tracks
pub fn scan(input: &Path) -> Result<SourceDirectory> {
    let root = std::path::absolute(input)?;
    if !root.is_dir() {
        return Err(TransflacError::DirectoryNotFound(root));
    }

    let mut tracks = Vec::new();
    for entry in WalkDir::new(&root).into_iter() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_lossless(path) {
            debug!("Discovered: {}", path.display());
            tracks.push(path.to_path_buf());
        }
    }
    tracks.sort();

    info!("Discovered {} lossless files in {}", tracks.len(), root.display());

    Ok(SourceDirectory { root, tracks })
}

/// True for files with the lossless source extension, in any case
pub fn is_lossless(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}

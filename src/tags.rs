//! Tag resolution from source tracks
//!
//! Tags are read with an external query per key. A failed or empty query
//! leaves the key absent; it is never an error for the track.

use crate::error::{Result, TransflacError};
use crate::process::{CommandRunner, CommandSpec};
use crate::types::{TagKey, TagSet};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Tag query backend
pub trait TagReader: Send + Sync {
    /// Read one tag; `Ok(None)` when the file has no such tag
    fn read_tag(&self, path: &Path, key: TagKey) -> Result<Option<String>>;
}

/// Queries Vorbis comments with `metaflac --show-tag`
pub struct MetaflacTagReader {
    runner: Arc<dyn CommandRunner>,
}

impl MetaflacTagReader {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl TagReader for MetaflacTagReader {
    fn read_tag(&self, path: &Path, key: TagKey) -> Result<Option<String>> {
        let cmd = CommandSpec::new("metaflac")
            .arg(format!("--show-tag={}", key.field_name()))
            .arg(path);
        let output = self.runner.run(&cmd)?;
        if !output.success {
            return Err(TransflacError::TagError {
                path: path.to_path_buf(),
                reason: output.failure_reason(),
            });
        }
        Ok(parse_show_tag(&output.stdout, key.field_name()))
    }
}

/// Extract the values of `field` from `metaflac --show-tag` output
///
/// Each value starts with a `FIELD=` line; any other line continues the
/// previous value. Multiple values are joined with "; ".
pub fn parse_show_tag(stdout: &str, field: &str) -> Option<String> {
    let mut values: Vec<String> = Vec::new();
    for line in stdout.trim_end().lines() {
        match strip_field(line, field) {
            Some(value) => values.push(value.to_string()),
            None => {
                if let Some(current) = values.last_mut() {
                    current.push('\n');
                    current.push_str(line);
                }
            }
        }
    }
    values.retain(|value| !value.is_empty());

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

fn strip_field<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let (name, value) = line.split_once('=')?;
    name.eq_ignore_ascii_case(field).then_some(value)
}

/// Resolve every copied tag for one track
pub fn resolve(reader: &dyn TagReader, path: &Path) -> TagSet {
    let mut tags = TagSet::new();
    for key in TagKey::ALL {
        match reader.read_tag(path, key) {
            Ok(Some(value)) => tags.insert(key, value),
            Ok(None) => {}
            Err(e) => debug!("No {} for {}: {}", key.field_name(), path.display(), e),
        }
    }
    tags
}

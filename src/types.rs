//! Core data types for transflac
//!
//! These types represent the domain model and flow through the pipeline.

use crate::codec::Codec;
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Tags
// =============================================================================

/// Tags copied from the source file into every transcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKey {
    Title,
    Album,
    Artist,
    TrackNumber,
    Genre,
    Comment,
    Date,
}

impl TagKey {
    pub const ALL: [TagKey; 7] = [
        TagKey::Title,
        TagKey::Album,
        TagKey::Artist,
        TagKey::TrackNumber,
        TagKey::Genre,
        TagKey::Comment,
        TagKey::Date,
    ];

    /// Vorbis comment field name
    pub fn field_name(self) -> &'static str {
        match self {
            TagKey::Title => "TITLE",
            TagKey::Album => "ALBUM",
            TagKey::Artist => "ARTIST",
            TagKey::TrackNumber => "TRACKNUMBER",
            TagKey::Genre => "GENRE",
            TagKey::Comment => "COMMENT",
            TagKey::Date => "DATE",
        }
    }
}

/// Tag values resolved from one source track
///
/// Keys missing from the source are absent, never stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    values: BTreeMap<TagKey, String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; empty values are dropped
    pub fn insert(&mut self, key: TagKey, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.values.insert(key, value);
        }
    }

    pub fn get(&self, key: TagKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: TagKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Present tags in [`TagKey`] order
    pub fn iter(&self) -> impl Iterator<Item = (TagKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pad a single-character track number with a leading zero
    pub fn zero_padded(mut self) -> Self {
        if let Some(track) = self.values.get_mut(&TagKey::TrackNumber) {
            if track.chars().count() == 1 {
                track.insert(0, '0');
            }
        }
        self
    }

    pub fn without_genre(mut self) -> Self {
        self.values.remove(&TagKey::Genre);
        self
    }

    /// Apply the configured transforms in one step
    pub fn transformed(self, zeropad: bool, skip_genre: bool) -> Self {
        let tags = if zeropad { self.zero_padded() } else { self };
        if skip_genre {
            tags.without_genre()
        } else {
            tags
        }
    }
}

impl FromIterator<(TagKey, String)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (TagKey, String)>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for (key, value) in iter {
            tags.insert(key, value);
        }
        tags
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Outcome of transcoding a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Output written
    Encoded,
    /// Output already existed and overwrite was off
    SkippedExists,
    /// Pipeline failed; the batch sentinel was touched
    Failed { reason: String },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// Per-file outcomes of one source directory x codec batch
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub codec: Codec,
    pub output_dir: PathBuf,
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
}

impl BatchResult {
    pub fn new(codec: Codec, output_dir: PathBuf) -> Self {
        Self {
            codec,
            output_dir,
            outcomes: Vec::new(),
        }
    }

    pub fn encoded(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Encoded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::SkippedExists))
    }

    pub fn failed(&self) -> usize {
        self.count(FileOutcome::is_failure)
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, o)| o.is_failure())
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

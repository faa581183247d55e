//! transflac - Batch transcoding of lossless albums
//!
//! A command-line utility that transcodes directories of FLAC files into
//! MP3, Ogg Vorbis, AAC, ALAC or FLAC, mirroring the source layout, copying
//! tags, and optionally applying ReplayGain and creating torrents.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: Track scanning and output layout mapping
//! - `codec`: Codec targets and encoder profiles
//! - `tags`: Tag resolution from source tracks
//! - `command`: Encode pipeline construction
//! - `process`: External process execution (swappable runner)
//! - `pipeline`: Workers, scheduling and per-batch post-processing
//!
//! Individual track failures never fail the run: they are logged and marked
//! with a `FAILURE` file in the affected output directory.
//!
//! # Example
//!
//! ```no_run
//! use transflac::{codec::Codec, config::Settings, pipeline};
//!
//! let settings = Settings {
//!     flacdirs: vec!["Album [FLAC]".into()],
//!     codecs: vec![Codec::V0],
//!     ..Settings::default()
//! };
//! let summary = pipeline::run(&settings).expect("Transcode failed");
//! println!("Encoded {} tracks", summary.encoded());
//! ```

pub mod codec;
pub mod command;
pub mod config;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod tags;
pub mod types;

// Re-export key types at crate root
pub use codec::Codec;
pub use error::{Result, TransflacError};
pub use types::{BatchResult, FileOutcome, TagKey, TagSet};

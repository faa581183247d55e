//! Runtime configuration settings

use crate::codec::Codec;
use crate::error::{Result, TransflacError};
use std::path::PathBuf;

/// Ancillary file filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyFilters {
    /// Skip `*.log`
    pub no_logs: bool,
    /// Skip `*.cue`
    pub no_cues: bool,
    /// Skip files whose name starts with a dot
    pub no_dotfiles: bool,
}

/// Runtime settings for a transcode run, resolved once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    /// Source directories, processed in order
    pub flacdirs: Vec<PathBuf>,
    /// Requested codecs, processed in order
    pub codecs: Vec<Codec>,
    /// Root for transcoded trees
    pub output: PathBuf,
    /// Root for .torrent files
    pub torrent_dir: PathBuf,
    /// Announce URL; torrents are only made when set
    pub tracker: Option<String>,
    /// Extra mktorrent arguments
    pub additional: Vec<String>,
    /// Concurrency budget for encoders
    pub max_threads: usize,
    pub verbose: bool,
    pub silent: bool,
    pub no_torrent: bool,
    pub replaygain: bool,
    /// Also make a torrent for the untouched source tree
    pub original: bool,
    /// Skip source directories without lossless files
    pub ignore_empty: bool,
    pub skip_genre: bool,
    pub dither: bool,
    pub zeropad: bool,
    pub overwrite: bool,
    pub copy_other: bool,
    pub no_date: bool,
    pub filters: CopyFilters,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Result<Self> {
        let output = match &cli.output {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let torrent_dir = cli.torrent_dir.clone().unwrap_or_else(|| output.clone());

        Ok(Self {
            flacdirs: cli.flacdirs.clone(),
            codecs: cli.codecs.clone(),
            output,
            torrent_dir,
            tracker: cli.tracker.clone().filter(|t| !t.is_empty()),
            additional: split_additional(cli.additional.as_deref())?,
            max_threads: effective_threads(cli.threads),
            verbose: cli.verbose,
            silent: cli.silent,
            no_torrent: cli.notorrent,
            replaygain: cli.replaygain,
            original: cli.original,
            ignore_empty: cli.ignore,
            skip_genre: cli.skipgenre,
            dither: cli.dither,
            zeropad: cli.zeropad_enabled(),
            overwrite: cli.overwrite,
            copy_other: cli.copyother_enabled(),
            no_date: cli.nodate,
            filters: CopyFilters {
                no_logs: cli.nolog,
                no_cues: cli.nocue,
                no_dotfiles: cli.nodots,
            },
        })
    }

    /// Reject runs that have nothing to do
    pub fn validate(&self) -> Result<()> {
        if self.codecs.is_empty() && !self.original {
            return Err(TransflacError::ConfigError(
                "you must provide at least one format to transcode to (e.g. --V0)".to_string(),
            ));
        }
        if self.flacdirs.is_empty() {
            return Err(TransflacError::ConfigError(
                "no source directories given".to_string(),
            ));
        }
        Ok(())
    }

    /// Torrents are made only with a tracker and without --notorrent
    pub fn torrents_enabled(&self) -> bool {
        self.tracker.is_some() && !self.no_torrent
    }
}

/// Tokenize extra mktorrent arguments with shell quoting rules
pub fn split_additional(raw: Option<&str>) -> Result<Vec<String>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    shell_words::split(raw).map_err(|e| {
        TransflacError::ConfigError(format!("invalid --additional arguments {:?}: {}", raw, e))
    })
}

/// Concurrency budget: the CPU count by default, never below one
pub fn effective_threads(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n >= 1 => usize::try_from(n).unwrap_or(usize::MAX),
        Some(_) => 1,
        None => num_cpus::get().max(1),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            flacdirs: Vec::new(),
            codecs: Vec::new(),
            output: PathBuf::from("."),
            torrent_dir: PathBuf::from("."),
            tracker: None,
            additional: Vec::new(),
            max_threads: num_cpus::get().max(1),
            verbose: false,
            silent: false,
            no_torrent: false,
            replaygain: false,
            original: false,
            ignore_empty: false,
            skip_genre: false,
            dither: false,
            zeropad: true,
            overwrite: false,
            copy_other: true,
            no_date: false,
            filters: CopyFilters::default(),
        }
    }
}

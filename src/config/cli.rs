//! CLI argument parsing and configuration

use crate::codec::Codec;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;

/// transflac - transcode lossless albums and create torrents for them
///
/// Encodes every FLAC under each source directory into the requested
/// formats, mirroring the directory layout and copying tags.
#[derive(Parser, Debug)]
#[command(name = "transflac")]
#[command(author, version, about, long_about = None)]
#[command(args_override_self = true)]
#[command(after_help = "Depends on flac, metaflac, mktorrent, and optionally oggenc, lame, \
neroAacEnc, neroAacTag, ffmpeg, mp3gain, aacgain, vorbisgain, and sox")]
pub struct Cli {
    /// Directories to transcode
    #[arg(value_name = "FLACDIR", required = true)]
    pub flacdirs: Vec<PathBuf>,

    /// Convert to 320
    #[arg(long = "320")]
    pub codec_320: bool,

    /// Convert to V0
    #[arg(long = "V0")]
    pub codec_v0: bool,

    /// Convert to V2
    #[arg(long = "V2")]
    pub codec_v2: bool,

    /// Convert to V8
    #[arg(long = "V8")]
    pub codec_v8: bool,

    /// Convert to Q8
    #[arg(long = "Q8")]
    pub codec_q8: bool,

    /// Convert to AAC
    #[arg(long = "AAC")]
    pub codec_aac: bool,

    /// Convert to ALAC
    #[arg(long = "ALAC")]
    pub codec_alac: bool,

    /// Convert to FLAC
    #[arg(long = "FLAC")]
    pub codec_flac: bool,

    /// Set output dir (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Set independent torrent output dir (defaults to the output dir)
    #[arg(short = 'O', long, value_name = "DIR")]
    pub torrent_dir: Option<PathBuf>,

    /// Tracker URL
    #[arg(short, long, value_name = "URL")]
    pub tracker: Option<String>,

    /// Additional arguments to mktorrent
    #[arg(short, long, value_name = "ARGS", allow_hyphen_values = true)]
    pub additional: Option<String>,

    /// Set number of threads (defaults to CPU count)
    #[arg(short = 'T', long, value_name = "THREADS", allow_negative_numbers = true)]
    pub threads: Option<i64>,

    /// Increase verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long)]
    pub silent: bool,

    /// Do not create a torrent after conversion
    #[arg(short, long)]
    pub notorrent: bool,

    /// Add ReplayGain to new files
    #[arg(short, long)]
    pub replaygain: bool,

    /// Create a torrent for the original FLAC
    #[arg(short = 'c', long)]
    pub original: bool,

    /// Ignore top level directories without flacs
    #[arg(short, long)]
    pub ignore: bool,

    /// Do not insert a genre tag
    #[arg(short = 'S', long)]
    pub skipgenre: bool,

    /// Dither FLACs to 16/44 before encoding
    #[arg(short, long)]
    pub dither: bool,

    /// Zeropad tracknumbers (default: on)
    #[arg(short, long, overrides_with = "no_zeropad")]
    pub zeropad: bool,

    /// Do not zeropad tracknumbers
    #[arg(long)]
    pub no_zeropad: bool,

    /// Overwrite files in output dir
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// Copy additional files (default: on)
    #[arg(short = 'm', long, overrides_with = "no_copyother")]
    pub copyother: bool,

    /// Do not copy additional files
    #[arg(long)]
    pub no_copyother: bool,

    /// Do not write the creation date to the .torrent file
    #[arg(short = 'D', long)]
    pub nodate: bool,

    /// Do not copy log files after conversion
    #[arg(short = 'L', long)]
    pub nolog: bool,

    /// Do not copy cue files after conversion
    #[arg(short = 'C', long)]
    pub nocue: bool,

    /// Do not copy dot/hidden files after conversion
    #[arg(short = 'H', long)]
    pub nodots: bool,

    /// Requested codecs in command-line order (filled after parsing)
    #[arg(skip)]
    pub codecs: Vec<Codec>,
}

/// Codec flag argument ids, matching the field names above
const CODEC_ARGS: [(&str, Codec); 8] = [
    ("codec_320", Codec::Mp3_320),
    ("codec_v0", Codec::V0),
    ("codec_v2", Codec::V2),
    ("codec_v8", Codec::V8),
    ("codec_q8", Codec::Q8),
    ("codec_aac", Codec::Aac),
    ("codec_alac", Codec::Alac),
    ("codec_flac", Codec::Flac),
];

impl Cli {
    /// Parse the process arguments, exiting on usage errors
    pub fn parse_args() -> Self {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Parse an explicit argument list
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut cli = Self::from_arg_matches(matches)?;
        cli.codecs = codecs_in_order(matches);
        Ok(cli)
    }

    /// Effective zero-padding, which defaults to on
    pub fn zeropad_enabled(&self) -> bool {
        self.zeropad || !self.no_zeropad
    }

    /// Effective ancillary copying, which defaults to on
    pub fn copyother_enabled(&self) -> bool {
        self.copyother || !self.no_copyother
    }

    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.silent {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Requested codecs ordered by where their flag last appeared
fn codecs_in_order(matches: &ArgMatches) -> Vec<Codec> {
    let mut requested: Vec<(usize, Codec)> = CODEC_ARGS
        .iter()
        .filter(|(id, _)| matches.get_flag(id))
        .map(|(id, codec)| (matches.index_of(id).unwrap_or(usize::MAX), *codec))
        .collect();
    requested.sort_by_key(|(index, _)| *index);
    requested.into_iter().map(|(_, codec)| codec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["transflac"];
        argv.extend_from_slice(args);
        Cli::try_parse_args(argv).unwrap()
    }

    #[test]
    fn test_codecs_keep_command_line_order() {
        let cli = parse(&["--V0", "--320", "--FLAC", "album"]);
        assert_eq!(cli.codecs, vec![Codec::V0, Codec::Mp3_320, Codec::Flac]);
    }

    #[test]
    fn test_repeated_codec_is_deduplicated() {
        let cli = parse(&["--V0", "--V0", "album"]);
        assert_eq!(cli.codecs, vec![Codec::V0]);
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["album"]);
        assert!(cli.codecs.is_empty());
        assert!(cli.zeropad_enabled());
        assert!(cli.copyother_enabled());
        assert!(!cli.dither);
        assert_eq!(cli.threads, None);
        assert_eq!(cli.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_negated_defaults() {
        let cli = parse(&["--no-zeropad", "--no-copyother", "album"]);
        assert!(!cli.zeropad_enabled());
        assert!(!cli.copyother_enabled());
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&[
            "-t", "https://tracker/announce", "-a", "-l 20", "-T", "4", "-o", "/out", "-O",
            "/torrents", "-nrciSdzwmDLCHs", "--Q8", "a", "b",
        ]);
        assert_eq!(cli.tracker.as_deref(), Some("https://tracker/announce"));
        assert_eq!(cli.additional.as_deref(), Some("-l 20"));
        assert_eq!(cli.threads, Some(4));
        assert_eq!(cli.output, Some(PathBuf::from("/out")));
        assert_eq!(cli.torrent_dir, Some(PathBuf::from("/torrents")));
        assert!(cli.notorrent && cli.replaygain && cli.original && cli.ignore);
        assert!(cli.skipgenre && cli.dither && cli.overwrite && cli.nodate);
        assert!(cli.nolog && cli.nocue && cli.nodots && cli.silent);
        assert_eq!(cli.flacdirs.len(), 2);
        assert_eq!(cli.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_flacdir_required() {
        assert!(Cli::try_parse_args(["transflac", "--V0"]).is_err());
    }
}

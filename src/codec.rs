//! Codec targets and the encoder profiles behind them
//!
//! Every [`Codec`] maps to exactly one [`Encoder`]. The encoder knows how to
//! render each [`TagKey`] as a command fragment and which tool applies
//! ReplayGain to its output.

use crate::types::TagKey;

/// Lossless source format name, as it appears in album folder names
pub const SOURCE_FORMAT: &str = "FLAC";

/// Extension of lossless source files (matched case-insensitively)
pub const SOURCE_EXTENSION: &str = "flac";

/// A requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Mp3_320,
    V0,
    V2,
    V8,
    Q8,
    Aac,
    Alac,
    Flac,
}

impl Codec {
    pub const ALL: [Codec; 8] = [
        Codec::Mp3_320,
        Codec::V0,
        Codec::V2,
        Codec::V8,
        Codec::Q8,
        Codec::Aac,
        Codec::Alac,
        Codec::Flac,
    ];

    /// Identifier used on the command line and in output folder names
    pub fn id(self) -> &'static str {
        match self {
            Codec::Mp3_320 => "320",
            Codec::V0 => "V0",
            Codec::V2 => "V2",
            Codec::V8 => "V8",
            Codec::Q8 => "Q8",
            Codec::Aac => "AAC",
            Codec::Alac => "ALAC",
            Codec::Flac => "FLAC",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn encoder(self) -> Encoder {
        match self {
            Codec::Mp3_320 | Codec::V0 | Codec::V2 | Codec::V8 => Encoder::Lame,
            Codec::Q8 => Encoder::Oggenc,
            Codec::Aac => Encoder::NeroAac,
            Codec::Alac => Encoder::Ffmpeg,
            Codec::Flac => Encoder::Flac,
        }
    }

    /// Output file extension, including the leading dot
    pub fn extension(self) -> &'static str {
        match self.encoder() {
            Encoder::Lame => ".mp3",
            Encoder::Oggenc => ".ogg",
            Encoder::NeroAac => ".aac",
            Encoder::Ffmpeg => ".m4a",
            Encoder::Flac => ".flac",
        }
    }

    /// Encoder option string
    pub fn options(self) -> &'static str {
        match self {
            Codec::Mp3_320 => "-q 0 -b 320 --ignore-tag-errors --noreplaygain",
            Codec::V0 => "-q 0 -V 0 --vbr-new --ignore-tag-errors --noreplaygain",
            Codec::V2 => "-q 0 -V 2 --vbr-new --ignore-tag-errors --noreplaygain",
            Codec::V8 => "-q 0 -V 8 --vbr-new --ignore-tag-errors --noreplaygain",
            Codec::Q8 => "-q 8 --utf8",
            Codec::Aac => "-br 320000",
            Codec::Alac => "",
            Codec::Flac => "--best",
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// External encoder profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoder {
    Lame,
    Oggenc,
    NeroAac,
    Ffmpeg,
    Flac,
}

impl Encoder {
    pub fn program(self) -> &'static str {
        match self {
            Encoder::Lame => "lame",
            Encoder::Oggenc => "oggenc",
            Encoder::NeroAac => "neroAacEnc",
            Encoder::Ffmpeg => "ffmpeg",
            Encoder::Flac => "flac",
        }
    }

    /// Argument template for one tag; `{}` is replaced by the tag value.
    pub fn tag_template(self, key: TagKey) -> &'static [&'static str] {
        match (self, key) {
            (Encoder::Lame, TagKey::Title) => &["--tt", "{}"],
            (Encoder::Lame, TagKey::Album) => &["--tl", "{}"],
            (Encoder::Lame, TagKey::Artist) => &["--ta", "{}"],
            (Encoder::Lame, TagKey::TrackNumber) => &["--tn", "{}"],
            (Encoder::Lame, TagKey::Genre) => &["--tg", "{}"],
            (Encoder::Lame, TagKey::Date) => &["--ty", "{}"],
            (Encoder::Lame, TagKey::Comment) => &["--tc", "{}"],

            (Encoder::Oggenc, TagKey::Title) => &["-t", "{}"],
            (Encoder::Oggenc, TagKey::Album) => &["-l", "{}"],
            (Encoder::Oggenc, TagKey::Artist) => &["-a", "{}"],
            (Encoder::Oggenc, TagKey::TrackNumber) => &["-N", "{}"],
            (Encoder::Oggenc, TagKey::Genre) => &["-G", "{}"],
            (Encoder::Oggenc, TagKey::Date) => &["-d", "{}"],
            (Encoder::Oggenc, TagKey::Comment) => &["-c", "comment={}"],

            (Encoder::NeroAac, TagKey::Title) => &["-meta:title={}"],
            (Encoder::NeroAac, TagKey::Album) => &["-meta:album={}"],
            (Encoder::NeroAac, TagKey::Artist) => &["-meta:artist={}"],
            (Encoder::NeroAac, TagKey::TrackNumber) => &["-meta:track={}"],
            (Encoder::NeroAac, TagKey::Genre) => &["-meta:genre={}"],
            (Encoder::NeroAac, TagKey::Date) => &["-meta:year={}"],
            (Encoder::NeroAac, TagKey::Comment) => &["-meta:comment={}"],

            (Encoder::Ffmpeg, TagKey::Title) => &["-metadata", "title={}"],
            (Encoder::Ffmpeg, TagKey::Album) => &["-metadata", "album={}"],
            (Encoder::Ffmpeg, TagKey::Artist) => &["-metadata", "author={}"],
            (Encoder::Ffmpeg, TagKey::TrackNumber) => &["-metadata", "track={}"],
            (Encoder::Ffmpeg, TagKey::Genre) => &["-metadata", "genre={}"],
            (Encoder::Ffmpeg, TagKey::Date) => &["-metadata", "date={}"],
            (Encoder::Ffmpeg, TagKey::Comment) => &["-metadata", "comment={}"],

            (Encoder::Flac, TagKey::Title) => &["-T", "TITLE={}"],
            (Encoder::Flac, TagKey::Album) => &["-T", "ALBUM={}"],
            (Encoder::Flac, TagKey::Artist) => &["-T", "ARTIST={}"],
            (Encoder::Flac, TagKey::TrackNumber) => &["-T", "TRACKNUMBER={}"],
            (Encoder::Flac, TagKey::Genre) => &["-T", "GENRE={}"],
            (Encoder::Flac, TagKey::Date) => &["-T", "DATE={}"],
            (Encoder::Flac, TagKey::Comment) => &["-T", "COMMENT={}"],
        }
    }

    /// Separate tagging program run on the finished file, for encoders that
    /// cannot tag while encoding
    pub fn tagger(self) -> Option<&'static str> {
        match self {
            Encoder::NeroAac => Some("neroAacTag"),
            _ => None,
        }
    }

    /// ReplayGain tool and its fixed arguments; the matching files are appended
    pub fn normalizer(self) -> Option<(&'static str, &'static [&'static str])> {
        match self {
            Encoder::Lame => Some(("mp3gain", &["-q", "-c", "-s", "i"])),
            Encoder::Oggenc => Some(("vorbisgain", &["-qafrs"])),
            Encoder::NeroAac => Some(("aacgain", &["-q", "-c"])),
            Encoder::Ffmpeg => None,
            Encoder::Flac => Some(("metaflac", &["--add-replay-gain"])),
        }
    }
}

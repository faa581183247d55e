//! Encode command construction
//!
//! Builds the decode → (dither) → encode pipeline for one track. Building is
//! pure: nothing here touches the filesystem. Paths and tag values go into
//! the argument vector verbatim, so quotes and percent signs in titles or
//! filenames cannot change argument boundaries.

use crate::codec::{Codec, Encoder};
use crate::process::CommandSpec;
use crate::types::TagSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Resample/dither stage inserted before the encoder
const DITHER_ARGS: &[&str] = &[
    "-t", "wav", "-", "-b", "16", "-t", "wav", "-", "rate", "44100", "dither",
];

/// Everything needed to transcode one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodePipeline {
    /// Stages connected stdout → stdin, decoder first
    pub stages: Vec<CommandSpec>,
    /// Tagging step run after a successful encode
    pub tagger: Option<CommandSpec>,
    /// File the encoder writes
    pub output: PathBuf,
}

impl EncodePipeline {
    /// Shell rendering of the whole pipeline, for verbose logs
    pub fn display(&self) -> String {
        let mut line = self
            .stages
            .iter()
            .map(CommandSpec::display)
            .collect::<Vec<_>>()
            .join(" | ");
        if let Some(tagger) = &self.tagger {
            line.push_str(" && ");
            line.push_str(&tagger.display());
        }
        line
    }
}

/// Compose the pipeline that transcodes `track` into `output`
pub fn build(track: &Path, output: &Path, codec: Codec, tags: &TagSet, dither: bool) -> EncodePipeline {
    let encoder = codec.encoder();
    let opts: Vec<&str> = codec.options().split_whitespace().collect();
    let tag_args = tag_fragments(encoder, tags);

    let mut stages = vec![CommandSpec::new("flac").arg("-sdc").arg("--").arg(track)];
    if dither {
        stages.push(CommandSpec::new("sox").args(DITHER_ARGS));
    }

    let mut tagger = None;
    let encode = CommandSpec::new(encoder.program()).args(&opts);
    let encode = match encoder {
        Encoder::Lame => encode
            .arg("--silent")
            .args(&tag_args)
            .arg("--add-id3v2")
            .arg("-")
            .arg(output),
        Encoder::Oggenc => encode
            .arg("-Q")
            .args(&tag_args)
            .arg("-o")
            .arg(output)
            .arg("-"),
        Encoder::NeroAac => {
            if let Some(program) = encoder.tagger() {
                tagger = Some(CommandSpec::new(program).arg(output).args(&tag_args));
            }
            encode.arg("-if").arg("-").arg("-of").arg(output)
        }
        Encoder::Ffmpeg => encode
            .arg("-y")
            .arg("-i")
            .arg("-")
            .arg("-acodec")
            .arg("alac")
            .args(&tag_args)
            .arg(output),
        Encoder::Flac => encode
            .arg("-f")
            .arg("-s")
            .args(&tag_args)
            .arg("-o")
            .arg(output)
            .arg("-"),
    };
    stages.push(encode);

    EncodePipeline {
        stages,
        tagger,
        output: output.to_path_buf(),
    }
}

/// One argument fragment per present tag, in tag order
pub fn tag_fragments(encoder: Encoder, tags: &TagSet) -> Vec<OsString> {
    tags.iter()
        .flat_map(|(key, value)| {
            encoder
                .tag_template(key)
                .iter()
                .map(move |part| OsString::from(part.replacen("{}", value, 1)))
        })
        .collect()
}

/// Escape single quotes for use inside a single-quoted shell word
pub fn escape_quote(value: &str) -> String {
    value.replace('\'', r#"'"'"'"#)
}

/// Render a value as a single-quoted shell word
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", escape_quote(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagKey;

    fn args_of(spec: &CommandSpec) -> Vec<String> {
        spec.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn sample_tags() -> TagSet {
        let mut tags = TagSet::new();
        tags.insert(TagKey::Title, "Rock 'n' Roll 100%");
        tags.insert(TagKey::TrackNumber, "03");
        tags
    }

    #[test]
    fn test_lame_pipeline_layout() {
        let p = build(
            Path::new("/in/01 - it's.flac"),
            Path::new("/out/01 - it's.mp3"),
            Codec::V0,
            &sample_tags(),
            false,
        );
        assert_eq!(p.stages.len(), 2);
        assert_eq!(p.stages[0].program, "flac");
        assert_eq!(args_of(&p.stages[0]), vec!["-sdc", "--", "/in/01 - it's.flac"]);

        let enc = &p.stages[1];
        assert_eq!(enc.program, "lame");
        let args = args_of(enc);
        assert_eq!(&args[..6], &["-q", "0", "-V", "0", "--vbr-new", "--ignore-tag-errors"]);
        assert!(args.contains(&"Rock 'n' Roll 100%".to_string()));
        assert_eq!(args[args.len() - 2], "-");
        assert_eq!(args[args.len() - 1], "/out/01 - it's.mp3");
        assert_eq!(p.output, PathBuf::from("/out/01 - it's.mp3"));
        assert!(p.tagger.is_none());
    }

    #[test]
    fn test_dither_inserts_sox_stage() {
        let p = build(
            Path::new("/in/a.flac"),
            Path::new("/out/a.ogg"),
            Codec::Q8,
            &TagSet::new(),
            true,
        );
        let programs: Vec<_> = p.stages.iter().map(|s| s.program.as_str()).collect();
        assert_eq!(programs, vec!["flac", "sox", "oggenc"]);
        assert_eq!(args_of(&p.stages[1]).last().map(String::as_str), Some("dither"));
    }

    #[test]
    fn test_absent_tags_add_no_fragments() {
        assert!(tag_fragments(Encoder::Flac, &TagSet::new()).is_empty());

        let frags = tag_fragments(Encoder::Flac, &sample_tags());
        let frags: Vec<_> = frags.iter().map(|f| f.to_string_lossy().into_owned()).collect();
        assert_eq!(
            frags,
            vec!["-T", "TITLE=Rock 'n' Roll 100%", "-T", "TRACKNUMBER=03"]
        );
    }

    #[test]
    fn test_placeholder_in_value_is_not_expanded() {
        let mut tags = TagSet::new();
        tags.insert(TagKey::Comment, "{} and %(TITLE)s");
        let frags = tag_fragments(Encoder::Oggenc, &tags);
        assert_eq!(frags[1].to_string_lossy(), "comment={} and %(TITLE)s");
    }

    #[test]
    fn test_aac_tags_in_separate_step() {
        let p = build(
            Path::new("/in/a.flac"),
            Path::new("/out/a.aac"),
            Codec::Aac,
            &sample_tags(),
            false,
        );
        let enc = args_of(&p.stages[1]);
        assert!(!enc.iter().any(|a| a.starts_with("-meta:")));
        let tagger = p.tagger.expect("aac uses a tagger");
        assert_eq!(tagger.program, "neroAacTag");
        let args = args_of(&tagger);
        assert_eq!(args[0], "/out/a.aac");
        assert!(args.contains(&"-meta:track=03".to_string()));
    }

    #[test]
    fn test_alac_has_no_option_args() {
        let p = build(
            Path::new("/in/a.flac"),
            Path::new("/out/a.m4a"),
            Codec::Alac,
            &TagSet::new(),
            false,
        );
        assert_eq!(
            args_of(&p.stages[1]),
            vec!["-y", "-i", "-", "-acodec", "alac", "/out/a.m4a"]
        );
    }

    #[test]
    fn test_escape_quote() {
        assert_eq!(escape_quote("it's"), r#"it'"'"'s"#);
        assert_eq!(shell_quote("100%"), "'100%'");
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build(Path::new("/in/a.flac"), Path::new("/out/a.flac"), Codec::Flac, &sample_tags(), true);
        let b = build(Path::new("/in/a.flac"), Path::new("/out/a.flac"), Codec::Flac, &sample_tags(), true);
        assert_eq!(a, b);
        assert!(a.display().contains(" | "));
    }
}

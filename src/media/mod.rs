//! Media classification shared by the CLI and the player.
//!
//! A picked file is classified from its embedded track metadata: a video track
//! makes it video, otherwise an audio track makes it audio, otherwise it is
//! rejected. The chooser filters candidates by MIME category before that.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod probe;

pub use probe::{FfprobeProbe, MediaProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Top-level MIME type used to restrict the file chooser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    Audio,
    Video,
}

impl MimeCategory {
    /// The MIME filter pattern, e.g. `audio/*`.
    pub fn pattern(&self) -> &'static str {
        match self {
            MimeCategory::Audio => "audio/*",
            MimeCategory::Video => "video/*",
        }
    }

    fn top_level(&self) -> mime_guess::mime::Name<'static> {
        match self {
            MimeCategory::Audio => mime_guess::mime::AUDIO,
            MimeCategory::Video => mime_guess::mime::VIDEO,
        }
    }

    /// Whether any MIME type guessed from the file name falls in this category.
    pub fn matches(&self, path: &Path) -> bool {
        let top = self.top_level();
        mime_guess::from_path(path)
            .iter()
            .any(|mime| mime.type_() == top)
    }
}

impl fmt::Display for MimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackFlags {
    pub has_video: bool,
    pub has_audio: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub tracks: TrackFlags,
    pub duration: Option<Duration>,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("{} has neither a video nor an audio track", .0.display())]
    NoPlayableTrack(PathBuf),
    #[error("media inspector '{0}' not found. Install ffmpeg or set ffprobe_path")]
    ProbeUnavailable(String),
    #[error("could not inspect {}: {reason}", path.display())]
    ProbeFailed { path: PathBuf, reason: String },
    #[error("unreadable inspection output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Classify track flags, video first.
pub fn classify(tracks: TrackFlags) -> Option<MediaKind> {
    if tracks.has_video {
        Some(MediaKind::Video)
    } else if tracks.has_audio {
        Some(MediaKind::Audio)
    } else {
        None
    }
}

/// Inspect a file and classify it, failing when no playable track exists.
pub fn classify_file(
    probe: &dyn MediaProbe,
    path: &Path,
) -> Result<(MediaKind, MediaInfo), MediaError> {
    let info = probe.inspect(path)?;
    log::debug!("Inspected {path:?}: {info:?}");
    match classify(info.tracks) {
        Some(kind) => Ok((kind, info)),
        None => Err(MediaError::NoPlayableTrack(path.to_path_buf())),
    }
}

/// Format milliseconds as `MM:SS`; minutes keep counting past 59.
pub fn format_time(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;
    format!("{minutes:02}:{remaining_seconds:02}")
}

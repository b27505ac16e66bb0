//! Track inspection backed by ffprobe.
//!
//! ffprobe reports every stream in the container together with its codec type.
//! Cover art embedded in audio files shows up as a video stream flagged as an
//! attached picture, so those streams are not counted as video.

use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use super::{MediaError, MediaInfo, TrackFlags};

pub trait MediaProbe {
    fn inspect(&self, path: &Path) -> Result<MediaInfo, MediaError>;
}

pub struct FfprobeProbe {
    program: String,
}

impl FfprobeProbe {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MediaProbe for FfprobeProbe {
    fn inspect(&self, path: &Path) -> Result<MediaInfo, MediaError> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::ProbeUnavailable(self.program.clone())
                } else {
                    MediaError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(MediaError::ProbeFailed {
                path: path.to_path_buf(),
                reason: format!("{} exited with {}", self.program, output.status),
            });
        }

        parse_ffprobe_json(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    disposition: Option<ProbeDisposition>,
}

#[derive(Deserialize)]
struct ProbeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

pub(crate) fn parse_ffprobe_json(json: &str) -> Result<MediaInfo, MediaError> {
    let report: ProbeReport = serde_json::from_str(json)?;

    let mut tracks = TrackFlags::default();
    for stream in &report.streams {
        let attached_pic = stream
            .disposition
            .as_ref()
            .map(|d| d.attached_pic != 0)
            .unwrap_or(false);

        match stream.codec_type.as_deref() {
            Some("video") if !attached_pic => tracks.has_video = true,
            Some("audio") => tracks.has_audio = true,
            _ => {}
        }
    }

    // ffprobe prints "N/A" when the container carries no duration
    let duration = report
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64);

    Ok(MediaInfo { tracks, duration })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_audio_only() {
        let json = r#"{
            "streams": [
                { "index": 0, "codec_name": "flac", "codec_type": "audio",
                  "disposition": { "default": 1, "attached_pic": 0 } }
            ],
            "format": { "filename": "song.flac", "duration": "65.250000" }
        }"#;

        let info = parse_ffprobe_json(json).unwrap();
        assert!(info.tracks.has_audio);
        assert!(!info.tracks.has_video);
        assert_eq!(info.duration, Some(Duration::from_millis(65_250)));
    }

    #[test]
    fn test_parse_video_with_audio() {
        let json = r#"{
            "streams": [
                { "codec_type": "video", "disposition": { "attached_pic": 0 } },
                { "codec_type": "audio", "disposition": { "attached_pic": 0 } }
            ],
            "format": { "duration": "12.0" }
        }"#;

        let info = parse_ffprobe_json(json).unwrap();
        assert!(info.tracks.has_video);
        assert!(info.tracks.has_audio);
    }

    #[test]
    fn test_parse_cover_art_is_not_video() {
        let json = r#"{
            "streams": [
                { "codec_type": "audio" },
                { "codec_name": "mjpeg", "codec_type": "video",
                  "disposition": { "attached_pic": 1 } }
            ]
        }"#;

        let info = parse_ffprobe_json(json).unwrap();
        assert!(info.tracks.has_audio);
        assert!(!info.tracks.has_video);
        assert!(info.duration.is_none());
    }

    #[test]
    fn test_parse_no_streams() {
        let info = parse_ffprobe_json(r#"{ "format": { "duration": "N/A" } }"#).unwrap();
        assert_eq!(info.tracks, TrackFlags::default());
        assert!(info.duration.is_none());

        let info = parse_ffprobe_json("{}").unwrap();
        assert_eq!(info.tracks, TrackFlags::default());
    }

    #[test]
    fn test_parse_subtitles_and_data_ignored() {
        let json = r#"{
            "streams": [
                { "codec_type": "subtitle" },
                { "codec_type": "data" }
            ]
        }"#;

        let info = parse_ffprobe_json(json).unwrap();
        assert_eq!(info.tracks, TrackFlags::default());
    }

    #[test]
    fn test_parse_garbage() {
        let result = parse_ffprobe_json("not json at all");
        assert!(matches!(result, Err(MediaError::Parse(_))));
    }

    #[test]
    fn test_missing_program() {
        let probe = FfprobeProbe::new("deck-definitely-not-installed-ffprobe");
        let result = probe.inspect(Path::new("song.flac"));

        assert!(matches!(result, Err(MediaError::ProbeUnavailable(_))));
    }
}

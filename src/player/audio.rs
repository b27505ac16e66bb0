//! Audio playback on the default output device.
//!
//! The output stream is opened once, on the first audio file, and shared by
//! every session after it. Each session is a rodio sink fed by a decoder for
//! one file; dropping the session drops the sink, which silences it.

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::controller::AudioSession;

#[derive(Default)]
pub struct AudioOutput {
    stream: Option<OutputStream>,
}

impl AudioOutput {
    pub fn new() -> Self {
        Self { stream: None }
    }

    fn stream(&mut self) -> Result<&OutputStream, Box<dyn Error>> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                let mut stream = OutputStreamBuilder::open_default_stream()?;
                stream.log_on_drop(false);
                log::info!("Opened default audio output");
                stream
            }
        };
        Ok(self.stream.insert(stream))
    }

    pub fn open(
        &mut self,
        path: &Path,
        fallback_duration: Option<Duration>,
    ) -> Result<RodioSession, Box<dyn Error>> {
        let decoder = decode(path)?;

        let duration = decoder
            .total_duration()
            .or(fallback_duration)
            .unwrap_or_default();

        log::info!(
            "Decoded {:?}: {} Hz, {} channels, duration {:?}",
            path,
            decoder.sample_rate(),
            decoder.channels(),
            duration
        );

        let sink = Sink::connect_new(self.stream()?.mixer());
        sink.pause();
        sink.append(decoder);

        Ok(RodioSession::new(sink, path, duration))
    }
}

fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, Box<dyn Error>> {
    let file = BufReader::new(File::open(path)?);
    Ok(Decoder::new(file)?)
}

/// One file on a sink.
///
/// When the decoder runs out the sink is empty but the session is not idle:
/// it reports the full duration as its position, and the next start or seek
/// decodes the file again from the beginning.
pub struct RodioSession {
    sink: Sink,
    path: PathBuf,
    duration: Duration,
    idle: bool,
}

impl RodioSession {
    fn new(sink: Sink, path: &Path, duration: Duration) -> Self {
        Self {
            sink,
            path: path.to_path_buf(),
            duration,
            idle: false,
        }
    }

    fn finished(&self) -> bool {
        !self.idle && self.sink.empty()
    }

    fn reload(&mut self) -> Result<(), Box<dyn Error>> {
        let decoder = decode(&self.path)?;
        self.sink.append(decoder);
        log::debug!("Reloaded {:?} after playback finished", self.path);
        Ok(())
    }
}

impl AudioSession for RodioSession {
    fn start(&mut self) {
        if self.idle {
            log::warn!("Ignoring start on an idle audio session");
            return;
        }
        if self.finished()
            && let Err(e) = self.reload()
        {
            log::warn!("Could not restart {:?}: {e}", self.path);
            return;
        }
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn is_playing(&self) -> bool {
        !self.idle && !self.sink.is_paused() && !self.sink.empty()
    }

    fn reset(&mut self) {
        self.sink.clear();
        self.idle = true;
    }

    fn position(&self) -> Duration {
        if self.idle {
            Duration::ZERO
        } else if self.sink.empty() {
            self.duration
        } else {
            self.sink.get_pos()
        }
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), Box<dyn Error>> {
        if self.idle {
            return Err("audio session is idle".into());
        }
        if self.finished() {
            // Seeking a finished track leaves it paused, like a seek after a pause
            self.sink.pause();
            self.reload()?;
        }
        self.sink
            .try_seek(position)
            .map_err(|e| format!("seek failed: {e}"))?;
        log::debug!("Seek to {position:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn is_ci_environment() -> bool {
        // Check common CI environment variables
        std::env::var("CI").is_ok()
            || std::env::var("GITHUB_ACTIONS").is_ok()
            || std::env::var("TRAVIS").is_ok()
            || std::env::var("CIRCLECI").is_ok()
    }

    fn open_output() -> Option<AudioOutput> {
        if is_ci_environment() {
            eprintln!("Skipping audio test in CI environment");
            return None;
        }
        let mut output = AudioOutput::new();
        if let Err(e) = output.stream() {
            eprintln!("Skipping audio test, no output device: {e}");
            return None;
        }
        Some(output)
    }

    fn write_tone(path: &Path, samples: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..samples {
            let sample = ((i as f32 * 0.05).sin() * 4000.0) as i16;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_open_nonexistent_file() {
        let mut output = AudioOutput::new();
        let result = output.open(Path::new("/nonexistent/file.wav"), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_open_undecodable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let mut output = AudioOutput::new();
        assert!(output.open(&path, None).is_err());
    }

    #[test]
    fn test_session_lifecycle() {
        let Some(mut output) = open_output() else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tone.wav");
        write_tone(&path, 16_000);

        let mut session = output.open(&path, None).unwrap();
        let duration = session.duration();
        assert!(duration > Duration::from_millis(1900) && duration < Duration::from_millis(2100));
        assert!(!session.is_playing());

        session.start();
        assert!(session.is_playing());

        session.pause();
        assert!(!session.is_playing());

        session.seek_to(Duration::from_secs(1)).unwrap();

        session.reset();
        assert!(!session.is_playing());
        assert_eq!(session.position(), Duration::ZERO);
        assert!(session.seek_to(Duration::from_millis(500)).is_err());

        session.start();
        assert!(!session.is_playing());
    }

    #[test]
    fn test_finished_session_reports_end_and_restarts() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tone.wav");
        write_tone(&path, 8_018);

        // A sink with no device attached; its queue is empty like a drained track
        let (sink, _queue) = Sink::new();
        let mut session = RodioSession::new(sink, &path, Duration::from_micros(1_002_250));

        assert_eq!(session.position(), session.duration());
        assert_eq!(session.position().as_millis(), 1002);
        assert!(!session.is_playing());

        session.start();
        assert!(session.is_playing());
        assert!(session.position() < session.duration());
    }

    #[test]
    fn test_finished_session_with_missing_file_stays_finished() {
        let (sink, _queue) = Sink::new();
        let mut session = RodioSession::new(
            sink,
            Path::new("/nonexistent/tone.wav"),
            Duration::from_secs(1),
        );

        session.start();
        assert!(!session.is_playing());
        assert_eq!(session.position(), Duration::from_secs(1));
        assert!(session.seek_to(Duration::ZERO).is_err());
    }

    #[test]
    fn test_natural_end_then_scrub_back() {
        let Some(mut output) = open_output() else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short.wav");
        write_tone(&path, 2_400);

        let mut session = output.open(&path, None).unwrap();
        let duration = session.duration();
        session.start();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while session.position() != duration && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(session.position(), duration);
        assert!(!session.is_playing());

        session.seek_to(Duration::from_millis(100)).unwrap();
        assert!(!session.is_playing());
        assert!(session.position() < duration);

        session.start();
        assert!(session.is_playing());
    }
}

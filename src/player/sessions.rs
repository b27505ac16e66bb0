use std::error::Error;
use std::path::Path;
use std::time::Duration;

use super::audio::AudioOutput;
use super::controller::{AudioSession, SessionFactory, VideoSession};
use super::video::ExternalVideo;

/// Sessions backed by the real output device and video player.
pub struct DeviceSessions {
    audio: AudioOutput,
    video_player: String,
    video_player_args: Vec<String>,
}

impl DeviceSessions {
    pub fn new(video_player: &str, video_player_args: &[String]) -> Self {
        Self {
            audio: AudioOutput::new(),
            video_player: video_player.to_string(),
            video_player_args: video_player_args.to_vec(),
        }
    }
}

impl SessionFactory for DeviceSessions {
    fn open_audio(
        &mut self,
        path: &Path,
        fallback_duration: Option<Duration>,
    ) -> Result<Box<dyn AudioSession>, Box<dyn Error>> {
        let session = self.audio.open(path, fallback_duration)?;
        Ok(Box::new(session))
    }

    fn open_video(&mut self, path: &Path) -> Result<Box<dyn VideoSession>, Box<dyn Error>> {
        Ok(Box::new(ExternalVideo::new(
            &self.video_player,
            &self.video_player_args,
            path,
        )))
    }
}

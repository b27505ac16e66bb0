//! Video playback through an external player process.
//!
//! The terminal cannot draw video, so the file is handed to a desktop player
//! (mpv by default) whose own window and on-screen controller provide pause,
//! seek and stop. The session only owns the process.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use super::controller::VideoSession;

pub struct ExternalVideo {
    program: String,
    args: Vec<String>,
    path: PathBuf,
    child: Option<Child>,
}

impl ExternalVideo {
    pub fn new(program: &str, args: &[String], path: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            path: path.to_path_buf(),
            child: None,
        }
    }
}

impl VideoSession for ExternalVideo {
    fn start(&mut self) -> Result<(), Box<dyn Error>> {
        self.reset();

        // Detach stdio so the player cannot draw over the terminal UI
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    format!(
                        "Video player '{}' not found. Set video_player in the config.",
                        self.program
                    )
                } else {
                    format!("Failed to launch video player '{}': {e}", self.program)
                }
            })?;

        log::info!(
            "Launched {} (pid {}) for {:?}",
            self.program,
            child.id(),
            self.path
        );
        self.child = Some(child);
        Ok(())
    }

    fn reset(&mut self) {
        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    if let Err(e) = child.kill() {
                        log::warn!("Could not stop video player: {e}");
                    }
                    let _ = child.wait();
                }
            }
        }
    }

    fn is_running(&mut self) -> bool {
        match &mut self.child {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl Drop for ExternalVideo {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_missing_player() {
        let mut video = ExternalVideo::new(
            "deck-no-such-video-player",
            &[],
            Path::new("clip.mp4"),
        );

        let err = video.start().unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(!video.is_running());
    }

    #[test]
    fn test_reset_before_start() {
        let mut video = ExternalVideo::new("mpv", &[], Path::new("clip.mp4"));
        video.reset();
        assert!(!video.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_kills_player() {
        // `sleep 30` stands in for a player that keeps running
        let mut video = ExternalVideo::new("sleep", &[], Path::new("30"));
        video.start().unwrap();
        assert!(video.is_running());

        video.reset();
        assert!(!video.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn test_player_exit_is_noticed() {
        let mut video = ExternalVideo::new("true", &[], Path::new("clip.mp4"));
        video.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while video.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!video.is_running());
    }
}

//! Screen controller routing user intents to the playback sessions.
//!
//! The controller owns at most one audio session and one video session and
//! keeps the visible state (which controls are shown, the transport icon, the
//! seek bar and its time labels) consistent with them. Rendering reads
//! `ViewState` only; nothing here touches the terminal.

use log::{info, warn};
use media_deck::media::{self, MediaInfo, MediaKind, MediaProbe, MimeCategory, format_time};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::ticker::ProgressTicker;

/// A loaded audio file bound to an output device.
///
/// Dropping the session releases the underlying player.
pub trait AudioSession {
    fn start(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    /// Return to an idle state; the session stays allocated.
    fn reset(&mut self);
    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
    fn seek_to(&mut self, position: Duration) -> Result<(), Box<dyn Error>>;
}

/// A video file handed to a player that brings its own transport controls.
pub trait VideoSession {
    fn start(&mut self) -> Result<(), Box<dyn Error>>;
    fn reset(&mut self);
    fn is_running(&mut self) -> bool;
}

pub trait SessionFactory {
    fn open_audio(
        &mut self,
        path: &Path,
        fallback_duration: Option<Duration>,
    ) -> Result<Box<dyn AudioSession>, Box<dyn Error>>;

    fn open_video(&mut self, path: &Path) -> Result<Box<dyn VideoSession>, Box<dyn Error>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportIcon {
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlVisibility {
    pub pause_resume: bool,
    pub seek_bar: bool,
    pub elapsed_time: bool,
    pub total_time: bool,
    pub stop: bool,
    pub video_surface: bool,
}

impl ControlVisibility {
    pub fn neutral() -> Self {
        Self {
            pause_resume: false,
            seek_bar: false,
            elapsed_time: false,
            total_time: false,
            stop: false,
            video_surface: false,
        }
    }

    pub fn audio() -> Self {
        Self {
            pause_resume: true,
            seek_bar: true,
            elapsed_time: true,
            total_time: true,
            stop: true,
            video_surface: false,
        }
    }

    pub fn video() -> Self {
        Self {
            video_surface: true,
            ..Self::neutral()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeekBar {
    pub position_ms: u64,
    pub max_ms: u64,
    pub dragging: bool,
}

impl SeekBar {
    pub fn ratio(&self) -> f64 {
        if self.max_ms == 0 {
            0.0
        } else {
            (self.position_ms as f64 / self.max_ms as f64).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub visibility: ControlVisibility,
    pub icon: TransportIcon,
    pub seek: SeekBar,
    pub elapsed_label: String,
    pub total_label: String,
    pub current_file: Option<PathBuf>,
    pub current_kind: Option<MediaKind>,
    pub video_running: bool,
    pub status: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            visibility: ControlVisibility::neutral(),
            icon: TransportIcon::Pause,
            seek: SeekBar::default(),
            elapsed_label: format_time(0),
            total_label: format_time(0),
            current_file: None,
            current_kind: None,
            video_running: false,
            status: None,
        }
    }
}

pub struct Controller {
    factory: Box<dyn SessionFactory>,
    probe: Box<dyn MediaProbe>,
    audio: Option<Box<dyn AudioSession>>,
    video: Option<Box<dyn VideoSession>>,
    ticker: ProgressTicker,
    pub view: ViewState,
}

impl Controller {
    pub fn new(
        factory: Box<dyn SessionFactory>,
        probe: Box<dyn MediaProbe>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            factory,
            probe,
            audio: None,
            video: None,
            ticker: ProgressTicker::new(refresh_interval),
            view: ViewState::default(),
        }
    }

    #[cfg(test)]
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    #[cfg(test)]
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    #[cfg(test)]
    pub fn is_audio_playing(&self) -> bool {
        self.audio.as_ref().map(|a| a.is_playing()).unwrap_or(false)
    }

    pub fn next_refresh_in(&self, now: Instant) -> Option<Duration> {
        self.ticker.time_until_due(now)
    }

    /// Classify a picked file and start it on the matching session.
    pub fn open_selection(
        &mut self,
        path: &Path,
        requested: MimeCategory,
    ) -> Result<MediaKind, Box<dyn Error>> {
        let (kind, info) = match media::classify_file(self.probe.as_ref(), path) {
            Ok(classified) => classified,
            Err(e) => {
                log::error!("Could not classify {path:?}: {e}");
                self.view.status = Some(e.to_string());
                return Err(e.into());
            }
        };

        let matches_request = matches!(
            (kind, requested),
            (MediaKind::Audio, MimeCategory::Audio) | (MediaKind::Video, MimeCategory::Video)
        );
        if !matches_request {
            warn!("{path:?} picked as {requested} but classified as {kind}");
        }

        let result = match kind {
            MediaKind::Audio => self.play_audio(path, &info),
            MediaKind::Video => self.play_video(path),
        };

        match result {
            Ok(()) => {
                self.view.status = None;
                Ok(kind)
            }
            Err(e) => {
                log::error!("Could not play {path:?}: {e}");
                self.view.status = Some(format!("Could not play {}: {e}", path.display()));
                Err(e)
            }
        }
    }

    pub fn play_audio(&mut self, path: &Path, info: &MediaInfo) -> Result<(), Box<dyn Error>> {
        self.view.visibility = ControlVisibility::audio();
        self.view.icon = TransportIcon::Pause;

        // Replacing a session releases the previous player
        self.audio = None;
        self.video = None;
        self.view.video_running = false;

        let mut session = match self.factory.open_audio(path, info.duration) {
            Ok(session) => session,
            Err(e) => {
                self.clear_selection();
                return Err(e);
            }
        };
        session.start();

        let duration_ms = session.duration().as_millis() as u64;
        self.view.seek = SeekBar {
            position_ms: 0,
            max_ms: duration_ms,
            dragging: false,
        };
        self.view.elapsed_label = format_time(0);
        self.view.total_label = format_time(duration_ms);
        self.view.current_file = Some(path.to_path_buf());
        self.view.current_kind = Some(MediaKind::Audio);
        self.audio = Some(session);

        self.ticker.start(Instant::now());
        info!("Playing audio {path:?} ({})", self.view.total_label);
        Ok(())
    }

    pub fn play_video(&mut self, path: &Path) -> Result<(), Box<dyn Error>> {
        self.view.visibility = ControlVisibility::video();

        self.video = None;
        if let Some(audio) = &mut self.audio {
            audio.reset();
        }

        let mut session = match self.factory.open_video(path) {
            Ok(session) => session,
            Err(e) => {
                self.clear_selection();
                return Err(e);
            }
        };
        if let Err(e) = session.start() {
            self.clear_selection();
            return Err(e);
        }

        self.view.current_file = Some(path.to_path_buf());
        self.view.current_kind = Some(MediaKind::Video);
        self.video = Some(session);
        self.view.video_running = true;
        info!("Playing video {path:?}");
        Ok(())
    }

    fn clear_selection(&mut self) {
        self.view.visibility = ControlVisibility::neutral();
        self.view.current_file = None;
        self.view.current_kind = None;
    }

    pub fn toggle_pause_resume(&mut self) {
        if let Some(audio) = &mut self.audio {
            if audio.is_playing() {
                audio.pause();
                self.view.icon = TransportIcon::Play;
            } else {
                audio.start();
                self.view.icon = TransportIcon::Pause;
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(audio) = &mut self.audio {
            self.view.visibility = ControlVisibility::neutral();
            audio.reset();
            self.view.seek.position_ms = 0;
            self.view.seek.dragging = false;
            self.view.elapsed_label = format_time(0);
            info!("Audio stopped");
        }
    }

    /// Seek bar moved, either by the user or by the progress refresh.
    ///
    /// Reaching the end of the bar only flips the icon; the player keeps its
    /// own state.
    pub fn seek(&mut self, position_ms: u64, from_user: bool) {
        let progress = position_ms.min(self.view.seek.max_ms);
        self.view.seek.position_ms = progress;

        if from_user
            && let Some(audio) = &mut self.audio
            && let Err(e) = audio.seek_to(Duration::from_millis(progress))
        {
            warn!("Seek to {progress}ms failed: {e}");
        }

        if progress == self.view.seek.max_ms {
            self.view.icon = TransportIcon::Play;
        }
    }

    pub fn begin_seek_drag(&mut self) {
        self.view.seek.dragging = true;
    }

    pub fn end_seek_drag(&mut self) {
        self.view.seek.dragging = false;
    }

    /// Seek relative to the current bar position as one short drag.
    pub fn nudge(&mut self, offset_ms: i64) {
        if self.audio.is_none() {
            return;
        }
        let target = (self.view.seek.position_ms as i64 + offset_ms).max(0) as u64;
        self.begin_seek_drag();
        self.seek(target, true);
        self.view.elapsed_label = format_time(self.view.seek.position_ms);
        self.end_seek_drag();
    }

    pub fn refresh_progress(&mut self) {
        if !self.view.seek.dragging {
            let position_ms = self
                .audio
                .as_ref()
                .map(|a| a.position().as_millis() as u64)
                .unwrap_or(0);
            self.seek(position_ms, false);
            self.view.elapsed_label = format_time(position_ms);
        }
    }

    /// Run the scheduled refresh if it is due. Returns whether it ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.view.video_running
            && let Some(video) = &mut self.video
            && !video.is_running()
        {
            info!("External video player exited");
            self.view.video_running = false;
        }

        if self.ticker.poll(now) {
            self.refresh_progress();
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.ticker.cancel();
        self.audio = None;
        self.video = None;
        self.view.video_running = false;
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.close();
    }
}

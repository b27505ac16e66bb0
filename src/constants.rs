//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency across the codebase.

/// Name of the directory holding the configuration file
pub const CONFIG_DIR_NAME: &str = "deck";

/// How often the progress display is refreshed while audio is loaded
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;

/// Upper bound on how long the event loop blocks waiting for input
pub const EVENT_POLL_MS: u64 = 50;

/// Distance covered by a single keyboard seek step
pub const SEEK_STEP_MS: u64 = 5000;

/// Default external player used for video files
pub const DEFAULT_VIDEO_PLAYER: &str = "mpv";

/// Default ffprobe executable used for media inspection
pub const DEFAULT_FFPROBE: &str = "ffprobe";

/// Default log file name, placed in the system temp directory
pub const DEFAULT_LOG_FILE_NAME: &str = "deck-player.log";

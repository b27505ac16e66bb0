//! Application configuration management.
//!
//! This module handles the persistent configuration for the player: which
//! external program plays video, where ffprobe lives, how often the progress
//! display refreshes, where the file chooser starts and where logs go.
//! Configuration is stored in the user's config directory (typically
//! ~/.config/deck/config.toml); every field has a default so a partial or
//! missing file still loads.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_FFPROBE, DEFAULT_LOG_FILE_NAME, DEFAULT_REFRESH_INTERVAL_MS,
    DEFAULT_VIDEO_PLAYER,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_video_player")]
    pub video_player: String,
    #[serde(default = "default_video_player_args")]
    pub video_player_args: Vec<String>,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_dir: Option<String>,
    #[serde(default)]
    pub show_hidden: bool,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_video_player() -> String {
    DEFAULT_VIDEO_PLAYER.to_string()
}

fn default_video_player_args() -> Vec<String> {
    // mpv only opens a window with its on-screen controller when forced to
    vec!["--force-window=yes".to_string()]
}

fn default_ffprobe_path() -> String {
    DEFAULT_FFPROBE.to_string()
}

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

fn default_log_file() -> String {
    std::env::temp_dir()
        .join(DEFAULT_LOG_FILE_NAME)
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            video_player: default_video_player(),
            video_player_args: default_video_player_args(),
            ffprobe_path: default_ffprobe_path(),
            refresh_interval_ms: default_refresh_interval_ms(),
            start_dir: None,
            show_hidden: false,
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join(CONFIG_DIR_NAME)
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join(CONFIG_DIR_NAME)
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.refresh_interval_ms == 0 {
            return Err("refresh_interval_ms must be greater than zero".into());
        }
        self.log_level_filter()?;
        Ok(())
    }

    /// Directory the file chooser opens in, with `~` expanded.
    pub fn start_dir_path(&self) -> PathBuf {
        match &self.start_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).as_ref()),
            None => PathBuf::from("."),
        }
    }

    pub fn log_file_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_file).as_ref())
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, Box<dyn Error>> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| format!("Unknown log level: {}", self.log_level).into())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "video_player" => self.video_player = value.to_string(),
            "video_player_args" => {
                self.video_player_args = value.split_whitespace().map(str::to_string).collect();
            }
            "ffprobe_path" => self.ffprobe_path = value.to_string(),
            "refresh_interval_ms" => {
                let interval = value
                    .parse::<u64>()
                    .map_err(|_| "Value must be a whole number of milliseconds")?;
                if interval == 0 {
                    return Err("refresh_interval_ms must be greater than zero".into());
                }
                self.refresh_interval_ms = interval;
            }
            "start_dir" => {
                self.start_dir = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "show_hidden" => {
                self.show_hidden = value
                    .parse::<bool>()
                    .map_err(|_| "Value must be 'true' or 'false'")?;
            }
            "log_file" => self.log_file = value.to_string(),
            "log_level" => {
                LevelFilter::from_str(value)
                    .map_err(|_| format!("Unknown log level: {value}"))?;
                self.log_level = value.to_lowercase();
            }
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Use a mutex to ensure tests that modify environment variables don't run concurrently
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.video_player, "mpv");
        assert_eq!(config.video_player_args, vec!["--force-window=yes"]);
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.refresh_interval_ms, 1000);
        assert!(config.start_dir.is_none());
        assert!(!config.show_hidden);
        assert!(config.log_file.ends_with("deck-player.log"));
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("video_player = \"vlc\"\n").unwrap();
        assert_eq!(config.video_player, "vlc");
        assert_eq!(config.refresh_interval_ms, 1000);
        assert_eq!(config.ffprobe_path, "ffprobe");
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::new();

        config.set_value("video_player", "vlc").unwrap();
        assert_eq!(config.video_player, "vlc");

        config
            .set_value("video_player_args", "--fullscreen --no-osd")
            .unwrap();
        assert_eq!(config.video_player_args, vec!["--fullscreen", "--no-osd"]);

        config.set_value("refresh_interval_ms", "500").unwrap();
        assert_eq!(config.refresh_interval_ms, 500);
        assert!(config.set_value("refresh_interval_ms", "0").is_err());
        assert!(config.set_value("refresh_interval_ms", "fast").is_err());

        config.set_value("show_hidden", "true").unwrap();
        assert!(config.show_hidden);
        assert!(config.set_value("show_hidden", "maybe").is_err());

        config.set_value("start_dir", "~/Music").unwrap();
        assert_eq!(config.start_dir.as_deref(), Some("~/Music"));
        config.set_value("start_dir", "").unwrap();
        assert!(config.start_dir.is_none());

        config.set_value("log_level", "DEBUG").unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.set_value("log_level", "loud").is_err());

        let result = config.set_value("unknown_key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn test_start_dir_path() {
        let mut config = Config::new();
        assert_eq!(config.start_dir_path(), PathBuf::from("."));

        config.start_dir = Some("/srv/media".to_string());
        assert_eq!(config.start_dir_path(), PathBuf::from("/srv/media"));
    }

    #[test]
    fn test_config_save_and_load() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let temp_dir = TempDir::new().unwrap();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let mut config = Config::new();
        config.video_player = "celluloid".to_string();
        config.refresh_interval_ms = 250;
        config.save().unwrap();

        let config_path = Config::config_path().unwrap();
        assert!(config_path.exists());
        assert!(config_path.starts_with(temp_dir.path().join("deck")));

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.video_player, "celluloid");
        assert_eq!(loaded.refresh_interval_ms, 250);

        unsafe {
            if let Some(original) = original_xdg {
                std::env::set_var("XDG_CONFIG_HOME", original);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }

    #[test]
    fn test_load_rejects_zero_interval() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let temp_dir = TempDir::new().unwrap();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let config_dir = temp_dir.path().join("deck");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), "refresh_interval_ms = 0\n").unwrap();

        assert!(Config::load().is_err());

        unsafe {
            if let Some(original) = original_xdg {
                std::env::set_var("XDG_CONFIG_HOME", original);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let temp_dir = TempDir::new().unwrap();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        assert!(!Config::exists().unwrap());
        let loaded = Config::load().unwrap();
        assert_eq!(loaded.video_player, "mpv");

        unsafe {
            if let Some(original) = original_xdg {
                std::env::set_var("XDG_CONFIG_HOME", original);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }
}

use tempfile::TempDir;

#[test]
fn test_config_lifecycle() {
    // Create a temporary directory for test config
    let temp_dir = TempDir::new().unwrap();

    // Override the config path for testing
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // Test that config doesn't exist initially
    assert!(!media_deck::config::Config::exists().unwrap());

    // Create and save a config
    let config = media_deck::config::Config::new();
    config.save().unwrap();

    // Verify it exists now
    assert!(media_deck::config::Config::exists().unwrap());

    // Load and verify values
    let loaded = media_deck::config::Config::load().unwrap();
    assert_eq!(loaded.video_player, "mpv");
    assert_eq!(loaded.refresh_interval_ms, 1000);

    // Test config mutation
    let mut config = media_deck::config::Config::load().unwrap();
    config.set_value("ffprobe_path", "/opt/ffmpeg/bin/ffprobe").unwrap();
    config.save().unwrap();

    // Verify mutations persisted
    let reloaded = media_deck::config::Config::load().unwrap();
    assert_eq!(reloaded.ffprobe_path, "/opt/ffmpeg/bin/ffprobe");

    // Test invalid key
    let mut config = media_deck::config::Config::load().unwrap();
    assert!(config.set_value("invalid_key", "value").is_err());
}

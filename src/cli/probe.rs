use media_deck::config::Config;
use media_deck::media::{self, FfprobeProbe, MediaKind, format_time};
use owo_colors::OwoColorize;
use std::error::Error;
use std::path::Path;

pub fn handle_probe(file: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(file);
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()).into());
    }

    let config = Config::load()?;
    let probe = FfprobeProbe::new(config.ffprobe_path.clone());
    let (kind, info) = media::classify_file(&probe, path)?;

    let kind_label = match kind {
        MediaKind::Audio => "audio".green().to_string(),
        MediaKind::Video => "video".magenta().to_string(),
    };

    println!("{}", path.display().bold());
    println!("  kind:        {kind_label}");
    println!("  video track: {}", yes_no(info.tracks.has_video));
    println!("  audio track: {}", yes_no(info.tracks.has_audio));
    match info.duration {
        Some(duration) => println!(
            "  duration:    {}",
            format_time(duration.as_millis() as u64)
        ),
        None => println!("  duration:    {}", "unknown".dimmed()),
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

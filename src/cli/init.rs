use dialoguer::{Confirm, theme::ColorfulTheme};
use media_deck::config::Config;
use std::error::Error;

pub fn handle_init(force: bool) -> Result<(), Box<dyn Error>> {
    if Config::exists()? && !force {
        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("A configuration already exists. Replace it with the defaults?")
            .default(false)
            .interact()?;

        if !overwrite {
            println!("Keeping existing configuration");
            return Ok(());
        }
    }

    let config = Config::new();
    config.save()?;

    println!("Media Deck initialized successfully!");
    println!("Video player: {}", config.video_player);
    println!(
        "Configuration saved to: {}",
        Config::config_path()?.display()
    );

    Ok(())
}

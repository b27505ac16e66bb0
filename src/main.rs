//! Media Deck - a terminal-based player for local audio and video files.
//!
//! The player is a single screen: pick an audio file or a video file from a
//! chooser filtered by MIME type and play it. Audio plays through the default
//! output device with play/pause, stop and a draggable seek bar that follows
//! playback. Video is handed to an external desktop player, whose own window
//! provides the transport controls.
//!
//! Alongside the player, the CLI can classify a file the same way the player
//! does and manage the configuration file.

use clap::{CommandFactory, Parser, Subcommand, builder::PossibleValuesParser};
use clap_complete::{Generator, Shell, generate};
use std::error::Error;
use std::io;

mod cli;

#[cfg(feature = "player")]
mod player;

#[derive(Parser)]
#[command(name = "deck")]
#[command(about = "Terminal-based audio and video file player")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Open the player, optionally starting with a file
    Play {
        /// Audio or video file to start with
        file: Option<String>,
    },
    /// Report whether a file plays as audio or video
    Probe {
        /// File to inspect
        file: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// View current configuration
    View,
    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_parser = PossibleValuesParser::new([
            "video_player",
            "video_player_args",
            "ffprobe_path",
            "refresh_interval_ms",
            "start_dir",
            "show_hidden",
            "log_file",
            "log_level",
        ]))]
        key: String,
        /// Configuration value
        value: String,
    },
    /// Edit configuration file in your editor
    Edit,
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cli::init::handle_init(force)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::View => {
                cli::config::handle_config_view()?;
            }
            ConfigAction::Set { key, value } => {
                cli::config::handle_config_set(&key, &value)?;
            }
            ConfigAction::Edit => {
                cli::config::handle_config_edit()?;
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
        Commands::Play { file } => {
            cli::play::handle_play(file.as_deref())?;
        }
        Commands::Probe { file } => {
            cli::probe::handle_probe(&file)?;
        }
    }

    Ok(())
}

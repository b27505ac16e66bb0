//! Main application state and control flow for the player screen.
//!
//! This module wires the terminal to the screen controller: it owns the
//! terminal lifecycle, runs the event loop, translates keys and mouse input
//! into controller operations, and opens the file chooser modal. The loop also
//! drives the controller's progress refresh, so the seek bar follows playback
//! without any background thread.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use media_deck::config::Config;
use media_deck::constants::{EVENT_POLL_MS, SEEK_STEP_MS};
use media_deck::media::{FfprobeProbe, MimeCategory};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::{
    error::Error,
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use super::chooser::{ChooserOutcome, FileChooser};
use super::controller::Controller;
use super::sessions::DeviceSessions;
use super::ui;

pub struct App {
    pub should_quit: bool,
    pub controller: Controller,
    pub chooser: Option<FileChooser>,
    pub video_player: String,
    pub screen_area: Rect,
    start_dir: PathBuf,
    show_hidden: bool,
}

impl App {
    pub fn new(controller: Controller, config: &Config) -> Self {
        Self {
            should_quit: false,
            controller,
            chooser: None,
            video_player: config.video_player.clone(),
            screen_area: Rect::default(),
            start_dir: config.start_dir_path(),
            show_hidden: config.show_hidden,
        }
    }

    /// Open the chooser for one MIME category, starting where the last pick was made.
    pub fn select_file(&mut self, category: MimeCategory) {
        let start_dir = self
            .controller
            .view
            .current_file
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.start_dir.clone());

        match FileChooser::new(category, &start_dir, self.show_hidden) {
            Ok(chooser) => {
                info!("Choosing {category} from {start_dir:?}");
                self.chooser = Some(chooser);
            }
            Err(e) => {
                log::error!("Could not open chooser in {start_dir:?}: {e}");
                self.controller.view.status =
                    Some(format!("Cannot browse {}: {e}", start_dir.display()));
            }
        }
    }

    /// Hand a picked file to the controller. Failures end up in the status line.
    pub fn open_picked(&mut self, path: &Path, category: MimeCategory) {
        if let Ok(kind) = self.controller.open_selection(path, category) {
            info!("Opened {path:?} as {kind}");
        }
    }
}

pub fn run_with_file(file_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    init_logging(&config)?;
    info!("Starting Media Deck");

    let sessions = DeviceSessions::new(&config.video_player, &config.video_player_args);
    let probe = FfprobeProbe::new(config.ffprobe_path.clone());
    let controller = Controller::new(
        Box::new(sessions),
        Box::new(probe),
        Duration::from_millis(config.refresh_interval_ms),
    );
    let mut app = App::new(controller, &config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if let Some(path) = file_path {
        let path = Path::new(path);
        let category = if MimeCategory::Video.matches(path) {
            MimeCategory::Video
        } else {
            MimeCategory::Audio
        };
        if let Err(e) = app.controller.open_selection(path, category) {
            // Clean up terminal before showing error
            restore_terminal(&mut terminal)?;
            return Err(e);
        }
    }

    let res = run_app(&mut terminal, &mut app);
    app.controller.close();

    // Restore terminal
    restore_terminal(&mut terminal)?;

    if let Err(e) = res {
        eprintln!("Error: {e}");
        return Err(e);
    }

    info!("Media Deck closed");
    Ok(())
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let poll_limit = Duration::from_millis(EVENT_POLL_MS);

    loop {
        app.controller.tick(Instant::now());

        terminal.draw(|f| {
            app.screen_area = f.area();
            ui::draw(f, app);
        })?;

        // Wake up in time for the next scheduled refresh
        let timeout = app
            .controller
            .next_refresh_in(Instant::now())
            .map(|due| due.min(poll_limit))
            .unwrap_or(poll_limit);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key_event(app, key)?;
                }
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<(), Box<dyn Error>> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    if app.chooser.is_some() {
        handle_chooser_keys(app, key);
        Ok(())
    } else {
        handle_player_keys(app, key)
    }
}

fn handle_chooser_keys(app: &mut App, key: event::KeyEvent) {
    let Some(chooser) = app.chooser.as_mut() else {
        return;
    };
    let category = chooser.category;

    let result = match key.code {
        KeyCode::Esc => {
            app.chooser = None;
            Ok(())
        }
        KeyCode::Up => {
            chooser.select_previous();
            Ok(())
        }
        KeyCode::Down => {
            chooser.select_next();
            Ok(())
        }
        KeyCode::Left => chooser.go_to_parent(),
        KeyCode::Backspace => chooser.backspace(),
        KeyCode::Enter => match chooser.activate() {
            Ok(ChooserOutcome::Picked(path)) => {
                app.chooser = None;
                app.open_picked(&path, category);
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        },
        KeyCode::Char(c) => {
            chooser.push_char(c);
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        app.controller.view.status = Some(e.to_string());
    }
}

fn handle_player_keys(app: &mut App, key: event::KeyEvent) -> Result<(), Box<dyn Error>> {
    // Hidden controls do not react to their keys
    let visibility = app.controller.view.visibility;

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('a') => app.select_file(MimeCategory::Audio),
        KeyCode::Char('v') => app.select_file(MimeCategory::Video),
        KeyCode::Char(' ') if visibility.pause_resume => app.controller.toggle_pause_resume(),
        KeyCode::Char('s') if visibility.stop => app.controller.stop(),
        KeyCode::Left if visibility.seek_bar => app.controller.nudge(-(SEEK_STEP_MS as i64)),
        KeyCode::Right if visibility.seek_bar => app.controller.nudge(SEEK_STEP_MS as i64),
        KeyCode::Esc => app.controller.view.status = None,
        _ => {}
    }
    Ok(())
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.chooser.is_some() || !app.controller.view.visibility.seek_bar {
        return;
    }

    let track = ui::screen_layout(app.screen_area).seek_track();
    let max_ms = app.controller.view.seek.max_ms;
    let on_track = mouse.row == track.y
        && mouse.column >= track.x
        && mouse.column < track.x + track.width;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if on_track => {
            app.controller.begin_seek_drag();
            let position = ui::seek_position_at(track, mouse.column, max_ms);
            app.controller.seek(position, true);
        }
        MouseEventKind::Drag(MouseButton::Left) if app.controller.view.seek.dragging => {
            let position = ui::seek_position_at(track, mouse.column, max_ms);
            app.controller.seek(position, true);
        }
        MouseEventKind::Up(MouseButton::Left) if app.controller.view.seek.dragging => {
            app.controller.end_seek_drag();
        }
        _ => {}
    }
}

fn init_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    use std::fs::File;

    let log_file = config.log_file_path();
    simplelog::CombinedLogger::init(vec![simplelog::WriteLogger::new(
        config.log_level_filter()?,
        simplelog::Config::default(),
        File::create(&log_file)?,
    )])?;

    Ok(())
}

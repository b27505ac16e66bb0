use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph},
};

use super::app::App;
use super::chooser::FileChooser;
use super::controller::{TransportIcon, ViewState};

/// Screen regions, shared by drawing and mouse hit-testing.
pub struct ScreenLayout {
    pub title: Rect,
    pub file_info: Rect,
    pub transport: Rect,
    pub elapsed: Rect,
    pub seek_bar: Rect,
    pub total: Rect,
    pub video: Rect,
    pub status: Rect,
    pub controls: Rect,
}

impl ScreenLayout {
    /// The clickable part of the seek bar, inside its border.
    pub fn seek_track(&self) -> Rect {
        self.seek_bar.inner(Margin {
            horizontal: 1,
            vertical: 1,
        })
    }
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // File info
            Constraint::Length(1), // Transport buttons
            Constraint::Length(3), // Seek bar with time labels
            Constraint::Min(3),    // Video surface
            Constraint::Length(1), // Status line
            Constraint::Length(2), // Controls
        ])
        .split(area);

    let seek_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(9),
            Constraint::Min(10),
            Constraint::Length(9),
        ])
        .split(chunks[3]);

    ScreenLayout {
        title: chunks[0],
        file_info: chunks[1],
        transport: chunks[2],
        elapsed: seek_row[0],
        seek_bar: seek_row[1],
        total: seek_row[2],
        video: chunks[4],
        status: chunks[5],
        controls: chunks[6],
    }
}

/// Map a click column on the seek track to a position in milliseconds.
pub fn seek_position_at(track: Rect, column: u16, max_ms: u64) -> u64 {
    if track.width <= 1 {
        return 0;
    }
    let offset = column.clamp(track.x, track.x + track.width - 1) - track.x;
    let fraction = offset as f64 / (track.width - 1) as f64;
    (fraction * max_ms as f64).round() as u64
}

pub fn draw(f: &mut Frame, app: &App) {
    let layout = screen_layout(f.area());
    let view = &app.controller.view;

    let title = Paragraph::new("🎬 Media Deck")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, layout.title);

    draw_file_info(f, layout.file_info, view);
    draw_transport(f, layout.transport, view);
    draw_seek_bar(f, &layout, view);

    if view.visibility.video_surface {
        draw_video_surface(f, layout.video, app);
    }

    if let Some(status) = &view.status {
        let status_widget = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Red));
        f.render_widget(status_widget, layout.status);
    }

    draw_controls(f, layout.controls, view);

    if let Some(chooser) = &app.chooser {
        draw_chooser(f, f.area(), chooser);
    }
}

fn draw_file_info(f: &mut Frame, area: Rect, view: &ViewState) {
    let file_info = if let Some(file) = &view.current_file {
        let filename = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        match view.current_kind {
            Some(kind) => format!("Loaded ({kind}): {filename}"),
            None => format!("Loaded: {filename}"),
        }
    } else {
        "No file selected - press [a] for audio or [v] for video".to_string()
    };

    let file_widget = Paragraph::new(file_info)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(file_widget, area);
}

fn draw_transport(f: &mut Frame, area: Rect, view: &ViewState) {
    let mut spans = Vec::new();

    if view.visibility.pause_resume {
        let (icon, color) = match view.icon {
            TransportIcon::Play => ("▶ play", Color::Green),
            TransportIcon::Pause => ("⏸ pause", Color::Yellow),
        };
        spans.push(Span::styled(icon, Style::default().fg(color)));
        spans.push(Span::raw("    "));
    }
    if view.visibility.stop {
        spans.push(Span::styled("■ stop", Style::default().fg(Color::Red)));
    }

    let transport = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(transport, area);
}

fn draw_seek_bar(f: &mut Frame, layout: &ScreenLayout, view: &ViewState) {
    if view.visibility.elapsed_time {
        let elapsed = Paragraph::new(view.elapsed_label.as_str())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(elapsed, layout.elapsed);
    }

    if view.visibility.seek_bar {
        let gauge_color = if view.seek.dragging {
            Color::Magenta
        } else {
            Color::Cyan
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(gauge_color))
            .ratio(view.seek.ratio())
            .label("");
        f.render_widget(gauge, layout.seek_bar);
    }

    if view.visibility.total_time {
        let total = Paragraph::new(view.total_label.as_str())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(total, layout.total);
    }
}

fn draw_video_surface(f: &mut Frame, area: Rect, app: &App) {
    let view = &app.controller.view;
    let state = if view.video_running {
        Span::styled("playing", Style::default().fg(Color::Green))
    } else {
        Span::styled("player closed", Style::default().fg(Color::DarkGray))
    };

    let lines = vec![
        Line::from(vec![
            Span::raw(format!("Video in {}: ", app.video_player)),
            state,
        ]),
        Line::from(Span::styled(
            "Use the player window's controls to pause, seek or stop",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let surface = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Video "),
    );
    f.render_widget(surface, area);
}

fn draw_controls(f: &mut Frame, area: Rect, view: &ViewState) {
    let mut controls = vec![
        Span::styled("[a]", Style::default().fg(Color::Green)),
        Span::raw(" audio  "),
        Span::styled("[v]", Style::default().fg(Color::Green)),
        Span::raw(" video  "),
    ];

    if view.visibility.pause_resume {
        controls.push(Span::styled("[space]", Style::default().fg(Color::Yellow)));
        controls.push(Span::raw(match view.icon {
            TransportIcon::Play => " play  ",
            TransportIcon::Pause => " pause  ",
        }));
    }
    if view.visibility.stop {
        controls.push(Span::styled("[s]", Style::default().fg(Color::Red)));
        controls.push(Span::raw(" stop  "));
    }
    if view.visibility.seek_bar {
        controls.push(Span::styled("[←→]", Style::default().fg(Color::Magenta)));
        controls.push(Span::raw(" seek  "));
    }
    controls.push(Span::styled("[q]", Style::default().fg(Color::Red)));
    controls.push(Span::raw(" quit"));

    let border_widget = Block::default().borders(Borders::TOP);
    f.render_widget(border_widget, area);

    let row = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1),
        ..area
    };
    let controls_widget = Paragraph::new(Line::from(controls)).alignment(Alignment::Center);
    f.render_widget(controls_widget, row);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_chooser(f: &mut Frame, area: Rect, chooser: &FileChooser) {
    let popup = centered_rect(80, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(
            " Select {} - {} ",
            chooser.category,
            chooser.current_dir.display()
        ));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filter
            Constraint::Min(1),    // Entries
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let filter = Paragraph::new(Line::from(vec![
        Span::styled("Filter: ", Style::default().fg(Color::DarkGray)),
        Span::raw(chooser.query.as_str()),
    ]));
    f.render_widget(filter, chunks[0]);

    let items: Vec<ListItem> = chooser
        .visible_entries()
        .into_iter()
        .map(|entry| {
            if entry.is_dir {
                ListItem::new(format!("{}/", entry.name))
                    .style(Style::default().fg(Color::Blue))
            } else {
                ListItem::new(entry.name.clone())
            }
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !empty {
        state.select(Some(chooser.selected));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);

    let keys = "[↑↓] move  [enter] open  [backspace] up  [esc] cancel  type to filter";
    let help = Paragraph::new(keys)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_layout_stacks_regions() {
        let layout = screen_layout(Rect::new(0, 0, 80, 24));

        assert!(layout.title.y < layout.file_info.y);
        assert!(layout.file_info.y < layout.transport.y);
        assert!(layout.transport.y < layout.seek_bar.y);
        assert!(layout.seek_bar.y < layout.video.y);
        assert!(layout.video.y < layout.status.y);
        assert!(layout.status.y < layout.controls.y);
        assert_eq!(layout.elapsed.y, layout.seek_bar.y);
        assert_eq!(layout.total.y, layout.seek_bar.y);
        assert!(layout.elapsed.x < layout.seek_bar.x);
        assert!(layout.seek_bar.x < layout.total.x);
    }

    #[test]
    fn test_seek_track_is_inside_border() {
        let layout = screen_layout(Rect::new(0, 0, 80, 24));
        let track = layout.seek_track();

        assert_eq!(track.x, layout.seek_bar.x + 1);
        assert_eq!(track.y, layout.seek_bar.y + 1);
        assert_eq!(track.height, 1);
    }

    #[test]
    fn test_seek_position_at() {
        let track = Rect::new(10, 5, 101, 1);

        assert_eq!(seek_position_at(track, 10, 60_000), 0);
        assert_eq!(seek_position_at(track, 60, 60_000), 30_000);
        assert_eq!(seek_position_at(track, 110, 60_000), 60_000);
        // Clicks past either end clamp
        assert_eq!(seek_position_at(track, 2, 60_000), 0);
        assert_eq!(seek_position_at(track, 200, 60_000), 60_000);
    }

    #[test]
    fn test_seek_position_degenerate_track() {
        assert_eq!(seek_position_at(Rect::new(0, 0, 1, 1), 0, 60_000), 0);
    }
}

//! Terminal user interface components.
//!
//! This module draws the game: a header with score and sound state, the
//! four-pad board, a footer with status messages, and the help and
//! game-over overlays.

mod board;
mod dialogs;
mod help;

use crate::app::App;
use crate::prefs::Theme;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub use board::{render_board, BOARD_LAYOUT};
pub use dialogs::render_game_over_dialog;
pub use help::render_help;

/// Colors that change with the theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub dim_text: Color,
    pub border: Color,
    pub pad_text: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::Rgb(235, 235, 235),
                text: Color::Black,
                dim_text: Color::DarkGray,
                border: Color::Gray,
                pad_text: Color::White,
            },
            Theme::Dark => Self {
                background: Color::Rgb(20, 20, 24),
                text: Color::White,
                dim_text: Color::Gray,
                border: Color::DarkGray,
                pad_text: Color::Gray,
            },
        }
    }
}

/// Renders the complete UI and updates layout regions.
///
/// The layout is divided into:
/// - Top: title, score, high score and sound state
/// - Center: the board
/// - Bottom: status message or key hints
pub fn render(frame: &mut Frame, app: &mut App) {
    let palette = Palette::for_theme(app.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(6),    // Board
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app, &palette);
    let pads = render_board(frame, chunks[1], app, &palette);
    render_footer(frame, chunks[2], app, &palette);

    app.layout.pads = pads;
    app.layout.dialog = render_game_over_dialog(frame, app);

    if app.show_help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let label = Style::default().fg(palette.dim_text).bg(palette.background);
    let value = Style::default()
        .fg(palette.text)
        .bg(palette.background)
        .add_modifier(Modifier::BOLD);

    let sound = if !app.audio.has_output() {
        "no device".to_string()
    } else if app.audio.is_muted() {
        "off".to_string()
    } else {
        format!("{}%", (app.audio.volume() * 100.0).round() as u32)
    };

    let line = Line::from(vec![
        Span::styled(
            " SIMON ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Score: ", label),
        Span::styled(app.score.to_string(), value),
        Span::styled("  High: ", label),
        Span::styled(app.high_score().to_string(), value),
        Span::styled("  Sound: ", label),
        Span::styled(sound, value),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(palette.background)),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let line = match &app.status_message {
        Some((message, _)) => Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            " [g r y b / 1-4] pads  [Ctrl+R] restart  [m] sound  [t] theme  [?] help  [q] quit",
            Style::default().fg(palette.dim_text),
        )),
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(palette.background)),
        area,
    );
}

/// Helper function to center a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}

//! The four-pad game board.

use super::Palette;
use crate::app::App;
use crate::game::Signal;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

/// Pad placement: top row then bottom row.
pub const BOARD_LAYOUT: [[Signal; 2]; 2] = [
    [Signal::Green, Signal::Red],
    [Signal::Yellow, Signal::Blue],
];

/// Lit and unlit colors for a pad.
fn pad_colors(signal: Signal) -> (Color, Color) {
    match signal {
        Signal::Green => (Color::LightGreen, Color::Rgb(0, 90, 0)),
        Signal::Red => (Color::LightRed, Color::Rgb(110, 0, 0)),
        Signal::Yellow => (Color::LightYellow, Color::Rgb(110, 100, 0)),
        Signal::Blue => (Color::LightBlue, Color::Rgb(0, 0, 110)),
    }
}

/// Key hint printed on each pad.
fn pad_key(signal: Signal) -> &'static str {
    match signal {
        Signal::Green => "g / 1",
        Signal::Red => "r / 2",
        Signal::Yellow => "y / 3",
        Signal::Blue => "b / 4",
    }
}

/// Renders the board and returns the screen area of each pad.
///
/// The board border flashes red for a moment after a game over.
pub fn render_board(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    palette: &Palette,
) -> Vec<(Signal, Rect)> {
    let border_color = if app.is_flashing_game_over() {
        Color::Red
    } else {
        palette.border
    };

    let block = Block::default()
        .title(format!(" {} ", app.level_title()))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(palette.background));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(inner);

    let mut pads = Vec::with_capacity(4);
    for (row_area, row) in rows.iter().zip(BOARD_LAYOUT.iter()) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(*row_area);

        for (pad_area, signal) in cols.iter().zip(row.iter()) {
            render_pad(frame, *pad_area, *signal, app.is_lit(*signal), palette);
            pads.push((*signal, *pad_area));
        }
    }
    pads
}

fn render_pad(frame: &mut Frame, area: Rect, signal: Signal, lit: bool, palette: &Palette) {
    let (lit_color, dim_color) = pad_colors(signal);
    let fill = if lit { lit_color } else { dim_color };

    let mut label_style = Style::default().fg(palette.pad_text).bg(fill);
    if lit {
        label_style = label_style.fg(Color::Black).add_modifier(Modifier::BOLD);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if lit {
            BorderType::Thick
        } else {
            BorderType::Plain
        })
        .border_style(Style::default().fg(palette.background).bg(fill))
        .style(Style::default().bg(fill));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Vertically center the label.
    let top_padding = inner.height.saturating_sub(2) / 2;
    let mut lines: Vec<Line> = (0..top_padding).map(|_| Line::from("")).collect();
    lines.push(Line::from(signal.name().to_uppercase()));
    lines.push(Line::from(pad_key(signal)));

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(label_style),
        inner,
    );
}

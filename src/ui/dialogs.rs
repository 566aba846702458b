//! Game-over dialog overlay.

use crate::app::App;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

/// Renders the game-over dialog if it is open.
///
/// # Returns
///
/// The dialog's area, for mouse hit testing, or None when closed.
pub fn render_game_over_dialog(frame: &mut Frame, app: &App) -> Option<Rect> {
    let dialog = &app.game_over_dialog;
    if !dialog.open {
        return None;
    }

    let area = centered_rect(40, 40, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Game Over ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Final score: ", Style::default().fg(Color::White)),
            Span::styled(
                dialog.final_score.to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("High score: {}", dialog.high_score),
            Style::default().fg(Color::Gray),
        )),
    ];
    if dialog.new_high_score {
        lines.push(Line::from(Span::styled(
            "New high score!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Space]", Style::default().fg(Color::Yellow)),
        Span::styled(" Play again  ", Style::default().fg(Color::DarkGray)),
        Span::styled("[Esc]", Style::default().fg(Color::Yellow)),
        Span::styled(" Close", Style::default().fg(Color::DarkGray)),
    ]));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
    Some(area)
}

//! Help overlay rendering.
//!
//! Displays keyboard shortcuts in a modal overlay.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

/// Key binding entry for the help display.
struct KeyBinding {
    key: &'static str,
    description: &'static str,
}

const GAME_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "Any key",
        description: "Start a game",
    },
    KeyBinding {
        key: "g / 1",
        description: "Green pad (top left)",
    },
    KeyBinding {
        key: "r / 2",
        description: "Red pad (top right)",
    },
    KeyBinding {
        key: "y / 3",
        description: "Yellow pad (bottom left)",
    },
    KeyBinding {
        key: "b / 4",
        description: "Blue pad (bottom right)",
    },
    KeyBinding {
        key: "Click",
        description: "Press a pad",
    },
    KeyBinding {
        key: "Ctrl+R",
        description: "Restart the game",
    },
];

const GAME_OVER_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "Space",
        description: "Play again",
    },
    KeyBinding {
        key: "Esc",
        description: "Close the dialog",
    },
];

const GENERAL_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "m",
        description: "Toggle sound",
    },
    KeyBinding {
        key: "+ / -",
        description: "Volume up / down",
    },
    KeyBinding {
        key: "t",
        description: "Toggle light / dark theme",
    },
    KeyBinding {
        key: "?",
        description: "Toggle this help",
    },
    KeyBinding {
        key: "q / Ctrl+C",
        description: "Quit",
    },
];

/// Renders the help overlay.
pub fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help - Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(inner);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(Color::White);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (title, bindings) in [
        ("Game", GAME_BINDINGS),
        ("Game Over", GAME_OVER_BINDINGS),
        ("General", GENERAL_BINDINGS),
    ] {
        lines.push(Line::from(Span::styled(title, section_style)));
        for binding in bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("{:12}", binding.key), key_style),
                Span::styled(binding.description, desc_style),
            ]));
        }
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), chunks[0]);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("[?/Esc]", Style::default().fg(Color::Yellow)),
            Span::styled(" Close", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[1],
    );
}

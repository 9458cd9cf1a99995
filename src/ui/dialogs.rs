use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::centered_rect;

pub fn render_help(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(area, 56, 24);

    // Clear the area behind the dialog
    frame.render_widget(Clear, dialog_area);

    let heading = Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan);
    let help_text = vec![
        Line::from(Span::styled("Navigation", heading)),
        Line::from(""),
        Line::from("  → / l / n   Next photo (saves first)"),
        Line::from("  ← / h / p   Previous photo (saves first)"),
        Line::from(""),
        Line::from(Span::styled("Annotating", heading)),
        Line::from(""),
        Line::from("  a           Add or update an annotation"),
        Line::from("  x / d       Remove an annotation"),
        Line::from("  c           Edit the comment"),
        Line::from(""),
        Line::from(Span::styled("Session", heading)),
        Line::from(""),
        Line::from("  Ctrl+s      Save"),
        Line::from("  ?           Show this help"),
        Line::from("  q           Save and quit"),
        Line::from("  Q           Quit without saving"),
        Line::from(""),
        Line::from("  Confidence is a number in [0, 1]; 1.0 means certain."),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, dialog_area);
}

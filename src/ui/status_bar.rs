use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    // If there's a status message, show it prominently
    if let Some(ref message) = app.status_message {
        let line = Line::from(vec![Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        )]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut spans = Vec::new();

    // Left: save file
    spans.push(Span::styled(
        format!(" {} ", app.controller.save_path().display()),
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    let content_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let help_text = " →:next ←:prev a:annotate x:remove c:comment ^S:save ?:help q:quit ";
    let help_len = help_text.chars().count();

    let available = area.width as usize;
    if available > content_len + help_len {
        spans.push(Span::raw(" ".repeat(available - content_len - help_len)));
    }

    // Right: help hints
    spans.push(Span::styled(
        help_text,
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

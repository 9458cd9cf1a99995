//! Dialog for editing the comment on the active photo.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::centered_rect;

/// Single-line text editor. `cursor` counts characters, not bytes.
pub struct CommentDialog {
    pub original: String,
    pub text: String,
    pub cursor: usize,
}

impl CommentDialog {
    pub fn new(comment: String) -> Self {
        let cursor = comment.chars().count();
        Self {
            original: comment.clone(),
            text: comment,
            cursor,
        }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.text
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn revert(&mut self) {
        self.text = self.original.clone();
        self.cursor = self.len();
    }

    pub fn is_modified(&self) -> bool {
        self.text != self.original
    }
}

pub fn render(frame: &mut Frame, dialog: &CommentDialog, area: Rect) {
    let dialog_area = centered_rect(area, 70, 9);
    frame.render_widget(Clear, dialog_area);

    let title = if dialog.is_modified() {
        " Comment [modified] "
    } else {
        " Comment "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    let at = dialog.byte_index(dialog.cursor);
    let (before, after) = dialog.text.split_at(at);
    let mut rest = after.chars();
    let cursor_char = rest.next().unwrap_or(' ');
    let line = Line::from(vec![
        Span::raw(before),
        Span::styled(
            cursor_char.to_string(),
            Style::default().bg(Color::White).fg(Color::Black),
        ),
        Span::raw(rest.as_str()),
    ]);

    let text = Paragraph::new(line).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(text, chunks[0]);

    let help = Paragraph::new(vec![
        Line::from("Enter=save | Esc=cancel"),
        Line::from("Ctrl+U=clear | Ctrl+R=revert | Arrows=move cursor"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_multibyte_text() {
        let mut dialog = CommentDialog::new("café".to_string());
        assert_eq!(dialog.cursor, 4);

        dialog.backspace();
        assert_eq!(dialog.text, "caf");
        dialog.handle_char('é');
        dialog.move_cursor_home();
        dialog.handle_char('¡');
        assert_eq!(dialog.text, "¡café");

        dialog.move_cursor_right();
        dialog.delete();
        assert_eq!(dialog.text, "¡cfé");
        assert!(dialog.is_modified());

        dialog.revert();
        assert_eq!(dialog.text, "café");
        assert!(!dialog.is_modified());
        dialog.clear();
        assert_eq!(dialog.text, "");
        dialog.move_cursor_left();
        assert_eq!(dialog.cursor, 0);
    }
}

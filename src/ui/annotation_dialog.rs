//! Dialogs for adding and removing annotations on the active photo.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use super::centered_rect;

const DEFAULT_CONFIDENCE: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationStep {
    /// Typing filters the schema labels
    ChooseLabel,
    /// Typing edits the confidence
    EnterConfidence,
}

/// Label picker followed by a confidence prompt
pub struct AnnotationDialog {
    labels: Vec<String>,
    pub filter: String,
    pub matches: Vec<usize>,
    pub selected_index: usize,
    pub confidence: String,
    pub step: AnnotationStep,
}

impl AnnotationDialog {
    pub fn new(labels: Vec<String>) -> Self {
        let matches = (0..labels.len()).collect();
        Self {
            labels,
            filter: String::new(),
            matches,
            selected_index: 0,
            confidence: DEFAULT_CONFIDENCE.to_string(),
            step: AnnotationStep::ChooseLabel,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        match self.step {
            AnnotationStep::ChooseLabel => {
                self.filter.push(c);
                self.update_matches();
            }
            AnnotationStep::EnterConfidence => self.confidence.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.step {
            AnnotationStep::ChooseLabel => {
                self.filter.pop();
                self.update_matches();
            }
            AnnotationStep::EnterConfidence => {
                self.confidence.pop();
            }
        }
    }

    fn update_matches(&mut self) {
        let lower = self.filter.to_lowercase();
        self.matches = self
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.to_lowercase().contains(&lower))
            .map(|(i, _)| i)
            .collect();
        self.selected_index = 0;
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.matches.len() {
            self.selected_index += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn selected_label(&self) -> Option<&str> {
        let index = *self.matches.get(self.selected_index)?;
        self.labels.get(index).map(String::as_str)
    }

    /// Move from the label list to the confidence prompt. Returns false
    /// when no label matches the filter.
    pub fn confirm_label(&mut self) -> bool {
        if self.selected_label().is_none() {
            return false;
        }
        self.step = AnnotationStep::EnterConfidence;
        true
    }

    pub fn back_to_labels(&mut self) {
        self.step = AnnotationStep::ChooseLabel;
    }
}

pub fn render(frame: &mut Frame, dialog: &AnnotationDialog, area: Rect) {
    let dialog_area = centered_rect(area, 50, 20);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Add Annotation ");
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter
            Constraint::Min(5),    // Labels
            Constraint::Length(3), // Confidence
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let choosing = dialog.step == AnnotationStep::ChooseLabel;
    let active_border = Style::default().fg(Color::Green);
    let idle_border = Style::default().fg(Color::DarkGray);

    let filter = Paragraph::new(format!("> {}{}", dialog.filter, if choosing { "_" } else { "" }))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if choosing { active_border } else { idle_border })
                .title(" Label "),
        );
    frame.render_widget(filter, chunks[0]);

    if dialog.matches.is_empty() {
        let empty = Paragraph::new(format!("No label matches \"{}\"", dialog.filter))
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, chunks[1]);
    } else {
        let items: Vec<ListItem> = dialog
            .matches
            .iter()
            .filter_map(|&i| dialog.labels.get(i))
            .map(|label| ListItem::new(format!("  {label} ")))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        state.select(Some(dialog.selected_index));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    let confidence = Paragraph::new(format!(
        "{}{}",
        dialog.confidence,
        if choosing { "" } else { "_" }
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if choosing { idle_border } else { active_border })
            .title(" Confidence [0, 1] "),
    );
    frame.render_widget(confidence, chunks[2]);

    let help = if choosing {
        "type:filter | ↑/↓:select | Enter:next | Esc:cancel"
    } else {
        "Enter:save | Tab:back to labels | Esc:cancel"
    };
    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[3],
    );
}

/// Picker over the annotations already on the active photo
pub struct RemoveDialog {
    pub annotations: Vec<(String, f64)>,
    pub selected_index: usize,
}

impl RemoveDialog {
    pub fn new(annotations: Vec<(String, f64)>) -> Self {
        Self {
            annotations,
            selected_index: 0,
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.annotations.len() {
            self.selected_index += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.annotations
            .get(self.selected_index)
            .map(|(label, _)| label.as_str())
    }
}

pub fn render_remove(frame: &mut Frame, dialog: &RemoveDialog, area: Rect) {
    let height = (dialog.annotations.len() as u16).saturating_add(4).min(20);
    let dialog_area = centered_rect(area, 50, height);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Remove Annotation ");
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = dialog
        .annotations
        .iter()
        .map(|(label, confidence)| ListItem::new(format!("  {label}  {confidence:.2} ")))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().fg(Color::Red).add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    state.select(Some(dialog.selected_index));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    frame.render_widget(
        Paragraph::new("j/k:select | Enter:remove | Esc:cancel")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog() -> AnnotationDialog {
        AnnotationDialog::new(vec![
            "walking".to_string(),
            "sitting;TV".to_string(),
            "sitting;reading".to_string(),
        ])
    }

    #[test]
    fn test_filter_narrows_labels() {
        let mut dialog = dialog();
        for c in "SIT".chars() {
            dialog.handle_char(c);
        }
        assert_eq!(dialog.matches, vec![1, 2]);
        dialog.move_down();
        dialog.move_down();
        assert_eq!(dialog.selected_label(), Some("sitting;reading"));

        dialog.backspace();
        dialog.backspace();
        dialog.backspace();
        assert_eq!(dialog.matches.len(), 3);
        assert_eq!(dialog.selected_label(), Some("walking"));
    }

    #[test]
    fn test_confidence_step() {
        let mut dialog = dialog();
        dialog.handle_char('z');
        assert!(!dialog.confirm_label());
        assert_eq!(dialog.step, AnnotationStep::ChooseLabel);

        dialog.backspace();
        assert!(dialog.confirm_label());
        assert_eq!(dialog.confidence, "1.0");
        dialog.backspace();
        dialog.backspace();
        dialog.handle_char('5');
        assert_eq!(dialog.confidence, "1.5");
        assert_eq!(dialog.filter, "");
    }
}

mod annotation_dialog;
mod comment_dialog;
mod dialogs;
mod photo_strip;
mod status_bar;

pub use annotation_dialog::{AnnotationDialog, AnnotationStep, RemoveDialog};
pub use comment_dialog::CommentDialog;
pub use photo_strip::ImageCache;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, AppMode};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Header
            Constraint::Min(8),     // Photos
            Constraint::Length(10), // Annotations + labels
            Constraint::Length(3),  // Comment
            Constraint::Length(1),  // Status bar
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    photo_strip::render(frame, app, chunks[1]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_annotations(frame, app, panels[0]);
    render_labels(frame, app, panels[1]);
    render_comment(frame, app, chunks[3]);

    status_bar::render(frame, app, chunks[4]);

    match app.mode {
        AppMode::Help => dialogs::render_help(frame, area),
        AppMode::Annotating => {
            if let Some(ref dialog) = app.annotation_dialog {
                annotation_dialog::render(frame, dialog, area);
            }
        }
        AppMode::Removing => {
            if let Some(ref dialog) = app.remove_dialog {
                annotation_dialog::render_remove(frame, dialog, area);
            }
        }
        AppMode::Commenting => {
            if let Some(ref dialog) = app.comment_dialog {
                comment_dialog::render(frame, dialog, area);
            }
        }
        AppMode::Normal => {}
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.state;
    let line = Line::from(vec![
        Span::styled(
            format!(" Participant {} ", state.participant_id),
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  Image {} of {}",
            state.position.row + 1,
            state.position.total
        )),
        Span::styled(
            format!("  {} annotated", state.position.annotated),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("  [{}]", state.policy.name()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_annotations(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Annotations (a:add x:remove) ");

    if app.state.annotations.is_empty() {
        let empty = Paragraph::new("Not annotated")
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .state
        .annotations
        .iter()
        .map(|(label, confidence)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {label} "), Style::default().fg(Color::Cyan)),
                Span::raw(format!("{confidence:.2}")),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn render_labels(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .controller
        .labels()
        .iter()
        .map(|label| {
            let annotated = app.state.annotations.iter().any(|(l, _)| l == label);
            let style = if annotated {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(format!(" {label}")).style(style)
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Labels "));
    frame.render_widget(list, area);
}

fn render_comment(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.state.comment.is_empty() {
        Span::styled("No comment", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
    } else {
        Span::raw(app.state.comment.as_str())
    };
    let comment = Paragraph::new(Line::from(text))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Comment (c:edit) "));
    frame.render_widget(comment, area);
}

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

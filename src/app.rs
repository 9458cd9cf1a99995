use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::time::Duration;

use camlabel::config::DisplayConfig;
use camlabel::controller::{AnnotationController, NavOutcome, RenderState};
use camlabel::error::CursorError;

use crate::ui::{self, AnnotationDialog, AnnotationStep, CommentDialog, ImageCache, RemoveDialog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
    Annotating,
    Removing,
    Commenting,
}

pub struct App {
    pub controller: AnnotationController,
    pub display: DisplayConfig,
    pub state: RenderState,
    pub mode: AppMode,
    pub status_message: Option<String>,
    pub annotation_dialog: Option<AnnotationDialog>,
    pub remove_dialog: Option<RemoveDialog>,
    pub comment_dialog: Option<CommentDialog>,
    pub images: Option<ImageCache>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        controller: AnnotationController,
        display: DisplayConfig,
        images: Option<ImageCache>,
    ) -> Result<Self, CursorError> {
        let state = controller.render_state()?;
        Ok(Self {
            controller,
            display,
            state,
            mode: AppMode::Normal,
            status_message: None,
            annotation_dialog: None,
            remove_dialog: None,
            comment_dialog: None,
            images,
            should_quit: false,
        })
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            // Short poll so decoded photos show up without a key press
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn refresh(&mut self) {
        match self.controller.render_state() {
            Ok(state) => self.state = state,
            Err(e) => {
                tracing::error!(error = %e, "Failed to rebuild the view");
                self.status_message = Some(e.to_string());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            AppMode::Help => self.mode = AppMode::Normal,
            AppMode::Annotating => self.handle_annotation_key(key),
            AppMode::Removing => self.handle_remove_key(key),
            AppMode::Commenting => self.handle_comment_key(key),
            AppMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        // Clear status message on any key press
        self.status_message = None;

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('s') = key.code {
                self.save();
            }
            return;
        }

        match key.code {
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => self.navigate(true),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => self.navigate(false),
            KeyCode::Char('a') => {
                self.annotation_dialog = Some(AnnotationDialog::new(self.controller.labels().to_vec()));
                self.mode = AppMode::Annotating;
            }
            KeyCode::Char('x') | KeyCode::Char('d') => {
                if self.state.annotations.is_empty() {
                    self.status_message = Some("No annotations to remove".to_string());
                } else {
                    self.remove_dialog = Some(RemoveDialog::new(self.state.annotations.clone()));
                    self.mode = AppMode::Removing;
                }
            }
            KeyCode::Char('c') => {
                self.comment_dialog = Some(CommentDialog::new(self.state.comment.clone()));
                self.mode = AppMode::Commenting;
            }
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Char('q') => {
                if self.save() {
                    self.should_quit = true;
                } else {
                    self.status_message = Some(format!(
                        "{} (Q quits without saving)",
                        self.status_message.take().unwrap_or_default()
                    ));
                }
            }
            KeyCode::Char('Q') => {
                tracing::warn!("Quitting without saving");
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn navigate(&mut self, forward: bool) {
        let result = if forward {
            self.controller.advance()
        } else {
            self.controller.retreat()
        };
        match result {
            Ok(NavOutcome::Moved) => self.refresh(),
            Ok(NavOutcome::AtBoundary) => {
                self.status_message = Some(if forward {
                    "Already at the last photo".to_string()
                } else {
                    "Already at the first photo".to_string()
                });
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn save(&mut self) -> bool {
        match self.controller.save() {
            Ok(()) => {
                self.status_message = Some(format!("Saved {}", self.controller.save_path().display()));
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Save failed");
                self.status_message = Some(format!("Save failed: {e}"));
                false
            }
        }
    }

    fn close_dialogs(&mut self) {
        self.annotation_dialog = None;
        self.remove_dialog = None;
        self.comment_dialog = None;
        self.mode = AppMode::Normal;
    }

    fn handle_annotation_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.annotation_dialog.as_mut() else {
            self.mode = AppMode::Normal;
            return;
        };

        match (dialog.step, key.code) {
            (_, KeyCode::Esc) => self.close_dialogs(),
            (_, KeyCode::Backspace) => dialog.backspace(),
            (AnnotationStep::ChooseLabel, KeyCode::Down) => dialog.move_down(),
            (AnnotationStep::ChooseLabel, KeyCode::Up) => dialog.move_up(),
            (AnnotationStep::ChooseLabel, KeyCode::Enter | KeyCode::Tab) => {
                if !dialog.confirm_label() {
                    self.status_message = Some(format!("No label matches \"{}\"", dialog.filter));
                }
            }
            (AnnotationStep::EnterConfidence, KeyCode::Tab) => dialog.back_to_labels(),
            (AnnotationStep::EnterConfidence, KeyCode::Enter) => {
                let Some(label) = dialog.selected_label().map(str::to_string) else {
                    return;
                };
                let raw = dialog.confidence.clone();
                match self.controller.set_annotation(&label, &raw) {
                    Ok(confidence) => {
                        self.status_message = Some(format!("{label} = {confidence}"));
                        self.close_dialogs();
                        self.refresh();
                    }
                    // Keep the dialog open so the value can be corrected
                    Err(e) => self.status_message = Some(e.to_string()),
                }
            }
            (_, KeyCode::Char(c)) => dialog.handle_char(c),
            _ => {}
        }
    }

    fn handle_remove_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.remove_dialog.as_mut() else {
            self.mode = AppMode::Normal;
            return;
        };

        match key.code {
            KeyCode::Esc => self.close_dialogs(),
            KeyCode::Down | KeyCode::Char('j') => dialog.move_down(),
            KeyCode::Up | KeyCode::Char('k') => dialog.move_up(),
            KeyCode::Enter | KeyCode::Char('x') | KeyCode::Char('d') => {
                let Some(label) = dialog.selected_label().map(str::to_string) else {
                    return;
                };
                self.status_message = Some(match self.controller.remove_annotation(&label) {
                    Ok(()) => format!("Removed {label}"),
                    Err(e) => e.to_string(),
                });
                self.close_dialogs();
                self.refresh();
            }
            _ => {}
        }
    }

    fn handle_comment_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.comment_dialog.as_mut() else {
            self.mode = AppMode::Normal;
            return;
        };

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => dialog.clear(),
                KeyCode::Char('r') => dialog.revert(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.close_dialogs(),
            KeyCode::Enter => {
                let text = dialog.text.clone();
                self.status_message = Some(match self.controller.update_comment(text) {
                    Ok(()) => "Comment updated".to_string(),
                    Err(e) => e.to_string(),
                });
                self.close_dialogs();
                self.refresh();
            }
            KeyCode::Backspace => dialog.backspace(),
            KeyCode::Delete => dialog.delete(),
            KeyCode::Left => dialog.move_cursor_left(),
            KeyCode::Right => dialog.move_cursor_right(),
            KeyCode::Home => dialog.move_cursor_home(),
            KeyCode::End => dialog.move_cursor_end(),
            KeyCode::Char(c) => dialog.handle_char(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camlabel::annotations::AnnotationStore;
    use camlabel::catalog::{PhotoRecord, PhotoTable};
    use camlabel::cursor::{WindowPolicy, WindowShape};
    use camlabel::schema::LabelSchema;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    fn app() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let start = Utc.with_ymd_and_hms(2014, 10, 3, 11, 0, 0).single().unwrap();
        let records = (0..4)
            .map(|n| {
                PhotoRecord::new(
                    1,
                    start + chrono::TimeDelta::minutes(n),
                    format!("/photos/P1/B0_{n}.JPG"),
                )
            })
            .collect();
        let table = Arc::new(PhotoTable::from_scan(records));
        let schema = Arc::new(LabelSchema::from_labels(["walking", "sleep"]).unwrap());
        let controller = AnnotationController::new(
            AnnotationStore::new(table, schema),
            WindowShape::new(3, 1).unwrap(),
            WindowPolicy::Clamped,
            dir.path().join("out.csv"),
        )
        .unwrap();
        (App::new(controller, DisplayConfig::default(), None).unwrap(), dir)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_navigation_keys() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.state.position.row, 2);

        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.state.position.row, 1);

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.state.position.row, 0);
        assert_eq!(app.status_message.as_deref(), Some("Already at the first photo"));
    }

    #[test]
    fn test_annotation_dialog_flow() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.mode, AppMode::Annotating);

        type_text(&mut app, "sl");
        press(&mut app, KeyCode::Enter);
        // Replace the default 1.0 with an invalid value, then fix it.
        for _ in 0..3 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Annotating);
        assert!(app.state.annotations.is_empty());

        for _ in 0..3 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "0.7");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.state.annotations, vec![("sleep".to_string(), 0.7)]);

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.mode, AppMode::Removing);
        press(&mut app, KeyCode::Enter);
        assert!(app.state.annotations.is_empty());
    }

    #[test]
    fn test_comment_dialog_flow() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('c'));
        type_text(&mut app, "dark");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.comment, "dark");

        press(&mut app, KeyCode::Char('c'));
        type_text(&mut app, "er");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.comment, "dark");
    }

    #[test]
    fn test_quit_saves() {
        let (mut app, dir) = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
        assert!(dir.path().join("out.csv").exists());
    }

    #[test]
    fn test_remove_without_annotations() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.status_message.as_deref(), Some("No annotations to remove"));
    }
}

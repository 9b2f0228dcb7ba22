//! Small stateful widgets: inline single-field forms and the card editor.

use client_core::{BoardCard, CardEdit};
use eframe::egui;

/// A collapsible one-line form ("+ Add a card", list rename).
#[derive(Debug, Clone, Default)]
pub struct InlineTextForm {
    open: bool,
    text: String,
    focus_pending: bool,
}

impl InlineTextForm {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn open(&mut self) {
        self.open_with(String::new());
    }

    /// Opens the form pre-filled, e.g. with the current list title.
    pub fn open_with(&mut self, text: impl Into<String>) {
        self.open = true;
        self.text = text.into();
        self.focus_pending = true;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Returns the trimmed text and closes the form. Blank input keeps the
    /// form open and returns `None`.
    pub fn submit(&mut self) -> Option<String> {
        let title = self.text.trim();
        if title.is_empty() {
            return None;
        }
        let title = title.to_string();
        self.cancel();
        Some(title)
    }

    pub fn cancel(&mut self) {
        self.open = false;
        self.text.clear();
        self.focus_pending = false;
    }

    fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_pending)
    }

    /// Renders the open form. Enter or the submit button submits, Escape or
    /// the cancel button closes.
    pub fn show(&mut self, ui: &mut egui::Ui, hint: &str, submit_label: &str) -> Option<String> {
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.text)
                .hint_text(hint)
                .desired_width(f32::INFINITY),
        );
        if self.take_focus_request() {
            response.request_focus();
        }

        let mut submitted = None;
        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
        if enter {
            submitted = self.submit();
            if submitted.is_none() {
                response.request_focus();
            }
        } else if escape && (response.has_focus() || response.lost_focus()) {
            self.cancel();
            return None;
        }

        ui.horizontal(|ui| {
            if ui.button(submit_label).clicked() {
                submitted = self.submit();
            }
            if ui.button("Cancel").clicked() {
                self.cancel();
            }
        });
        submitted
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    None,
    Save(CardEdit),
    Cancel,
}

/// Draft fields of a card being edited. The card itself is only touched
/// when the draft is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEditor {
    pub title: String,
    pub description: String,
    original_title: String,
    original_description: String,
    focus_pending: bool,
}

impl CardEditor {
    pub fn begin(card: &BoardCard) -> Self {
        let description = card.description.clone().unwrap_or_default();
        Self {
            title: card.title.clone(),
            description: description.clone(),
            original_title: card.title.clone(),
            original_description: description,
            focus_pending: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.title != self.original_title || self.description != self.original_description
    }

    /// The edit to send, or `None` while the title is blank.
    pub fn save(&self) -> Option<CardEdit> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(CardEdit {
            title: Some(title.to_string()),
            description: Some(self.description.trim().to_string()),
        })
    }

    pub fn revert(&mut self) {
        self.title = self.original_title.clone();
        self.description = self.original_description.clone();
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> EditorAction {
        let title = ui.add(
            egui::TextEdit::singleline(&mut self.title)
                .hint_text("Card title")
                .desired_width(f32::INFINITY),
        );
        if std::mem::take(&mut self.focus_pending) {
            title.request_focus();
        }
        ui.add(
            egui::TextEdit::multiline(&mut self.description)
                .hint_text("Description (optional)")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );

        let mut action = EditorAction::None;
        if title.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            if let Some(edit) = self.save() {
                action = EditorAction::Save(edit);
            }
        }
        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            action = EditorAction::Cancel;
        }

        ui.horizontal(|ui| {
            let save = ui.add_enabled(!self.title.trim().is_empty(), egui::Button::new("Save"));
            if save.clicked() {
                if let Some(edit) = self.save() {
                    action = EditorAction::Save(edit);
                }
            }
            if ui.button("Cancel").clicked() {
                action = EditorAction::Cancel;
            }
        });

        if action == EditorAction::Cancel {
            self.revert();
        }
        action
    }
}

#[cfg(test)]
#[path = "tests/widgets_tests.rs"]
mod tests;

use super::*;
use client_core::SyncStatus;
use shared::domain::{CardId, EntityKey};

fn card(description: Option<&str>) -> BoardCard {
    BoardCard {
        key: EntityKey::Remote(CardId(5)),
        title: "Write docs".to_string(),
        description: description.map(str::to_string),
        position: 0,
        sync: SyncStatus::Confirmed,
    }
}

#[test]
fn blank_submission_keeps_the_form_open() {
    let mut form = InlineTextForm::default();
    form.open();
    form.set_text("   ");
    assert_eq!(form.submit(), None);
    assert!(form.is_open());
    assert_eq!(form.text(), "   ");
}

#[test]
fn submission_trims_and_resets() {
    let mut form = InlineTextForm::default();
    form.open();
    form.set_text("  Backlog ");
    assert_eq!(form.submit().as_deref(), Some("Backlog"));
    assert!(!form.is_open());
    assert_eq!(form.text(), "");
}

#[test]
fn cancel_clears_the_draft() {
    let mut form = InlineTextForm::default();
    form.open_with("Doing");
    form.cancel();
    assert!(!form.is_open());
    assert_eq!(form.text(), "");
}

#[test]
fn editor_starts_from_the_card_fields() {
    let editor = CardEditor::begin(&card(Some("for the API")));
    assert_eq!(editor.title, "Write docs");
    assert_eq!(editor.description, "for the API");
    assert!(!editor.is_dirty());
}

#[test]
fn revert_restores_pre_edit_values() {
    let mut editor = CardEditor::begin(&card(None));
    editor.title = "Rewrite docs".to_string();
    editor.description = "soon".to_string();
    assert!(editor.is_dirty());

    editor.revert();
    assert_eq!(editor.title, "Write docs");
    assert_eq!(editor.description, "");
    assert!(!editor.is_dirty());
}

#[test]
fn save_requires_a_title() {
    let mut editor = CardEditor::begin(&card(None));
    editor.title = "  ".to_string();
    assert_eq!(editor.save(), None);

    editor.title = " Ship ".to_string();
    editor.description = " notes ".to_string();
    assert_eq!(
        editor.save(),
        Some(CardEdit {
            title: Some("Ship".to_string()),
            description: Some("notes".to_string()),
        })
    );
}

// tests/integration_test.rs - Integration tests for the editor facade and sessions

mod common;

use common::{fixtures, validation};
use smarttext::command::{Command, parse_command_line};
use smarttext::document::UNTITLED;
use smarttext::document_set::OpenOutcome;
use smarttext::editor::{CloseOutcome, Editor, EditorEvent, LastTabPolicy};
use smarttext::lifecycle::Lifecycle;
use smarttext::paths::to_file_uri;
use smarttext::session::SessionStore;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_open_edit_save_file() {
    let (_dir, paths) = fixtures::workspace_with(&[("test.txt", "Hello\nWorld\n")]);
    let mut editor = Editor::new();

    editor.open(&paths[0].to_string_lossy()).unwrap();
    assert_eq!(editor.current().text(), "Hello\nWorld\n");
    assert_eq!(editor.status_message(), "Opened: test.txt");

    editor.execute_command(Command::AppendLine("!".to_string()));
    assert!(editor.current().modified());
    assert_eq!(editor.tab_titles(), vec!["test.txt *".to_string()]);

    editor.execute_command(Command::Save);
    assert!(!editor.current().modified());
    assert_eq!(editor.status_message(), "Saved: test.txt");
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "Hello\nWorld\n!\n");
}

#[test]
fn test_open_same_path_twice_keeps_one_tab() {
    let (_dir, paths) = fixtures::workspace_with(&[("a.txt", "a")]);
    let mut editor = Editor::new();

    let first = editor.open(&paths[0].to_string_lossy()).unwrap();
    let second = editor.open(&paths[0].to_string_lossy()).unwrap();

    assert_eq!(first, OpenOutcome::ReplacedPlaceholder(0));
    assert_eq!(second, OpenOutcome::Switched(0));
    assert_eq!(editor.documents().len(), 1);
    assert_eq!(editor.documents().current_index(), 0);
}

#[test]
fn test_open_by_file_uri() {
    let (_dir, paths) = fixtures::workspace_with(&[("with space.txt", "uri")]);
    let mut editor = Editor::new();

    let uri = to_file_uri(&fs::canonicalize(&paths[0]).unwrap()).unwrap();
    editor.open(&uri).unwrap();
    assert_eq!(editor.current().text(), "uri");

    // Plain path to the same file dedupes against the URI-opened tab
    let outcome = editor.open(&paths[0].to_string_lossy()).unwrap();
    assert_eq!(outcome, OpenOutcome::Switched(0));
}

#[test]
fn test_placeholder_reused_only_when_pristine() {
    let (_dir, paths) = fixtures::workspace_with(&[("one.txt", "1"), ("two.txt", "2")]);

    // Untouched placeholder is replaced in place
    let mut editor = Editor::new();
    editor.open(&paths[0].to_string_lossy()).unwrap();
    assert_eq!(editor.documents().len(), 1);

    // Modified placeholder is kept
    let mut editor = Editor::new();
    editor.set_text("notes");
    editor.open(&paths[0].to_string_lossy()).unwrap();
    assert_eq!(editor.documents().len(), 2);
    assert_eq!(editor.documents().current_index(), 1);

    // A document with a path is never a placeholder
    let mut editor = fixtures::editor_with_open(&paths[..1]);
    editor.open(&paths[1].to_string_lossy()).unwrap();
    assert_eq!(editor.documents().len(), 2);
    assert_eq!(editor.current().title(), "two.txt");
}

#[test]
fn test_open_missing_file_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut editor = Editor::new();
    editor.take_events();

    let missing = temp_dir.path().join("missing.txt");
    assert!(editor.open(&missing.to_string_lossy()).is_err());

    assert_eq!(editor.status_message(), "Open cancelled / file not found");
    assert_eq!(editor.take_events(), vec![EditorEvent::StatusMessageChanged]);
    assert_eq!(editor.documents().len(), 1);
    assert_eq!(editor.current().title(), UNTITLED);
}

#[test]
fn test_switching_back_keeps_cursor() {
    let (_dir, paths) = fixtures::workspace_with(&[("c.txt", "cursor test")]);
    let mut editor = fixtures::editor_with_open(&paths);
    editor.set_cursor(6);
    assert_eq!(editor.current().cursor(), 6);

    editor.new_file();
    editor.execute_command(Command::SwitchTo(0));
    // Switching back keeps the remembered cursor
    assert_eq!(editor.current().cursor(), 6);
}

#[test]
fn test_reopening_closed_file_starts_at_cursor_zero() {
    let (_dir, paths) = fixtures::workspace_with(&[("a.txt", "first file"), ("b.txt", "second")]);
    let mut editor = fixtures::editor_with_open(&paths);
    editor.switch_to(0);
    editor.set_cursor(7);
    assert_eq!(editor.current().cursor(), 7);

    assert_eq!(editor.close(Some(0)), CloseOutcome::Closed);
    let outcome = editor.open(&paths[0].to_string_lossy()).unwrap();

    assert_eq!(outcome, OpenOutcome::Appended(1));
    assert_eq!(editor.current().title(), "a.txt");
    assert_eq!(editor.current().cursor(), 0);
}

#[test]
fn test_save_as_sets_path_and_title() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("sub").join("new.txt");
    let mut editor = Editor::new();
    editor.set_text("fresh");

    assert!(editor.save_as(&target.to_string_lossy()).unwrap());
    assert_eq!(fs::read_to_string(&target).unwrap(), "fresh");
    assert_eq!(editor.current().title(), "new.txt");
    assert!(!editor.current().modified());

    // The saved document now dedupes like any opened file
    let outcome = editor.open(&target.to_string_lossy()).unwrap();
    assert_eq!(outcome, OpenOutcome::Switched(0));
}

#[cfg(unix)]
#[test]
fn test_save_failure_is_surfaced() {
    let temp_dir = TempDir::new().unwrap();
    // A directory where a file should go makes the write fail
    let blocked = temp_dir.path().join("blocked");
    fs::create_dir(&blocked).unwrap();

    let mut editor = Editor::new();
    editor.set_text("unsaved");
    assert!(editor.save_as(&blocked.to_string_lossy()).is_err());
    assert!(editor.status_message().starts_with("Save failed:"));
    assert!(editor.current().modified());
}

#[test]
fn test_close_tabs_tracks_selection() {
    let (_dir, paths) =
        fixtures::workspace_with(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")]);
    let mut editor = fixtures::editor_with_open(&paths);
    assert_eq!(editor.documents().current_index(), 2);

    assert_eq!(editor.close(Some(0)), CloseOutcome::Closed);
    assert_eq!(editor.documents().current_index(), 1);
    assert_eq!(editor.current().title(), "c.txt");

    assert_eq!(editor.close(None), CloseOutcome::Closed);
    assert_eq!(editor.current().title(), "b.txt");
    validation::assert_set_valid(editor.documents());
}

#[test]
fn test_closing_last_document_persists_reset_session() {
    let (dir, paths) = fixtures::workspace_with(&[("only.txt", "content")]);
    let store = SessionStore::new(&dir.path().join("data"));
    let mut editor = fixtures::editor_with_open(&paths);
    editor.set_text("edited");

    let mut lifecycle: Lifecycle<Editor> = Lifecycle::new();
    let hook_store = store.clone();
    lifecycle.on_shutdown("save session", move |editor| {
        hook_store.save(&editor.snapshot())?;
        Ok(())
    });

    let should_quit = editor.execute_command(parse_command_line("close").unwrap());
    assert!(should_quit);
    assert_eq!(lifecycle.shutdown(&mut editor), 0);

    let record = store.load().unwrap();
    assert_eq!(record.current_index, 0);
    assert_eq!(record.tabs.len(), 1);
    let tab = &record.tabs[0];
    assert_eq!(tab.path, None);
    assert_eq!(tab.text, "");
    assert!(!tab.modified);
}

#[test]
fn test_replace_policy_keeps_editor_open() {
    let mut editor = Editor::with_policy(LastTabPolicy::ReplaceWithEmpty);
    editor.set_text("x");
    assert!(!editor.execute_command(Command::Close(None)));
    assert!(editor.current().is_pristine_placeholder());
}

#[test]
fn test_session_round_trip_through_editor() {
    let (dir, paths) = fixtures::workspace_with(&[("a.txt", "alpha"), ("b.txt", "beta")]);
    let store = SessionStore::new(dir.path());

    let mut editor = fixtures::editor_with_open(&paths);
    editor.set_text("beta, edited");
    editor.set_cursor(4);
    editor.set_scroll(120.5);
    editor.new_file();
    editor.set_text("scratch");
    editor.switch_to(1);

    store.save(&editor.snapshot()).unwrap();

    let mut restored = Editor::new();
    restored.restore(store.load().unwrap());

    assert_eq!(restored.snapshot(), editor.snapshot());
    assert_eq!(restored.documents().len(), 3);
    assert_eq!(restored.documents().current_index(), 1);
    assert_eq!(restored.current().text(), "beta, edited");
    assert_eq!(restored.current().cursor(), 4);
    assert_eq!(restored.current().scroll_y(), 120.5);
    assert_eq!(restored.tab_titles()[2], "Untitled *");
}

#[test]
fn test_restored_session_clamps_cursor() {
    let temp_dir = TempDir::new().unwrap();
    let store = SessionStore::new(temp_dir.path());
    fs::write(
        store.path(),
        r#"{"currentIndex": 0, "tabs": [{"path": null, "text": "short", "modified": false, "cursorPos": 500, "scrollY": 0}]}"#,
    )
    .unwrap();

    let mut editor = Editor::new();
    editor.restore(store.load().unwrap());
    assert_eq!(editor.current().cursor(), 5);
    validation::assert_set_valid(editor.documents());
}

#[test]
fn test_restored_paths_dedupe_on_open() {
    let (dir, paths) = fixtures::workspace_with(&[("kept.txt", "disk")]);
    let store = SessionStore::new(&dir.path().join("data"));

    let editor = fixtures::editor_with_open(&paths);
    store.save(&editor.snapshot()).unwrap();

    let mut restored = Editor::new();
    restored.restore(store.load().unwrap());
    let outcome = restored.open(&paths[0].to_string_lossy()).unwrap();
    assert_eq!(outcome, OpenOutcome::Switched(0));
    assert_eq!(restored.documents().len(), 1);
}

#[test]
fn test_forwarded_message_opens_and_activates() {
    let (_dir, paths) = fixtures::workspace_with(&[("fwd.txt", "forwarded")]);
    let mut editor = Editor::new();
    editor.take_events();

    let uri = to_file_uri(&fs::canonicalize(&paths[0]).unwrap()).unwrap();
    editor.handle_forwarded(&uri);

    let events = editor.take_events();
    assert!(events.contains(&EditorEvent::ActivateRequested));
    assert!(events.contains(&EditorEvent::DocumentChanged));
    assert_eq!(editor.current().text(), "forwarded");
}

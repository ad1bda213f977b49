use quill_context::ContextItem;
use quill_document::{Document, Inline, Selection, Transaction};

use super::*;
use crate::state::EditorState;

fn state_with(text: &str) -> EditorState {
	EditorState::new(Document::from_text(text))
}

/// Inserts text at the cursor and moves the cursor after it, like typing.
fn typed(state: &EditorState, text: &str) -> Dispatch {
	let sel = state.selection();
	let mut tr = Transaction::new(state.doc());
	tr.insert_text(sel.head, text);
	tr.set_selection(Selection::cursor(sel.head + text.chars().count()));
	Dispatch::new(tr)
}

fn open_mention(state: EditorState) -> EditorState {
	let dispatch = typed(&state, "@").with_trigger(TriggerEvent::Enable);
	state.apply(dispatch)
}

#[test]
fn activates_at_cursor_after_trigger_char() {
	let state = open_mention(state_with("abc "));
	assert!(state.trigger().is_active());
	assert_eq!(state.trigger_value().as_deref(), Some("@"));
	assert_eq!(state.trigger().position(), 4);
}

#[test]
fn typing_extends_the_tracked_value() {
	let mut state = open_mention(state_with("abc "));
	let dispatch = typed(&state, "fi");
	state = state.apply(dispatch);
	assert_eq!(state.trigger_value().as_deref(), Some("@fi"));

	let dispatch = typed(&state, "le");
	state = state.apply(dispatch);
	assert_eq!(state.trigger_value().as_deref(), Some("@file"));
}

#[test]
fn one_trailing_space_keeps_the_mention() {
	let mut state = open_mention(state_with("abc "));
	state = state.apply(typed(&state, "x "));
	assert!(state.trigger().is_active());
	assert_eq!(state.trigger_value().as_deref(), Some("@x "));
}

#[test]
fn three_consecutive_spaces_abandon_the_mention() {
	let mut state = open_mention(state_with("abc "));
	state = state.apply(typed(&state, "x"));
	state = state.apply(typed(&state, "   "));
	assert!(!state.trigger().is_active());
	assert_eq!(state.trigger_value(), None);
}

#[test]
fn deleting_the_trigger_span_deactivates() {
	let state = open_mention(state_with("abc "));
	let mut tr = Transaction::new(state.doc());
	tr.delete(4, 5);
	let state = state.apply(tr.into());
	assert!(!state.trigger().is_active());
}

#[test]
fn moving_the_cursor_outside_deactivates() {
	let state = open_mention(state_with("abc "));
	let mut tr = Transaction::new(state.doc());
	tr.set_selection(Selection::cursor(0));
	let state = state.apply(tr.into());
	assert!(!state.trigger().is_active());
}

#[test]
fn range_selection_deactivates() {
	let mut state = open_mention(state_with("abc "));
	state = state.apply(typed(&state, "fi"));
	let mut tr = Transaction::new(state.doc());
	tr.set_selection(Selection::new(5, 7));
	let state = state.apply(tr.into());
	assert!(!state.trigger().is_active());
}

#[test]
fn disable_turns_the_span_into_plain_text() {
	let state = open_mention(state_with("abc "));
	let tr = Transaction::new(state.doc());
	let state = state.apply(Dispatch::new(tr).with_trigger(TriggerEvent::Disable));
	assert!(!state.trigger().is_active());
	assert_eq!(state.doc().text(), "abc @");
}

#[test]
#[should_panic(expected = "no mention is active")]
fn position_panics_while_inactive() {
	state_with("abc").trigger().position();
}

#[test]
fn input_rule_matches_at_boundaries_only() {
	let config = TriggerConfig::default();
	assert!(input_rule_matches(&Document::from_text("@"), 1, &config));
	assert!(input_rule_matches(&Document::from_text("abc @"), 5, &config));
	assert!(!input_rule_matches(&Document::from_text("abc@"), 4, &config));
	// A trigger typed right before existing non-whitespace stays text.
	assert!(!input_rule_matches(&Document::from_text("a @word"), 3, &config));
	assert!(input_rule_matches(&Document::from_text("a @ word"), 3, &config));
}

#[test]
fn replace_appends_space_and_places_cursor_after_it() {
	let mut state = open_mention(state_with("test "));
	state = state.apply(typed(&state, "fi"));

	let node = Inline::mention(ContextItem::file("file:///file.txt"));
	let state = state.apply(replace_at_mention(&state, node));

	assert_eq!(state.doc().text(), "test file.txt ");
	assert!(!state.trigger().is_active());
	assert_eq!(state.selection(), Selection::cursor(7));
}

#[test]
fn replace_does_not_duplicate_an_existing_space() {
	let mut state = state_with("start  end");
	let mut tr = Transaction::new(state.doc());
	tr.set_selection(Selection::cursor(6));
	state = state.apply(tr.into());
	state = open_mention(state);

	let node = Inline::mention(ContextItem::file("f.txt"));
	let state = state.apply(replace_at_mention(&state, node));

	assert_eq!(state.doc().text(), "start f.txt end");
	assert_eq!(state.selection(), Selection::cursor(8));
}

#[test]
fn replace_without_active_mention_is_a_noop() {
	let state = state_with("test");
	let dispatch = replace_at_mention(&state, Inline::mention(ContextItem::file("f.txt")));
	assert!(dispatch.tr.is_empty());
	assert!(dispatch.trigger.is_none());
}

#[test]
fn delete_at_mention_removes_the_span() {
	let mut state = open_mention(state_with("abc "));
	state = state.apply(typed(&state, "fi"));
	let state = state.apply(delete_at_mention(&state));
	assert_eq!(state.doc().text(), "abc ");
	assert!(!state.trigger().is_active());
	assert_eq!(state.selection(), Selection::cursor(4));
}

#[test]
fn set_mention_value_replaces_the_filter_text() {
	let mut state = open_mention(state_with("abc "));
	state = state.apply(typed(&state, "fi"));

	let state = state.apply(set_mention_value(&state, "files", &TriggerConfig::default()).into());
	assert_eq!(state.trigger_value().as_deref(), Some("@files"));

	let state = state.apply(set_mention_value(&state, "@other", &TriggerConfig::default()).into());
	assert_eq!(state.trigger_value().as_deref(), Some("@other"));

	let state = state.apply(set_mention_value(&state, "", &TriggerConfig::default()).into());
	assert_eq!(state.trigger_value().as_deref(), Some("@"));
}

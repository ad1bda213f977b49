//! Trigger tracking: the single live marker over an in-progress mention.
//!
//! The tracker is a two-state machine re-derived from a decoration set, so
//! it never owns positions itself: every dispatched transaction maps the
//! span through the edit, and the span reports its own destruction when an
//! edit swallows it. Activation is explicit (an input rule or programmatic
//! enable attaches [`TriggerEvent::Enable`] to a dispatch); a trigger
//! character that merely appears in existing text never activates.

use std::sync::LazyLock;

use quill_document::{
	CharIdx, Decoration, DecorationSet, Document, Inline, Selection, Transaction,
};
use regex::Regex;

use crate::state::{Dispatch, EditorState};

/// The default character that begins a mention-entry session.
pub const DEFAULT_TRIGGER_CHARACTER: char = '@';

/// Trigger behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerConfig {
	/// The character that opens a mention.
	pub trigger_char: char,
}

impl Default for TriggerConfig {
	fn default() -> Self {
		Self {
			trigger_char: DEFAULT_TRIGGER_CHARACTER,
		}
	}
}

/// Explicit tracker control attached to a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
	/// Start tracking a mention whose trigger character sits just before
	/// the cursor.
	Enable,
	/// Stop tracking; the span turns into plain text with no special
	/// meaning.
	Disable,
}

/// Whether a mention is currently being typed, and where.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TriggerState {
	#[default]
	Inactive,
	Active {
		decorations: DecorationSet,
	},
}

impl TriggerState {
	pub fn is_active(&self) -> bool {
		matches!(self, TriggerState::Active { .. })
	}

	/// The marker span, when active.
	pub fn decoration(&self) -> Option<Decoration> {
		match self {
			TriggerState::Active { decorations } => decorations.find(),
			TriggerState::Inactive => None,
		}
	}

	/// The span text including the leading trigger character.
	pub fn value(&self, doc: &Document) -> Option<String> {
		self.decoration().map(|d| doc.text_between(d.from, d.to))
	}

	/// The start position of the tracked span.
	///
	/// # Panics
	///
	/// Panics while inactive; callers must check [`TriggerState::is_active`]
	/// first. Hitting this is a caller/UI desync, not a runtime condition.
	pub fn position(&self) -> CharIdx {
		self.decoration()
			.map(|d| d.from)
			.expect("mention position requested while no mention is active")
	}
}

static ABANDON_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s{3,}$").expect("static regex"));

/// Returns whether the tracked span should be abandoned as plain text.
///
/// Once the span ends in three or more consecutive whitespace characters
/// the user is writing prose, not a mention; without this the menu would
/// stay open indefinitely.
pub fn should_abandon(value: &str) -> bool {
	ABANDON_RE.is_match(value)
}

/// Decides whether text the user just typed activates the tracker: the
/// character before the cursor is the trigger character, preceded by
/// start-of-document or whitespace, and not immediately followed by more
/// non-whitespace content (a trigger typed into the middle of an existing
/// word stays plain text).
pub(crate) fn input_rule_matches(doc: &Document, cursor: CharIdx, config: &TriggerConfig) -> bool {
	if cursor == 0 {
		return false;
	}
	let before = doc.text_between(0, cursor);
	let mut chars = before.chars().rev();
	if chars.next() != Some(config.trigger_char) {
		return false;
	}
	if chars.next().is_some_and(|c| !c.is_whitespace()) {
		return false;
	}
	!doc.char_at(cursor).is_some_and(|c| !c.is_whitespace())
}

/// The tracker's transition function, run for every dispatched transaction.
pub(crate) fn apply(
	prev: &TriggerState,
	event: Option<TriggerEvent>,
	tr: &Transaction,
	selection: Selection,
) -> TriggerState {
	match event {
		Some(TriggerEvent::Enable) => {
			if prev.is_active() {
				return prev.clone();
			}
			let pos = selection.head;
			if pos == 0 {
				tracing::debug!("trigger.enable ignored at document start");
				return TriggerState::Inactive;
			}
			tracing::debug!(pos, "trigger.activate");
			TriggerState::Active {
				// The cursor sits just after the trigger character; the
				// inclusive end makes the span grow with typed text.
				decorations: DecorationSet::create(
					tr.doc(),
					[Decoration::inline(pos - 1, pos).with_inclusive_end()],
				),
			}
		}
		Some(TriggerEvent::Disable) => {
			if prev.is_active() {
				tracing::debug!("trigger.deactivate");
			}
			TriggerState::Inactive
		}
		None => {
			let TriggerState::Active { decorations } = prev else {
				return TriggerState::Inactive;
			};
			let mut next = decorations.clone();
			let mapped = decorations.map(tr.mapping());
			if mapped != *decorations {
				let Some(deco) = mapped.find() else {
					tracing::debug!("trigger.deactivate: span destroyed by edit");
					return TriggerState::Inactive;
				};
				if should_abandon(&tr.doc().text_between(deco.from, deco.to)) {
					tracing::debug!("trigger.deactivate: trailing whitespace");
					return TriggerState::Inactive;
				}
				next = mapped;
			}
			// The marker only survives while the selection is a plain
			// caret inside the span.
			if !selection.is_empty() {
				return TriggerState::Inactive;
			}
			if next.find_at(selection.head).is_none() {
				tracing::debug!(pos = selection.head, "trigger.deactivate: cursor left span");
				return TriggerState::Inactive;
			}
			TriggerState::Active { decorations: next }
		}
	}
}

/// Substitutes the tracked span with `node`, appends a single space if one
/// is not already present, and parks the cursor just after that space.
///
/// With no active mention this returns an empty dispatch, which the facade
/// drops.
pub fn replace_at_mention(state: &EditorState, node: Inline) -> Dispatch {
	let Some(deco) = state.trigger().decoration() else {
		return Dispatch::new(Transaction::new(state.doc()));
	};
	let node_len = node.len();
	let mut tr = Transaction::new(state.doc());
	tr.replace_with(deco.from, deco.to, node);
	let end = deco.from + node_len;
	if !tr.doc().char_at(end).is_some_and(|c| c.is_whitespace()) {
		tr.insert_text(end, " ");
	}
	tr.set_selection(Selection::cursor(end + 1));
	Dispatch::new(tr).with_trigger(TriggerEvent::Disable)
}

/// Removes the tracked span entirely, leaving the cursor where it started.
pub fn delete_at_mention(state: &EditorState) -> Dispatch {
	let Some(deco) = state.trigger().decoration() else {
		return Dispatch::new(Transaction::new(state.doc()));
	};
	let mut tr = Transaction::new(state.doc());
	tr.delete(deco.from, deco.to);
	tr.set_selection(Selection::cursor(deco.from));
	Dispatch::new(tr).with_trigger(TriggerEvent::Disable)
}

/// Rewrites the text of the tracked span, keeping the trigger character. A
/// leading trigger character in `value` is trimmed.
///
/// # Panics
///
/// Panics while no mention is active.
pub fn set_mention_value(state: &EditorState, value: &str, config: &TriggerConfig) -> Transaction {
	let deco = state
		.trigger()
		.decoration()
		.expect("set_mention_value called while no mention is active");
	let value = value.strip_prefix(config.trigger_char).unwrap_or(value);
	let mut tr = Transaction::new(state.doc());
	if value.is_empty() {
		tr.delete(deco.from + 1, deco.to);
	} else {
		tr.replace_with(deco.from + 1, deco.to, Inline::text(value));
	}
	tr
}

#[cfg(test)]
mod tests;

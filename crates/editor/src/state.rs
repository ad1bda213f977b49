//! Editor state: one document, one selection, one trigger tracker.

use quill_document::{Document, Selection, Transaction};

use crate::trigger::{self, TriggerEvent, TriggerState};

/// A transaction plus an optional explicit trigger event.
///
/// Most dispatches carry no event; the tracker derives its next state from
/// the transaction alone. Enable/disable are attached where the original
/// action decides them (input rule, apply, escape), so callers cannot
/// forget to keep the tracker in sync.
#[derive(Debug)]
pub struct Dispatch {
	pub tr: Transaction,
	pub trigger: Option<TriggerEvent>,
}

impl Dispatch {
	pub fn new(tr: Transaction) -> Self {
		Self { tr, trigger: None }
	}

	pub fn with_trigger(mut self, event: TriggerEvent) -> Self {
		self.trigger = Some(event);
		self
	}
}

impl From<Transaction> for Dispatch {
	fn from(tr: Transaction) -> Self {
		Self::new(tr)
	}
}

/// Immutable editor state. Applying a [`Dispatch`] produces the next state;
/// the selection and the trigger tracker are threaded through the
/// transaction's position mapping.
#[derive(Debug, Clone)]
pub struct EditorState {
	doc: Document,
	selection: Selection,
	trigger: TriggerState,
}

impl EditorState {
	pub fn new(doc: Document) -> Self {
		let selection = Selection::at_end(&doc);
		Self {
			doc,
			selection,
			trigger: TriggerState::Inactive,
		}
	}

	pub fn doc(&self) -> &Document {
		&self.doc
	}

	pub fn selection(&self) -> Selection {
		self.selection
	}

	pub fn trigger(&self) -> &TriggerState {
		&self.trigger
	}

	/// The tracked mention span's text, including the trigger character.
	pub fn trigger_value(&self) -> Option<String> {
		self.trigger.value(&self.doc)
	}

	pub fn apply(&self, dispatch: Dispatch) -> EditorState {
		let Dispatch { tr, trigger: event } = dispatch;
		let selection = tr
			.selection()
			.unwrap_or_else(|| self.selection.map(tr.mapping()));
		let trigger = trigger::apply(&self.trigger, event, &tr, selection);
		EditorState {
			doc: tr.into_doc(),
			selection,
			trigger,
		}
	}
}

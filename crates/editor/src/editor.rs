//! The prompt editor facade.
//!
//! [`PromptEditor`] binds one document, the trigger tracker, the suggestion
//! state machine, and the fetch controller to a single host. All
//! collaborators are injected at construction; there is no process-wide
//! state.
//!
//! The facade is the sole mutator of its state. Dispatches run
//! synchronously: the transaction is applied, the trigger tracker observes
//! it, and any resulting menu events run to completion before the call
//! returns. Fetch results arrive on an internal channel and are folded in
//! by [`PromptEditor::try_pump`] / [`PromptEditor::settle`].

use std::sync::Arc;
use std::time::Duration;

use quill_context::ContextItem;
use quill_document::{CharIdx, Document, Inline, Selection, Transaction};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::loader::{FetchController, LoaderEvent, MenuDataSource};
use crate::menu::{Effect, Effects, MenuEvent, MenuNotification, MenuState};
use crate::reconcile::{self, MentionPosition};
use crate::state::{Dispatch, EditorState};
use crate::trigger::{self, TriggerConfig, TriggerEvent};

/// Construction options for [`PromptEditor`].
#[derive(Debug, Clone)]
pub struct PromptEditorOptions {
	pub trigger: TriggerConfig,
	/// Quiescence window before a non-empty filter is fetched.
	pub debounce: Duration,
	pub initial_document: Option<Document>,
}

impl Default for PromptEditorOptions {
	fn default() -> Self {
		Self {
			trigger: TriggerConfig::default(),
			debounce: Duration::from_millis(300),
			initial_document: None,
		}
	}
}

/// One prompt editor instance bound to one data source and one host.
pub struct PromptEditor {
	state: EditorState,
	menu: MenuState,
	loader: FetchController,
	loader_rx: UnboundedReceiver<LoaderEvent>,
	notify_tx: mpsc::UnboundedSender<MenuNotification>,
	notify_rx: Option<UnboundedReceiver<MenuNotification>>,
	config: TriggerConfig,
	focused: bool,
}

impl PromptEditor {
	pub fn new(source: Arc<dyn MenuDataSource>, options: PromptEditorOptions) -> Self {
		let (loader_tx, loader_rx) = mpsc::unbounded_channel();
		let (notify_tx, notify_rx) = mpsc::unbounded_channel();
		let doc = options.initial_document.unwrap_or_default();
		Self {
			state: EditorState::new(doc),
			menu: MenuState::new(options.debounce),
			loader: FetchController::new(source, loader_tx),
			loader_rx,
			notify_tx,
			notify_rx: Some(notify_rx),
			config: options.trigger,
			focused: false,
		}
	}

	/// The host's notification stream. Yields `None` after the first call.
	pub fn take_notifications(&mut self) -> Option<UnboundedReceiver<MenuNotification>> {
		self.notify_rx.take()
	}

	pub fn state(&self) -> &EditorState {
		&self.state
	}

	pub fn document(&self) -> &Document {
		self.state.doc()
	}

	pub fn text(&self) -> String {
		self.state.doc().text()
	}

	pub fn menu(&self) -> &MenuState {
		&self.menu
	}

	pub fn is_focused(&self) -> bool {
		self.focused
	}

	/// All mention payloads currently in the document.
	pub fn mentions(&self) -> Vec<ContextItem> {
		reconcile::get_mentions(self.state.doc())
	}

	/// The tracked mention span's text, including the trigger character.
	pub fn mention_value(&self) -> Option<String> {
		self.state.trigger_value()
	}

	/// The tracked mention span's start position.
	///
	/// # Panics
	///
	/// Panics while no mention is active.
	pub fn mention_position(&self) -> CharIdx {
		self.state.trigger().position()
	}

	/// Applies a transaction (plus optional trigger event) and routes the
	/// resulting trigger changes into the menu machine. Empty dispatches
	/// are dropped.
	pub fn dispatch(&mut self, dispatch: impl Into<Dispatch>) {
		let dispatch = dispatch.into();
		if dispatch.tr.is_empty() && dispatch.trigger.is_none() {
			return;
		}

		let prev_active = self.state.trigger().is_active();
		let prev_value = self.state.trigger_value();
		let prev_anchor = self.state.trigger().decoration().map(|d| d.from);

		self.state = self.state.apply(dispatch);

		let active = self.state.trigger().is_active();
		let value = self.state.trigger_value();
		let anchor = self.state.trigger().decoration().map(|d| d.from);

		match (prev_active, active) {
			(false, true) => {
				self.run_menu(MenuEvent::MentionAdded {
					anchor: anchor.unwrap_or(0),
				});
			}
			(true, false) => self.run_menu(MenuEvent::MentionRemoved),
			(true, true) => {
				if value != prev_value {
					let query = value
						.as_deref()
						.map(|v| v.chars().skip(1).collect::<String>())
						.unwrap_or_default();
					self.run_menu(MenuEvent::QueryChanged {
						query,
						anchor: anchor.unwrap_or(0),
					});
				} else if anchor != prev_anchor {
					self.run_menu(MenuEvent::AnchorMoved {
						anchor: anchor.unwrap_or(0),
					});
				}
			}
			(false, false) => {}
		}
	}

	/// Simulates the user typing `text` at the current selection. This is
	/// the path that applies the trigger input rule: typing the trigger
	/// character at a word boundary opens a mention.
	pub fn type_text(&mut self, text: &str) {
		let selection = self.state.selection();
		let mut tr = Transaction::new(self.state.doc());
		if !selection.is_empty() {
			tr.delete(selection.min(), selection.max());
		}
		let pos = selection.min();
		tr.insert_text(pos, text);
		let cursor = pos + text.chars().count();
		tr.set_selection(Selection::cursor(cursor));

		let enable = !self.state.trigger().is_active()
			&& text.ends_with(self.config.trigger_char)
			&& trigger::input_rule_matches(tr.doc(), cursor, &self.config);

		let mut dispatch = Dispatch::new(tr);
		if enable {
			dispatch = dispatch.with_trigger(TriggerEvent::Enable);
		}
		self.dispatch(dispatch);
	}

	/// Programmatically starts a mention at the cursor: inserts the trigger
	/// character and activates the tracker regardless of boundary rules.
	pub fn open_at_cursor(&mut self) {
		if self.state.trigger().is_active() {
			return;
		}
		let head = self.state.selection().head;
		let mut tr = Transaction::new(self.state.doc());
		tr.insert_text(head, &self.config.trigger_char.to_string());
		tr.set_selection(Selection::cursor(head + 1));
		self.dispatch(Dispatch::new(tr).with_trigger(TriggerEvent::Enable));
	}

	/// Rewrites the filter text of the tracked span.
	///
	/// # Panics
	///
	/// Panics while no mention is active.
	pub fn set_mention_value(&mut self, value: &str) {
		let tr = trigger::set_mention_value(&self.state, value, &self.config);
		self.dispatch(tr);
	}

	// --- menu forwarding ---------------------------------------------------

	pub fn select_next(&mut self) {
		self.run_menu(MenuEvent::SelectNext);
	}

	pub fn select_previous(&mut self) {
		self.run_menu(MenuEvent::SelectPrevious);
	}

	/// Applies the selected item (or the explicitly clicked index) as a
	/// mention node.
	pub fn apply_selection(&mut self, index: Option<usize>) {
		self.run_menu(MenuEvent::Apply { index });
	}

	/// Closes the menu and abandons the tracked mention as plain text.
	pub fn close_menu(&mut self) {
		if self.state.trigger().is_active() {
			let tr = Transaction::new(self.state.doc());
			self.dispatch(Dispatch::new(tr).with_trigger(TriggerEvent::Disable));
		}
	}

	pub fn set_focus(&mut self, focused: bool, move_cursor_to_end: bool) {
		self.focused = focused;
		if focused {
			if move_cursor_to_end {
				let mut tr = Transaction::new(self.state.doc());
				let selection = Selection::at_end(tr.doc());
				tr.set_selection(selection);
				self.dispatch(tr);
			}
			if self.state.trigger().is_active() {
				self.run_menu(MenuEvent::FocusChanged { focused: true });
			}
		} else {
			self.run_menu(MenuEvent::FocusChanged { focused: false });
		}
	}

	// --- document operations ----------------------------------------------

	/// Appends text at the end of the document, whitespace-separated.
	pub fn append_text(&mut self, text: &str) {
		let tr = reconcile::append_text(self.state.doc(), text);
		self.dispatch(tr);
	}

	/// Replaces the whole document.
	pub fn set_document(&mut self, doc: Document) {
		let mut tr = Transaction::new(self.state.doc());
		let len = tr.doc().len();
		tr.delete(0, len);
		tr.insert(0, doc.inlines().to_vec());
		let selection = Selection::at_end(tr.doc());
		tr.set_selection(selection);
		self.dispatch(tr);
	}

	/// Adds mentions, merging or replacing ones that overlap existing
	/// mentions of the same entity.
	pub fn add_mentions(&mut self, items: &[ContextItem], position: MentionPosition, separator: &str) {
		let tr = reconcile::add_mentions(self.state.doc(), items, position, separator);
		self.dispatch(tr);
	}

	/// Adds or refreshes mentions without ever deleting existing ones.
	pub fn upsert_mentions(
		&mut self,
		items: &[ContextItem],
		position: MentionPosition,
		separator: &str,
	) {
		let tr = reconcile::upsert_mentions(self.state.doc(), items, position, separator);
		self.dispatch(tr);
	}

	/// Removes every mention whose payload fails the predicate.
	pub fn filter_mentions(&mut self, predicate: impl Fn(&ContextItem) -> bool) {
		let tr = reconcile::filter_mentions(self.state.doc(), predicate);
		self.dispatch(tr);
	}

	/// Sets host-supplied initial mentions, unless the user already typed.
	pub fn set_initial_mentions(&mut self, items: &[ContextItem]) {
		match reconcile::set_initial_mentions(self.state.doc(), items) {
			Some(tr) => self.dispatch(tr),
			None => tracing::debug!("initial mentions skipped: document already has user content"),
		}
	}

	// --- async plumbing ----------------------------------------------------

	/// Folds in loader events that have already arrived, without waiting.
	pub fn try_pump(&mut self) {
		while let Ok(event) = self.loader_rx.try_recv() {
			self.on_loader_event(event);
		}
	}

	/// Drives the machine until no fetch is pending. Debounce timers run on
	/// tokio's clock, so tests on a paused runtime advance deterministically.
	pub async fn settle(&mut self) {
		while self.menu.is_fetching() {
			let Some(event) = self.loader_rx.recv().await else {
				break;
			};
			self.on_loader_event(event);
		}
		self.try_pump();
	}

	fn on_loader_event(&mut self, event: LoaderEvent) {
		// Events from superseded fetches are dropped here; the machine
		// additionally discards results whose query no longer matches.
		if event.generation() != self.loader.generation() {
			tracing::trace!(generation = event.generation(), "menu.fetch.stale");
			return;
		}
		let menu_event = match event {
			LoaderEvent::Started { query, .. } => MenuEvent::FetchStarted { query },
			LoaderEvent::Resolved { query, items, .. } => MenuEvent::FetchResolved { query, items },
			LoaderEvent::Failed { query, error, .. } => MenuEvent::FetchFailed { query, error },
		};
		self.run_menu(menu_event);
	}

	fn run_menu(&mut self, event: MenuEvent) {
		let effects = self.menu.update(event);
		self.perform(effects);
	}

	fn perform(&mut self, effects: Effects) {
		for effect in effects {
			match effect {
				Effect::Fetch { query, debounce } => self.loader.trigger(query, debounce),
				Effect::CancelFetch => self.loader.cancel(),
				Effect::Notify(notification) => {
					let _ = self.notify_tx.send(notification);
				}
				Effect::Apply(item) => self.apply_item(item),
			}
		}
	}

	fn apply_item(&mut self, item: ContextItem) {
		tracing::debug!(uri = %item.uri, "mention.apply");
		let dispatch = trigger::replace_at_mention(&self.state, Inline::mention(item));
		self.dispatch(dispatch);
	}
}

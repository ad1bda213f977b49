//! Suggestion menu state machine.
//!
//! A pure reducer: feeding a [`MenuEvent`] into [`MenuState::update`]
//! advances the state and returns the side effects to perform (fetches to
//! start or cancel, host notifications, an item to apply). All I/O lives in
//! the driver, so the machine is testable without mocking time or network.
//!
//! Stale-result suppression happens here by query equality: a fetch result
//! whose query no longer matches the tracked filter is discarded. The
//! loader additionally drops events from superseded generations before
//! they ever reach the machine.

use std::time::Duration;

use quill_context::ContextItem;
use quill_document::CharIdx;
use smallvec::SmallVec;

/// Where the data-loading pipeline currently is, within an open menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
	/// No pending fetch.
	Idle,
	/// Waiting for typing to quiesce before fetching.
	Debouncing,
	/// One fetch is in flight for the current filter.
	Loading,
}

/// Menu visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPhase {
	Closed,
	Open(LoadPhase),
}

/// What the host needs to know to render the menu.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuNotification {
	/// The menu opened, anchored at the given document position.
	Opened { anchor: CharIdx },
	/// The menu closed.
	Closed,
	/// The filter text or anchor position changed.
	FilterChanged { filter: String, anchor: CharIdx },
	/// The item list, selection, loading state, or error row changed.
	ItemsChanged {
		items: Vec<ContextItem>,
		selected_index: usize,
		loading: bool,
		error: Option<String>,
	},
}

/// Side effects the reducer asks its driver to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
	/// Start (or restart) a fetch for `query` after `debounce`.
	Fetch { query: String, debounce: Duration },
	/// Cancel any in-flight fetch.
	CancelFetch,
	/// Replace the tracked mention span with this item.
	Apply(ContextItem),
	/// Tell the host about a visible change.
	Notify(MenuNotification),
}

/// Events fed into the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent {
	/// A mention span appeared; the menu opens.
	MentionAdded { anchor: CharIdx },
	/// The mention span disappeared; the menu closes.
	MentionRemoved,
	/// The filter text changed.
	QueryChanged { query: String, anchor: CharIdx },
	/// The span moved without its text changing.
	AnchorMoved { anchor: CharIdx },
	/// The debounce for `query` elapsed and its fetch started.
	FetchStarted { query: String },
	/// The fetch for `query` resolved.
	FetchResolved {
		query: String,
		items: Vec<ContextItem>,
	},
	/// The fetch for `query` failed.
	FetchFailed { query: String, error: String },
	/// Advance the selection, wrapping at the end.
	SelectNext,
	/// Move the selection back, wrapping at the start.
	SelectPrevious,
	/// Apply the selected item, or the explicitly clicked index.
	Apply { index: Option<usize> },
	/// The editor gained or lost focus.
	FocusChanged { focused: bool },
}

pub type Effects = SmallVec<[Effect; 3]>;

/// Suggestion menu context: filter, ranked items, selection, anchor.
///
/// `items` ordering is authoritative for display and wraparound;
/// `selected_index` is always a valid index while `items` is non-empty and
/// resets to zero whenever a fresh fetch replaces the list.
#[derive(Debug, Clone)]
pub struct MenuState {
	phase: MenuPhase,
	query: String,
	selected_index: usize,
	items: Vec<ContextItem>,
	anchor: CharIdx,
	error: Option<String>,
	debounce: Duration,
}

impl MenuState {
	pub fn new(debounce: Duration) -> Self {
		Self {
			phase: MenuPhase::Closed,
			query: String::new(),
			selected_index: 0,
			items: Vec::new(),
			anchor: 0,
			error: None,
			debounce,
		}
	}

	pub fn phase(&self) -> MenuPhase {
		self.phase
	}

	pub fn is_open(&self) -> bool {
		matches!(self.phase, MenuPhase::Open(_))
	}

	/// True while a fetch is debouncing or in flight.
	pub fn is_fetching(&self) -> bool {
		matches!(
			self.phase,
			MenuPhase::Open(LoadPhase::Debouncing) | MenuPhase::Open(LoadPhase::Loading)
		)
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn items(&self) -> &[ContextItem] {
		&self.items
	}

	pub fn selected_index(&self) -> usize {
		self.selected_index
	}

	pub fn anchor(&self) -> CharIdx {
		self.anchor
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	/// Advances the machine and returns the effects to perform.
	pub fn update(&mut self, event: MenuEvent) -> Effects {
		let mut effects = Effects::new();
		match event {
			MenuEvent::MentionAdded { anchor } => {
				tracing::debug!(anchor, "menu.open");
				// Menu-open fetches run with an empty filter and are not
				// debounced.
				self.phase = MenuPhase::Open(LoadPhase::Loading);
				self.query.clear();
				self.items.clear();
				self.selected_index = 0;
				self.error = None;
				self.anchor = anchor;
				effects.push(Effect::Notify(MenuNotification::Opened { anchor }));
				effects.push(Effect::Fetch {
					query: String::new(),
					debounce: Duration::ZERO,
				});
			}
			MenuEvent::MentionRemoved => {
				if self.is_open() {
					tracing::debug!("menu.close");
					self.phase = MenuPhase::Closed;
					self.query.clear();
					self.items.clear();
					self.selected_index = 0;
					self.error = None;
					effects.push(Effect::CancelFetch);
					effects.push(Effect::Notify(MenuNotification::Closed));
				}
			}
			MenuEvent::QueryChanged { query, anchor } => {
				if !self.is_open() || query == self.query {
					// Restarting the debounce for an unchanged filter would
					// only delay results.
					return effects;
				}
				self.query = query.clone();
				self.anchor = anchor;
				let debounce = if query.is_empty() {
					Duration::ZERO
				} else {
					self.debounce
				};
				self.phase = MenuPhase::Open(if debounce.is_zero() {
					LoadPhase::Loading
				} else {
					LoadPhase::Debouncing
				});
				effects.push(Effect::Notify(MenuNotification::FilterChanged {
					filter: query.clone(),
					anchor,
				}));
				effects.push(Effect::Fetch { query, debounce });
			}
			MenuEvent::AnchorMoved { anchor } => {
				if self.is_open() && anchor != self.anchor {
					self.anchor = anchor;
					effects.push(Effect::Notify(MenuNotification::FilterChanged {
						filter: self.query.clone(),
						anchor,
					}));
				}
			}
			MenuEvent::FetchStarted { query } => {
				if !self.is_open() || query != self.query {
					tracing::trace!(query = %query, "menu.fetch.started stale");
					return effects;
				}
				self.phase = MenuPhase::Open(LoadPhase::Loading);
				self.error = None;
				effects.push(self.notify_items(true));
			}
			MenuEvent::FetchResolved { query, items } => {
				if !self.is_open() || query != self.query {
					tracing::trace!(query = %query, "menu.fetch.resolved stale, discarding");
					return effects;
				}
				tracing::debug!(query = %query, count = items.len(), "menu.items");
				self.phase = MenuPhase::Open(LoadPhase::Idle);
				self.items = items;
				self.selected_index = 0;
				self.error = None;
				effects.push(self.notify_items(false));
			}
			MenuEvent::FetchFailed { query, error } => {
				if !self.is_open() || query != self.query {
					return effects;
				}
				// Recover locally; the host renders the error in place of
				// the item list.
				self.phase = MenuPhase::Open(LoadPhase::Idle);
				self.error = Some(error);
				effects.push(self.notify_items(false));
			}
			MenuEvent::SelectNext => {
				if self.is_open() && !self.items.is_empty() {
					self.selected_index = (self.selected_index + 1) % self.items.len();
					effects.push(self.notify_items(self.is_fetching()));
				}
			}
			MenuEvent::SelectPrevious => {
				if self.is_open() && !self.items.is_empty() {
					self.selected_index = if self.selected_index == 0 {
						self.items.len() - 1
					} else {
						self.selected_index - 1
					};
					effects.push(self.notify_items(self.is_fetching()));
				}
			}
			MenuEvent::Apply { index } => {
				if !self.is_open() {
					return effects;
				}
				if let Some(index) = index
					&& index < self.items.len()
				{
					self.selected_index = index;
				}
				if let Some(item) = self.items.get(self.selected_index) {
					effects.push(Effect::Apply(item.clone()));
				}
			}
			MenuEvent::FocusChanged { focused } => {
				if focused {
					if self.phase == MenuPhase::Closed {
						self.phase = MenuPhase::Open(LoadPhase::Idle);
						effects.push(Effect::Notify(MenuNotification::Opened {
							anchor: self.anchor,
						}));
					}
				} else if self.is_open() {
					// Keep items and filter: regaining focus reopens the
					// menu as it was.
					self.phase = MenuPhase::Closed;
					effects.push(Effect::CancelFetch);
					effects.push(Effect::Notify(MenuNotification::Closed));
				}
			}
		}
		effects
	}

	fn notify_items(&self, loading: bool) -> Effect {
		Effect::Notify(MenuNotification::ItemsChanged {
			items: self.items.clone(),
			selected_index: self.selected_index,
			loading,
			error: self.error.clone(),
		})
	}
}

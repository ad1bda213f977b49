//! Cursor and range selections.

use crate::node::Document;
use crate::transaction::{Bias, Mapping};
use crate::CharIdx;

/// A selection defined by anchor and head positions.
///
/// An empty selection (anchor == head) is a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
	/// The fixed end of the selection.
	pub anchor: CharIdx,
	/// The moving end (cursor position).
	pub head: CharIdx,
}

impl Selection {
	pub fn new(anchor: CharIdx, head: CharIdx) -> Self {
		Self { anchor, head }
	}

	/// A cursor at the given position.
	pub fn cursor(pos: CharIdx) -> Self {
		Self::new(pos, pos)
	}

	pub fn at_start() -> Self {
		Self::cursor(0)
	}

	pub fn at_end(doc: &Document) -> Self {
		Self::cursor(doc.len())
	}

	pub fn is_empty(&self) -> bool {
		self.anchor == self.head
	}

	/// The smaller of anchor and head.
	pub fn min(&self) -> CharIdx {
		self.anchor.min(self.head)
	}

	/// The larger of anchor and head.
	pub fn max(&self) -> CharIdx {
		self.anchor.max(self.head)
	}

	/// Carries the selection across a transaction's edits.
	pub fn map(&self, mapping: &Mapping) -> Selection {
		Selection::new(
			mapping.map(self.anchor, Bias::Right),
			mapping.map(self.head, Bias::Right),
		)
	}
}

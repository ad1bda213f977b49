//! Transactions: eager edits plus recorded position rewrites.

use smallvec::SmallVec;

use crate::node::{Document, Inline};
use crate::selection::Selection;
use crate::{CharIdx, CharLen};

/// Bias determines how positions at rewrite boundaries are mapped.
///
/// When mapping a position through an insertion at exactly that position,
/// bias decides whether the position stays before the inserted content or
/// moves after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// One recorded edit: `[start, start + old_len)` was replaced by `new_len`
/// units, in the coordinates of the document at the time of the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewrite {
	pub start: CharIdx,
	pub old_len: CharLen,
	pub new_len: CharLen,
}

impl Rewrite {
	/// Maps a position through this rewrite.
	///
	/// Positions at the old range's start stay at the start, positions at
	/// its end land after the replacement; only positions strictly inside a
	/// replacement (or exactly at a pure insertion point) consult `bias`.
	pub fn map(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		if pos < self.start {
			return pos;
		}
		let end = self.start + self.old_len;
		if pos > end {
			return pos - self.old_len + self.new_len;
		}
		let after = if self.old_len == 0 {
			bias == Bias::Right
		} else if pos == self.start {
			false
		} else if pos == end {
			true
		} else {
			bias == Bias::Right
		};
		if after { self.start + self.new_len } else { self.start }
	}
}

/// An ordered list of [`Rewrite`]s. Mapping a position walks every rewrite
/// in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
	rewrites: SmallVec<[Rewrite; 4]>,
}

impl Mapping {
	pub fn is_empty(&self) -> bool {
		self.rewrites.is_empty()
	}

	pub fn rewrites(&self) -> &[Rewrite] {
		&self.rewrites
	}

	/// Maps a position from before-transaction coordinates to after.
	pub fn map(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		self.rewrites.iter().fold(pos, |pos, r| r.map(pos, bias))
	}

	fn push(&mut self, rewrite: Rewrite) {
		self.rewrites.push(rewrite);
	}
}

/// A set of changes building on one source document.
///
/// Each operation takes positions in the coordinates of the document as
/// already modified by earlier operations; use [`Transaction::mapping`] to
/// bring positions captured before the transaction up to date.
#[derive(Debug, Clone)]
pub struct Transaction {
	doc: Document,
	mapping: Mapping,
	selection: Option<Selection>,
}

impl Transaction {
	pub fn new(doc: &Document) -> Self {
		Self {
			doc: doc.clone(),
			mapping: Mapping::default(),
			selection: None,
		}
	}

	/// The document with all operations so far applied.
	pub fn doc(&self) -> &Document {
		&self.doc
	}

	pub fn into_doc(self) -> Document {
		self.doc
	}

	pub fn mapping(&self) -> &Mapping {
		&self.mapping
	}

	/// The selection explicitly set on this transaction, if any.
	pub fn selection(&self) -> Option<Selection> {
		self.selection
	}

	/// Returns true if any operation changed document content.
	pub fn doc_changed(&self) -> bool {
		!self.mapping.is_empty()
	}

	/// Returns true if dispatching this transaction would be a no-op.
	pub fn is_empty(&self) -> bool {
		!self.doc_changed() && self.selection.is_none()
	}

	pub fn insert_text(&mut self, pos: CharIdx, text: &str) -> &mut Self {
		if text.is_empty() {
			return self;
		}
		self.splice(pos, pos, vec![Inline::text(text)])
	}

	pub fn insert(&mut self, pos: CharIdx, inlines: Vec<Inline>) -> &mut Self {
		if inlines.iter().all(Inline::is_empty) {
			return self;
		}
		self.splice(pos, pos, inlines)
	}

	pub fn delete(&mut self, from: CharIdx, to: CharIdx) -> &mut Self {
		if from == to {
			return self;
		}
		self.splice(from, to, Vec::new())
	}

	pub fn replace_with(&mut self, from: CharIdx, to: CharIdx, inline: Inline) -> &mut Self {
		self.splice(from, to, vec![inline])
	}

	/// Sets the selection for the resulting state. Later operations keep it
	/// mapped up to date.
	///
	/// # Panics
	///
	/// Panics if the selection lies outside the current document.
	pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
		let len = self.doc.len();
		assert!(
			selection.anchor <= len && selection.head <= len,
			"selection {selection:?} out of bounds (len {len})"
		);
		self.selection = Some(selection);
		self
	}

	fn splice(&mut self, from: CharIdx, to: CharIdx, replacement: Vec<Inline>) -> &mut Self {
		let new_len = replacement.iter().map(Inline::len).sum();
		self.doc.splice(from, to, replacement);
		let rewrite = Rewrite {
			start: from,
			old_len: to - from,
			new_len,
		};
		self.mapping.push(rewrite);
		if let Some(selection) = &mut self.selection {
			*selection = Selection::new(
				rewrite.map(selection.anchor, Bias::Right),
				rewrite.map(selection.head, Bias::Right),
			);
		}
		self
	}
}

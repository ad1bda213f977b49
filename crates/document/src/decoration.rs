//! Decorations: document ranges that survive edits via position mapping.

use smallvec::SmallVec;

use crate::node::Document;
use crate::transaction::{Bias, Mapping};
use crate::CharIdx;

/// A half-open span `[from, to)` tracked across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
	pub from: CharIdx,
	pub to: CharIdx,
	/// When set, insertions at `to` grow the span instead of staying
	/// outside it. This is what lets a span track text typed at its end.
	pub inclusive_end: bool,
}

impl Decoration {
	pub fn inline(from: CharIdx, to: CharIdx) -> Self {
		Self {
			from,
			to,
			inclusive_end: false,
		}
	}

	pub fn with_inclusive_end(mut self) -> Self {
		self.inclusive_end = true;
		self
	}

	/// Returns true if `pos` touches the span, boundaries included.
	pub fn contains(&self, pos: CharIdx) -> bool {
		self.from <= pos && pos <= self.to
	}

	/// Maps the span through an edit; `None` means the span was destroyed.
	pub fn map(&self, mapping: &Mapping) -> Option<Decoration> {
		let from = mapping.map(self.from, Bias::Right);
		let to = mapping.map(
			self.to,
			if self.inclusive_end { Bias::Right } else { Bias::Left },
		);
		(from < to).then_some(Decoration {
			from,
			to,
			inclusive_end: self.inclusive_end,
		})
	}
}

/// A set of decorations that can be mapped across transactions as a whole.
///
/// Mapping drops destroyed members; comparing the mapped set against the
/// original tells a caller whether anything moved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
	decorations: SmallVec<[Decoration; 1]>,
}

impl DecorationSet {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds a set over the given document.
	///
	/// # Panics
	///
	/// Panics if a decoration lies outside the document.
	pub fn create(doc: &Document, decorations: impl IntoIterator<Item = Decoration>) -> Self {
		let len = doc.len();
		let decorations: SmallVec<[Decoration; 1]> = decorations.into_iter().collect();
		for deco in &decorations {
			assert!(
				deco.from <= deco.to && deco.to <= len,
				"decoration {deco:?} out of bounds (len {len})"
			);
		}
		Self { decorations }
	}

	pub fn is_empty(&self) -> bool {
		self.decorations.is_empty()
	}

	/// The first decoration in the set, if any.
	pub fn find(&self) -> Option<Decoration> {
		self.decorations.first().copied()
	}

	/// The first decoration touching `pos`, if any.
	pub fn find_at(&self, pos: CharIdx) -> Option<Decoration> {
		self.decorations.iter().find(|d| d.contains(pos)).copied()
	}

	/// Maps every member through an edit, dropping the destroyed ones.
	pub fn map(&self, mapping: &Mapping) -> DecorationSet {
		DecorationSet {
			decorations: self.decorations.iter().filter_map(|d| d.map(mapping)).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::node::Document;
	use crate::transaction::Transaction;

	#[test]
	fn inclusive_end_grows_with_typed_text() {
		let doc = Document::from_text("abc @");
		let deco = Decoration::inline(4, 5).with_inclusive_end();
		let mut tr = Transaction::new(&doc);
		tr.insert_text(5, "fi");
		let mapped = deco.map(tr.mapping()).unwrap();
		assert_eq!((mapped.from, mapped.to), (4, 7));
	}

	#[test]
	fn exclusive_end_does_not_grow() {
		let doc = Document::from_text("abc @");
		let deco = Decoration::inline(4, 5);
		let mut tr = Transaction::new(&doc);
		tr.insert_text(5, "fi");
		let mapped = deco.map(tr.mapping()).unwrap();
		assert_eq!((mapped.from, mapped.to), (4, 5));
	}

	#[test]
	fn insertion_before_span_shifts_it() {
		let doc = Document::from_text("abc @x");
		let deco = Decoration::inline(4, 6).with_inclusive_end();
		let mut tr = Transaction::new(&doc);
		tr.insert_text(0, ">> ");
		let mapped = deco.map(tr.mapping()).unwrap();
		assert_eq!((mapped.from, mapped.to), (7, 9));
	}

	#[test]
	fn deleting_the_span_destroys_it() {
		let doc = Document::from_text("abc @xy");
		let deco = Decoration::inline(4, 7).with_inclusive_end();
		let mut tr = Transaction::new(&doc);
		tr.delete(4, 7);
		assert!(deco.map(tr.mapping()).is_none());
	}

	#[test]
	fn deleting_inside_shrinks_the_span() {
		let doc = Document::from_text("abc @xy");
		let deco = Decoration::inline(4, 7).with_inclusive_end();
		let mut tr = Transaction::new(&doc);
		tr.delete(6, 7);
		let mapped = deco.map(tr.mapping()).unwrap();
		assert_eq!((mapped.from, mapped.to), (4, 6));
	}

	#[test]
	fn set_map_keeps_equal_when_unrelated_edit() {
		let doc = Document::from_text("abc @x tail");
		let set = DecorationSet::create(&doc, [Decoration::inline(4, 6).with_inclusive_end()]);
		let mut tr = Transaction::new(&doc);
		tr.insert_text(11, "!");
		assert_eq!(set.map(tr.mapping()), set);
	}
}

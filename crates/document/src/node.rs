//! Inline nodes and the document tree.

use quill_context::ContextItem;
use serde::{Deserialize, Serialize};

use crate::{CharIdx, CharLen};

/// An atomic, non-editable mention node wrapping one context item.
///
/// Atomic means the node has no internally addressable positions; it is
/// deleted or replaced as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionNode {
	pub item: ContextItem,
	/// Marks mentions pre-populated by the host rather than typed by the
	/// user.
	#[serde(default, rename = "isFromInitialContext")]
	pub is_from_initial_context: bool,
}

impl MentionNode {
	pub fn new(item: ContextItem) -> Self {
		Self {
			item,
			is_from_initial_context: false,
		}
	}

	/// The text this node renders as.
	pub fn display_text(&self) -> String {
		self.item.display_text()
	}
}

/// A single inline node: a run of text or an atomic mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "node")]
pub enum Inline {
	Text { text: String },
	Mention(MentionNode),
}

impl Inline {
	pub fn text(text: impl Into<String>) -> Self {
		Inline::Text { text: text.into() }
	}

	pub fn mention(item: ContextItem) -> Self {
		Inline::Mention(MentionNode::new(item))
	}

	pub fn initial_mention(item: ContextItem) -> Self {
		Inline::Mention(MentionNode {
			item,
			is_from_initial_context: true,
		})
	}

	/// Length in position units: text counts characters, a mention is one
	/// unit.
	pub fn len(&self) -> CharLen {
		match self {
			Inline::Text { text } => text.chars().count(),
			Inline::Mention(_) => 1,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// An immutable-by-convention sequence of inline nodes.
///
/// Adjacent text runs are kept merged and empty runs dropped, so equal
/// content always has equal node structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	inlines: Vec<Inline>,
}

impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a document from inline nodes, normalizing text runs.
	pub fn from_inlines(inlines: impl IntoIterator<Item = Inline>) -> Self {
		let mut doc = Self::new();
		for inline in inlines {
			push_merged(&mut doc.inlines, inline);
		}
		doc
	}

	pub fn from_text(text: impl Into<String>) -> Self {
		Self::from_inlines([Inline::text(text)])
	}

	pub fn inlines(&self) -> &[Inline] {
		&self.inlines
	}

	pub fn len(&self) -> CharLen {
		self.inlines.iter().map(Inline::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.inlines.is_empty()
	}

	/// Every mention node with its position, in document order.
	pub fn mentions(&self) -> impl Iterator<Item = (CharIdx, &MentionNode)> {
		let mut pos = 0;
		self.inlines.iter().filter_map(move |inline| {
			let start = pos;
			pos += inline.len();
			match inline {
				Inline::Mention(node) => Some((start, node)),
				Inline::Text { .. } => None,
			}
		})
	}

	/// The full rendered text, mentions shown as their display text.
	pub fn text(&self) -> String {
		self.text_between(0, self.len())
	}

	/// Renders the content of `[from, to)`. A mention is included when its
	/// position unit lies inside the range.
	///
	/// # Panics
	///
	/// Panics if the range is out of bounds or inverted.
	pub fn text_between(&self, from: CharIdx, to: CharIdx) -> String {
		let len = self.len();
		assert!(from <= to && to <= len, "range {from}..{to} out of bounds (len {len})");

		let mut out = String::new();
		let mut pos = 0;
		for inline in &self.inlines {
			let start = pos;
			let end = pos + inline.len();
			pos = end;
			if end <= from {
				continue;
			}
			if start >= to {
				break;
			}
			match inline {
				Inline::Text { text } => {
					let skip = from.saturating_sub(start);
					let take = to.min(end) - start - skip;
					out.extend(text.chars().skip(skip).take(take));
				}
				Inline::Mention(node) => out.push_str(&node.display_text()),
			}
		}
		out
	}

	/// The first rendered character at `pos`, if any.
	pub fn char_at(&self, pos: CharIdx) -> Option<char> {
		let mut start = 0;
		for inline in &self.inlines {
			let end = start + inline.len();
			if pos < end {
				return match inline {
					Inline::Text { text } => text.chars().nth(pos - start),
					Inline::Mention(node) => node.display_text().chars().next(),
				};
			}
			start = end;
		}
		None
	}

	/// Replaces `[from, to)` with the given nodes.
	///
	/// # Panics
	///
	/// Panics if the range is out of bounds or inverted.
	pub(crate) fn splice(&mut self, from: CharIdx, to: CharIdx, replacement: Vec<Inline>) {
		let len = self.len();
		assert!(from <= to && to <= len, "splice {from}..{to} out of bounds (len {len})");

		let mut prefix: Vec<Inline> = Vec::new();
		let mut suffix: Vec<Inline> = Vec::new();
		let mut pos = 0;
		for inline in self.inlines.drain(..) {
			let start = pos;
			let end = pos + inline.len();
			pos = end;
			if end <= from {
				push_merged(&mut prefix, inline);
			} else if start >= to {
				push_merged(&mut suffix, inline);
			} else if let Inline::Text { text } = inline {
				// A text run straddling the range keeps its ends.
				if start < from {
					push_merged(&mut prefix, Inline::text(take_chars(&text, from - start)));
				}
				if end > to {
					push_merged(&mut suffix, Inline::text(skip_chars(&text, to - start)));
				}
			}
			// A mention overlapping the range is dropped as a unit.
		}

		for inline in replacement.into_iter().chain(suffix) {
			push_merged(&mut prefix, inline);
		}
		self.inlines = prefix;
	}
}

fn push_merged(out: &mut Vec<Inline>, inline: Inline) {
	if inline.is_empty() {
		return;
	}
	if let (Some(Inline::Text { text: last }), Inline::Text { text }) = (out.last_mut(), &inline) {
		last.push_str(text);
		return;
	}
	out.push(inline);
}

fn take_chars(s: &str, n: usize) -> String {
	s.chars().take(n).collect()
}

fn skip_chars(s: &str, n: usize) -> String {
	s.chars().skip(n).collect()
}

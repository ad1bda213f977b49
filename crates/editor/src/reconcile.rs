//! Pure transaction builders that reconcile document mentions.
//!
//! Everything here computes edits without performing them: each function
//! takes the current document and returns a [`Transaction`] for the facade
//! to dispatch. Positions captured during the document walk are remapped
//! through the transaction as it grows, so later deletions and replacements
//! stay correct despite earlier ones shifting content.

use quill_context::{ContextItem, MentionOperations, diff, diff_upsert};
use quill_document::{Bias, CharIdx, Document, Inline, Selection, Transaction};

/// Where created mentions are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionPosition {
	/// At the start of the document.
	Before,
	/// At the end of the document, after a whitespace separator.
	After,
}

/// All mention payloads in document order.
pub fn get_mentions(doc: &Document) -> Vec<ContextItem> {
	doc.mentions().map(|(_, node)| node.item.clone()).collect()
}

/// Returns true when the rendered text before `pos` is empty or ends in
/// whitespace.
fn ends_in_whitespace(doc: &Document, pos: CharIdx) -> bool {
	pos == 0 || doc.char_at(pos - 1).is_some_and(|c| c.is_whitespace())
}

/// Inserts a single space at `pos` unless the content before it already
/// ends in whitespace. Returns the position just after the (possibly
/// pre-existing) boundary.
fn insert_whitespace_if_needed(tr: &mut Transaction, pos: CharIdx) -> CharIdx {
	if ends_in_whitespace(tr.doc(), pos) {
		pos
	} else {
		tr.insert_text(pos, " ");
		pos + 1
	}
}

/// Moves to the end of the document and appends `text`, separated by
/// exactly one space when the document does not already end in whitespace.
pub fn append_text(doc: &Document, text: &str) -> Transaction {
	let mut tr = Transaction::new(doc);
	let end = tr.doc().len();
	let pos = insert_whitespace_if_needed(&mut tr, end);
	tr.insert_text(pos, text);
	let selection = Selection::at_end(tr.doc());
	tr.set_selection(selection);
	tr
}

/// Applies a computed operation set: existing mentions are deleted or
/// replaced in document order, then created mentions are inserted at the
/// requested position, each followed by `separator`.
pub fn apply_mention_ops(
	doc: &Document,
	ops: &MentionOperations,
	position: MentionPosition,
	separator: &str,
) -> Transaction {
	let mut tr = Transaction::new(doc);

	if !ops.modify.is_empty() || !ops.delete.is_empty() {
		for (pos, node) in doc.mentions() {
			let key = node.item.identity();
			let from = tr.mapping().map(pos, Bias::Right);
			if ops.delete.contains(&key) {
				tr.delete(from, from + 1);
			} else if let Some(new_item) = ops.modify.get(&key) {
				// Replacement rather than attribute mutation: the node's
				// visible text has to change with the payload.
				tr.replace_with(from, from + 1, Inline::mention(new_item.clone()));
			}
		}
	}

	if !ops.create.is_empty() {
		let mut nodes = Vec::with_capacity(ops.create.len() * 2);
		for item in &ops.create {
			nodes.push(Inline::mention(item.clone()));
			nodes.push(Inline::text(separator));
		}
		match position {
			MentionPosition::Before => {
				tr.insert(0, nodes);
			}
			MentionPosition::After => {
				let end = tr.doc().len();
				let end = insert_whitespace_if_needed(&mut tr, end);
				tr.insert(end, nodes);
			}
		}
	}

	tr
}

/// Adds mentions to the document, merging or replacing overlapping ones.
pub fn add_mentions(
	doc: &Document,
	items: &[ContextItem],
	position: MentionPosition,
	separator: &str,
) -> Transaction {
	let ops = diff(&get_mentions(doc), items);
	if ops.is_empty() {
		tracing::debug!("mentions.add: nothing to do");
		return Transaction::new(doc);
	}
	apply_mention_ops(doc, &ops, position, separator)
}

/// Adds or refreshes mentions without ever deleting existing ones.
pub fn upsert_mentions(
	doc: &Document,
	items: &[ContextItem],
	position: MentionPosition,
	separator: &str,
) -> Transaction {
	let ops = diff_upsert(&get_mentions(doc), items);
	if ops.is_empty() {
		return Transaction::new(doc);
	}
	apply_mention_ops(doc, &ops, position, separator)
}

/// Removes every mention whose payload fails the predicate, leaving
/// surrounding text untouched.
pub fn filter_mentions(doc: &Document, predicate: impl Fn(&ContextItem) -> bool) -> Transaction {
	let mut tr = Transaction::new(doc);
	for (pos, node) in doc.mentions() {
		if !predicate(&node.item) {
			let from = tr.mapping().map(pos, Bias::Right);
			tr.delete(from, from + 1);
		}
	}
	tr
}

/// Returns true when the document consists solely of initial-context
/// mentions and whitespace.
pub fn is_only_initial_context(doc: &Document) -> bool {
	doc.inlines().iter().all(|inline| match inline {
		Inline::Mention(node) => node.is_from_initial_context,
		Inline::Text { text } => text.trim().is_empty(),
	})
}

/// Replaces the document with host-supplied initial mentions, each tagged
/// as initial context and followed by a space.
///
/// Returns `None` when the document already holds anything besides initial
/// mentions: initial context loads asynchronously and must never clobber
/// what the user typed in the meantime. While the content is still only
/// initial mentions (or empty), repeated calls keep replacing it.
pub fn set_initial_mentions(doc: &Document, items: &[ContextItem]) -> Option<Transaction> {
	if !is_only_initial_context(doc) {
		return None;
	}
	let mut tr = Transaction::new(doc);
	tr.delete(0, doc.len());
	let mut nodes = Vec::with_capacity(items.len() * 2);
	for item in items {
		nodes.push(Inline::initial_mention(item.clone()));
		nodes.push(Inline::text(" "));
	}
	tr.insert(0, nodes);
	let selection = Selection::at_end(tr.doc());
	tr.set_selection(selection);
	Some(tr)
}

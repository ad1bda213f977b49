//! Mention reconciliation: diffing a desired mention list against existing
//! mentions.
//!
//! [`diff`] never touches mentions the caller did not ask about; it only
//! resolves conflicts between added items and existing items that point at
//! the same entity. Overlapping ranges are merged, subsumed mentions are
//! replaced, and exact duplicates are dropped.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::item::{ContextItem, EntityKey, IdentityKey, RangeData};

/// The node mutations needed to reconcile a document's mentions with a list
/// of added items.
#[derive(Debug, Clone, Default)]
pub struct MentionOperations {
	/// Items to insert as new mention nodes, in the order they were
	/// requested.
	pub create: Vec<ContextItem>,
	/// Replacement payloads keyed by the identity of the node they replace.
	pub modify: FxHashMap<IdentityKey, ContextItem>,
	/// Identities of mention nodes to remove.
	pub delete: FxHashSet<IdentityKey>,
}

impl MentionOperations {
	/// Returns true if applying these operations would change nothing.
	pub fn is_empty(&self) -> bool {
		self.create.is_empty() && self.modify.is_empty() && self.delete.is_empty()
	}
}

/// Computes the operations needed to add `desired` to `existing`.
///
/// Per added item:
/// - no existing mention of the same entity: create it;
/// - an existing mention already covers its range: nothing to do;
/// - it overlaps existing mentions: the first overlapping mention is
///   modified to the merged range (sizes summed), any further overlapping
///   ones are deleted;
/// - it subsumes everything it overlaps: the overlapped mentions are
///   deleted and the item is created at the insertion position instead.
///
/// Existing mentions whose entity never appears in `desired` are left
/// untouched; this is an additive reconciliation, not a set replacement.
pub fn diff(existing: &[ContextItem], desired: &[ContextItem]) -> MentionOperations {
	diff_with(existing, desired, DiffMode::Replace)
}

/// Like [`diff`], but never deletes: conflicting mentions are modified in
/// place with the incoming payload. Used when a caller refreshes mentions it
/// knows about without discarding anything else in the document.
pub fn diff_upsert(existing: &[ContextItem], desired: &[ContextItem]) -> MentionOperations {
	diff_with(existing, desired, DiffMode::Upsert)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffMode {
	Replace,
	Upsert,
}

fn diff_with(existing: &[ContextItem], desired: &[ContextItem], mode: DiffMode) -> MentionOperations {
	let mut ops = MentionOperations::default();

	let mut by_entity: FxHashMap<EntityKey, Vec<&ContextItem>> = FxHashMap::default();
	for item in existing {
		by_entity.entry(item.entity()).or_default().push(item);
	}

	for item in desired {
		let Some(candidates) = by_entity.get(&item.entity()) else {
			ops.create.push(item.clone());
			continue;
		};

		if mode == DiffMode::Upsert {
			upsert_one(&mut ops, candidates, item);
			continue;
		}

		// Already covered by an existing mention of the same entity.
		if candidates.iter().any(|e| covers(e.range, item.range)) {
			continue;
		}

		let overlapping: Vec<&ContextItem> = candidates
			.iter()
			.filter(|e| overlaps(e.range, item.range))
			.copied()
			.collect();
		if overlapping.is_empty() {
			ops.create.push(item.clone());
			continue;
		}

		let mut merged_range = item.range;
		let mut merged_size = item.size;
		for e in &overlapping {
			merged_range = union(merged_range, e.range);
			merged_size = sum_sizes(merged_size, e.size);
		}

		if merged_range == item.range {
			// The added item subsumes every mention it overlaps: replace
			// them with the item as requested.
			for e in &overlapping {
				ops.delete.insert(e.identity());
			}
			ops.create.push(item.clone());
		} else {
			let mut merged = item.clone();
			merged.range = merged_range;
			merged.size = merged_size;
			ops.modify.insert(overlapping[0].identity(), merged);
			for e in &overlapping[1..] {
				ops.delete.insert(e.identity());
			}
		}
	}

	ops
}

fn upsert_one(ops: &mut MentionOperations, candidates: &[&ContextItem], item: &ContextItem) {
	// Identical payload already present.
	if candidates.iter().any(|e| *e == item) {
		return;
	}
	// Refresh the first related mention in place; the caller's payload is
	// authoritative here.
	if let Some(related) = candidates.iter().find(|e| overlaps(e.range, item.range)) {
		ops.modify.insert(related.identity(), item.clone());
	} else {
		ops.create.push(item.clone());
	}
}

/// `None` means the whole file, which covers any range.
fn covers(existing: Option<RangeData>, added: Option<RangeData>) -> bool {
	match (existing, added) {
		(None, _) => true,
		(Some(_), None) => false,
		(Some(a), Some(b)) => a.contains(&b),
	}
}

fn overlaps(a: Option<RangeData>, b: Option<RangeData>) -> bool {
	match (a, b) {
		(None, _) | (_, None) => true,
		(Some(a), Some(b)) => a.overlaps(&b),
	}
}

fn union(a: Option<RangeData>, b: Option<RangeData>) -> Option<RangeData> {
	match (a, b) {
		(Some(a), Some(b)) => Some(a.union(&b)),
		_ => None,
	}
}

fn sum_sizes(a: Option<u64>, b: Option<u64>) -> Option<u64> {
	match (a, b) {
		(Some(a), Some(b)) => Some(a + b),
		(a, None) => a,
		(None, b) => b,
	}
}

#[cfg(test)]
mod tests;

use proptest::prelude::*;

use super::*;
use crate::item::{ContextItemSource, Point};

fn user_file(uri: &str) -> ContextItem {
	ContextItem::file(uri).with_source(ContextItemSource::User)
}

fn user_file_range(uri: &str, start: u32, end: u32) -> ContextItem {
	ContextItem::file_range(uri, start, end).with_source(ContextItemSource::User)
}

#[test]
fn creates_only_unknown_uris() {
	let existing = [user_file("file1.ts"), user_file("file2.ts")];
	let to_add = [user_file("file2.ts"), user_file("file3.ts")];

	let ops = diff(&existing, &to_add);
	assert_eq!(ops.create, vec![user_file("file3.ts")]);
	assert!(ops.modify.is_empty());
	assert!(ops.delete.is_empty());
}

#[test]
fn empty_existing_creates_everything() {
	let to_add = [user_file("file1.ts"), user_file("file2.ts")];
	let ops = diff(&[], &to_add);
	assert_eq!(ops.create, to_add.to_vec());
	assert!(ops.modify.is_empty());
	assert!(ops.delete.is_empty());
}

#[test]
fn empty_to_add_is_a_noop() {
	let existing = [user_file("file1.ts"), user_file("file2.ts")];
	assert!(diff(&existing, &[]).is_empty());
}

#[test]
fn duplicate_uris_in_to_add_are_absorbed() {
	let existing = [user_file("file1.ts")];
	let to_add = [user_file("file1.ts"), user_file("file1.ts")];
	assert!(diff(&existing, &to_add).is_empty());
}

#[test]
fn adding_the_same_item_twice_is_a_noop() {
	let existing = user_file_range("file1.ts", 0, 10);
	assert!(diff(&[existing.clone()], &[existing]).is_empty());
}

#[test]
fn subsuming_item_deletes_and_creates() {
	let existing = user_file_range("file1.ts", 6, 10);
	let update = user_file_range("file1.ts", 0, 15);

	let ops = diff(std::slice::from_ref(&existing), std::slice::from_ref(&update));
	assert!(ops.delete.contains(&existing.identity()));
	assert_eq!(ops.create, vec![update]);
	assert!(ops.modify.is_empty());
}

#[test]
fn submention_of_existing_item_is_a_noop() {
	let existing = user_file_range("file1.ts", 0, 10);
	let update = user_file_range("file1.ts", 0, 5);
	assert!(diff(&[existing], &[update]).is_empty());
}

#[test]
fn whole_file_mention_covers_every_range() {
	let existing = user_file("file1.ts");
	let update = user_file_range("file1.ts", 3, 9);
	assert!(diff(&[existing], &[update]).is_empty());
}

#[test]
fn overlapping_ranges_merge_into_modify() {
	let existing = user_file_range("a.ts", 0, 10);
	let update = user_file_range("a.ts", 5, 15);

	let ops = diff(std::slice::from_ref(&existing), std::slice::from_ref(&update));
	assert_eq!(
		ops.modify.get(&existing.identity()),
		Some(&user_file_range("a.ts", 0, 15))
	);
	assert_eq!(ops.modify.len(), 1);
	assert!(ops.create.is_empty());
	assert!(ops.delete.is_empty());
}

#[test]
fn merge_sums_sizes() {
	let a = user_file_range("a.ts", 0, 10).with_size(10);
	let b = user_file_range("b.ts", 0, 5).with_size(15);
	let updates = [
		user_file_range("a.ts", 5, 15).with_size(11),
		user_file_range("b.ts", 3, 8).with_size(5),
	];

	let ops = diff(&[a.clone(), b.clone()], &updates);
	assert_eq!(
		ops.modify.get(&a.identity()),
		Some(&user_file_range("a.ts", 0, 15).with_size(21))
	);
	assert_eq!(
		ops.modify.get(&b.identity()),
		Some(&user_file_range("b.ts", 0, 8).with_size(20))
	);
	assert!(ops.create.is_empty());
	assert!(ops.delete.is_empty());
}

#[test]
fn character_level_overlaps() {
	let mk = |uri: &str, start: Point, end: Point, size: u64| ContextItem {
		range: Some(RangeData::new(start, end)),
		..user_file(uri).with_size(size)
	};

	let a = mk("a.ts", Point::new(1, 2), Point::new(10, 15), 10);
	let b = mk("b.ts", Point::new(1, 7), Point::new(8, 9), 15);
	let c = mk("c.ts", Point::new(1, 10), Point::new(10, 15), 11);

	let updates = [
		// Completely contained within the existing range.
		mk("a.ts", Point::new(1, 29), Point::new(10, 4), 10),
		// Overlaps, should merge.
		mk("b.ts", Point::new(3, 0), Point::new(8, 26), 11),
		// Completely distinct, should be created.
		mk("c.ts", Point::new(10, 16), Point::new(30, 1), 13),
	];

	let ops = diff(&[a, b.clone(), c], &updates);
	assert_eq!(
		ops.modify.get(&b.identity()),
		Some(&mk("b.ts", Point::new(1, 7), Point::new(8, 26), 26))
	);
	assert_eq!(ops.modify.len(), 1);
	assert!(ops.delete.is_empty());
	assert_eq!(ops.create, vec![updates[2].clone()]);
}

#[test]
fn different_sources_do_not_merge() {
	let existing = ContextItem::file("a.ts").with_source(ContextItemSource::Editor);
	let update = ContextItem::file("a.ts").with_source(ContextItemSource::User);

	let ops = diff(&[existing], std::slice::from_ref(&update));
	assert_eq!(ops.create, vec![update]);
	assert!(ops.modify.is_empty());
	assert!(ops.delete.is_empty());
}

#[test]
fn upsert_never_deletes() {
	let existing = user_file_range("file1.ts", 6, 10);
	let update = user_file_range("file1.ts", 0, 15);

	let ops = diff_upsert(std::slice::from_ref(&existing), std::slice::from_ref(&update));
	assert!(ops.delete.is_empty());
	assert_eq!(ops.modify.get(&existing.identity()), Some(&update));
	assert!(ops.create.is_empty());
}

#[test]
fn upsert_refreshes_payload_in_place() {
	let existing = user_file_range("file1.ts", 0, 10);
	let update = user_file_range("file1.ts", 0, 10).with_title("renamed");

	let ops = diff_upsert(std::slice::from_ref(&existing), std::slice::from_ref(&update));
	assert_eq!(ops.modify.get(&existing.identity()), Some(&update));
	assert!(ops.create.is_empty());
	assert!(ops.delete.is_empty());
}

#[test]
fn upsert_creates_disjoint_ranges() {
	let existing = user_file_range("file1.ts", 0, 5);
	let update = user_file_range("file1.ts", 20, 30);

	let ops = diff_upsert(&[existing], std::slice::from_ref(&update));
	assert_eq!(ops.create, vec![update]);
	assert!(ops.modify.is_empty());
}

fn arb_item() -> impl Strategy<Value = ContextItem> {
	let range = (0u32..12, 0u32..12, 0u32..24).prop_map(|(a, b, c)| {
		let (start, end) = if a <= b { (a, b) } else { (b, a) };
		RangeData::new(Point::new(start, 0), Point::new(end, c))
	});
	(
		0u8..4,
		proptest::option::of(range),
		proptest::option::of(0u64..100),
	)
		.prop_map(|(uri, range, size)| ContextItem {
			range,
			size,
			..ContextItem::file(format!("file{uri}.ts")).with_source(ContextItemSource::User)
		})
}

proptest! {
	/// diff(X, X) must be empty for any mention list X.
	#[test]
	fn diff_is_idempotent(items in proptest::collection::vec(arb_item(), 0..8)) {
		prop_assert!(diff(&items, &items).is_empty());
		prop_assert!(diff_upsert(&items, &items).is_empty());
	}

	/// Adding to an empty document creates everything in order.
	#[test]
	fn diff_against_empty_creates_in_order(items in proptest::collection::vec(arb_item(), 0..8)) {
		let ops = diff(&[], &items);
		prop_assert_eq!(ops.create, items);
		prop_assert!(ops.modify.is_empty());
		prop_assert!(ops.delete.is_empty());
	}
}

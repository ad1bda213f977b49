//! Context item payloads and identity.

use serde::{Deserialize, Serialize};

/// Discriminates what kind of entity a [`ContextItem`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextItemKind {
	/// A file, optionally restricted to a line range.
	File,
	/// A single symbol within a file.
	Symbol,
	/// A whole repository.
	Repository,
	/// A directory tree.
	Tree,
	/// An item backed by an OpenCtx provider.
	OpenCtx,
}

/// Where a context item originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextItemSource {
	/// Explicitly added by the user.
	User,
	/// Derived from the editor state (open file, selection).
	Editor,
	/// Produced by a search backend.
	Search,
	/// Pre-populated by the host before the user typed anything.
	Initial,
}

/// A zero-based line/character position.
///
/// Ordering is line-major, which is what range containment and merging rely
/// on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
	pub line: u32,
	pub character: u32,
}

impl Point {
	pub fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}
}

/// A start/end pair of [`Point`]s selecting part of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeData {
	pub start: Point,
	pub end: Point,
}

impl RangeData {
	pub fn new(start: Point, end: Point) -> Self {
		Self { start, end }
	}

	/// A range covering whole lines, characters pinned to column zero.
	pub fn lines(start: u32, end: u32) -> Self {
		Self::new(Point::new(start, 0), Point::new(end, 0))
	}

	/// Returns true if `other` lies entirely within this range.
	pub fn contains(&self, other: &RangeData) -> bool {
		self.start <= other.start && other.end <= self.end
	}

	/// Returns true if the two ranges share at least one position.
	pub fn overlaps(&self, other: &RangeData) -> bool {
		self.start <= other.end && other.start <= self.end
	}

	/// The smallest range covering both inputs.
	pub fn union(&self, other: &RangeData) -> RangeData {
		RangeData {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}
}

/// An opaque, serializable payload identifying a mentionable entity.
///
/// Two items refer to the same *entity* when their [`EntityKey`]s match; they
/// are the same *mention* when their [`IdentityKey`]s (entity plus range)
/// match. Reconciliation joins on these keys, never on full payload
/// equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
	#[serde(rename = "type")]
	pub kind: ContextItemKind,
	pub uri: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub range: Option<RangeData>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, rename = "symbolName", skip_serializing_if = "Option::is_none")]
	pub symbol_name: Option<String>,
	#[serde(default, rename = "providerUri", skip_serializing_if = "Option::is_none")]
	pub provider_uri: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<ContextItemSource>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<u64>,
	/// Provider-specific fields carried along verbatim.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<serde_json::Value>,
}

impl ContextItem {
	/// A whole-file item with no range.
	pub fn file(uri: impl Into<String>) -> Self {
		Self {
			kind: ContextItemKind::File,
			uri: uri.into(),
			range: None,
			title: None,
			symbol_name: None,
			provider_uri: None,
			source: None,
			size: None,
			data: None,
		}
	}

	/// A file item restricted to the given zero-based line range.
	pub fn file_range(uri: impl Into<String>, start: u32, end: u32) -> Self {
		Self {
			range: Some(RangeData::lines(start, end)),
			..Self::file(uri)
		}
	}

	/// A symbol item.
	pub fn symbol(uri: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			kind: ContextItemKind::Symbol,
			symbol_name: Some(name.into()),
			..Self::file(uri)
		}
	}

	pub fn with_source(mut self, source: ContextItemSource) -> Self {
		self.source = Some(source);
		self
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn with_size(mut self, size: u64) -> Self {
		self.size = Some(size);
		self
	}

	/// The key deciding whether two payloads are the same mention.
	pub fn identity(&self) -> IdentityKey {
		IdentityKey {
			entity: self.entity(),
			range: self.range,
		}
	}

	/// The key grouping payloads that point at the same underlying entity,
	/// ignoring ranges.
	pub fn entity(&self) -> EntityKey {
		EntityKey {
			kind: self.kind,
			uri: self.uri.clone(),
			provider_uri: self.provider_uri.clone(),
			source: self.source,
		}
	}

	/// The text a mention of this item renders as.
	///
	/// Files and trees show their basename, symbols their name; a line range
	/// is appended as `:2` or `:2-5` (one-based). An end character of zero
	/// means the range stops at the end of the previous line, so that line is
	/// not counted.
	pub fn display_text(&self) -> String {
		if self.kind == ContextItemKind::Symbol {
			return self
				.title
				.clone()
				.or_else(|| self.symbol_name.clone())
				.unwrap_or_else(|| basename(&self.uri).to_owned());
		}

		let mut text = self
			.title
			.clone()
			.unwrap_or_else(|| basename(&self.uri).to_owned());
		if let Some(range) = &self.range {
			let start = range.start.line + 1;
			let end = if range.end.character == 0 {
				range.end.line
			} else {
				range.end.line + 1
			};
			text.push_str(&format!(":{start}"));
			if end > start {
				text.push_str(&format!("-{end}"));
			}
		}
		text
	}
}

/// Groups items referring to the same entity: `(kind, uri, provider, source)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
	pub kind: ContextItemKind,
	pub uri: String,
	pub provider_uri: Option<String>,
	pub source: Option<ContextItemSource>,
}

/// The reconciliation join key: an [`EntityKey`] plus the exact range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
	pub entity: EntityKey,
	pub range: Option<RangeData>,
}

fn basename(uri: &str) -> &str {
	uri.trim_end_matches('/')
		.rsplit('/')
		.next()
		.filter(|s| !s.is_empty())
		.unwrap_or(uri)
}

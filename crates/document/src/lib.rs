//! Minimal prompt document kernel.
//!
//! A [`Document`] is a flat sequence of inline nodes: text runs and atomic
//! mention nodes. A [`Transaction`] applies edits eagerly to a private copy
//! of the document while recording every step as a position rewrite, so
//! anything that holds document positions (selections, decorations) can be
//! carried across the edit via [`Mapping::map`].
//!
//! # Coordinates
//!
//! Positions count characters of text runs; an atomic mention occupies
//! exactly one position unit regardless of its rendered width. Because atoms
//! are single units, every integer position is a valid node boundary and a
//! range either contains an atom entirely or not at all.

pub mod decoration;
pub mod node;
pub mod selection;
pub mod transaction;

/// A position in the document, measured in position units (see module docs).
pub type CharIdx = usize;

/// A length in position units.
pub type CharLen = usize;

pub use decoration::{Decoration, DecorationSet};
pub use node::{Document, Inline, MentionNode};
pub use selection::Selection;
pub use transaction::{Bias, Mapping, Rewrite, Transaction};

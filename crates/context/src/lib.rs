//! Context item payloads and reconciliation primitives.
//!
//! A [`ContextItem`] is the serializable payload behind a mention: a pointer
//! at a file, symbol, repository, or provider-backed entity. This crate owns
//! the identity rules that decide when two payloads refer to the same thing,
//! and the pure [`ops::diff`] computation that turns "the mentions I have"
//! plus "the mentions I want" into a minimal set of create/modify/delete
//! operations.
//!
//! Nothing in this crate touches a document; it is plain data so that both
//! the editor engine and host-side callers can share it.

pub mod item;
pub mod ops;

pub use item::{ContextItem, ContextItemKind, ContextItemSource, EntityKey, IdentityKey, Point, RangeData};
pub use ops::{MentionOperations, diff, diff_upsert};

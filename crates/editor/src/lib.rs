#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Prompt editor engine: @-mention tracking, suggestions, reconciliation.
//!
//! This crate binds three cooperating pieces on top of the
//! [`quill_document`] kernel:
//!
//! - [`trigger`] - detects the trigger character and tracks the in-progress
//!   mention span across edits.
//! - [`menu`] + [`loader`] - a pure suggestion state machine plus the async
//!   driver that debounces and cancels fetches against the injected
//!   [`MenuDataSource`].
//! - [`reconcile`] - pure transaction builders that diff a desired mention
//!   list against the document and produce minimal edits.
//!
//! [`PromptEditor`] is the facade wiring all of it to one document and one
//! host. The editing surface is single-threaded: every dispatch runs to
//! completion before the next input event, and the only concurrency is the
//! suggestion fetch, which communicates exclusively by posting events back
//! to the facade.

pub mod editor;
pub mod loader;
pub mod menu;
pub mod reconcile;
pub mod state;
pub mod trigger;

pub use editor::{PromptEditor, PromptEditorOptions};
pub use loader::{FetchError, MenuDataSource};
pub use menu::{Effect, LoadPhase, MenuEvent, MenuNotification, MenuPhase, MenuState};
pub use reconcile::MentionPosition;
pub use state::{Dispatch, EditorState};
pub use trigger::{TriggerConfig, TriggerEvent, TriggerState};

//! Async fetch driver with debounce and cancellation.
//!
//! One logical fetch is current at a time. Triggering a new fetch bumps a
//! generation counter and cancels the previous task's token; a cancelled
//! task never posts events, and events from superseded generations are
//! dropped before they reach the state machine. Cancellation is advisory:
//! the underlying source call is not forcibly aborted, its result is simply
//! discarded at the next await point.

use std::sync::Arc;
use std::time::Duration;

use quill_context::ContextItem;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Error surfaced by a [`MenuDataSource`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
	message: String,
}

impl FetchError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

impl From<anyhow::Error> for FetchError {
	fn from(err: anyhow::Error) -> Self {
		Self {
			message: format!("{err:#}"),
		}
	}
}

/// Resolves a filter string to ranked candidate items.
///
/// Injected by the embedding application; the engine never implements data
/// access itself.
#[async_trait::async_trait]
pub trait MenuDataSource: Send + Sync {
	async fn fetch(&self, query: &str) -> Result<Vec<ContextItem>, FetchError>;
}

/// Loader-to-machine events, tagged with the generation that produced them.
#[derive(Debug, Clone)]
pub(crate) enum LoaderEvent {
	Started {
		generation: u64,
		query: String,
	},
	Resolved {
		generation: u64,
		query: String,
		items: Vec<ContextItem>,
	},
	Failed {
		generation: u64,
		query: String,
		error: String,
	},
}

impl LoaderEvent {
	pub(crate) fn generation(&self) -> u64 {
		match self {
			LoaderEvent::Started { generation, .. }
			| LoaderEvent::Resolved { generation, .. }
			| LoaderEvent::Failed { generation, .. } => *generation,
		}
	}
}

/// Owns the single in-flight suggestion fetch.
pub(crate) struct FetchController {
	generation: u64,
	in_flight: Option<CancellationToken>,
	source: Arc<dyn MenuDataSource>,
	events: UnboundedSender<LoaderEvent>,
}

impl FetchController {
	pub fn new(source: Arc<dyn MenuDataSource>, events: UnboundedSender<LoaderEvent>) -> Self {
		Self {
			generation: 0,
			in_flight: None,
			source,
			events,
		}
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn cancel(&mut self) {
		if let Some(token) = self.in_flight.take() {
			token.cancel();
		}
	}

	/// Starts a fetch for `query` after `debounce`, superseding any
	/// previous one.
	pub fn trigger(&mut self, query: String, debounce: Duration) {
		self.generation = self.generation.wrapping_add(1);
		let generation = self.generation;
		self.cancel();

		let cancel = CancellationToken::new();
		self.in_flight = Some(cancel.clone());
		let source = Arc::clone(&self.source);
		let events = self.events.clone();
		tracing::debug!(
			generation,
			query = %query,
			debounce_ms = debounce.as_millis() as u64,
			"menu.fetch"
		);

		tokio::spawn(async move {
			if debounce > Duration::ZERO {
				tokio::select! {
					_ = cancel.cancelled() => return,
					_ = sleep(debounce) => {}
				}
			} else if cancel.is_cancelled() {
				return;
			}

			let _ = events.send(LoaderEvent::Started {
				generation,
				query: query.clone(),
			});

			let result = source.fetch(&query).await;
			if cancel.is_cancelled() {
				return;
			}

			match result {
				Ok(items) => {
					let _ = events.send(LoaderEvent::Resolved {
						generation,
						query,
						items,
					});
				}
				Err(err) => {
					tracing::warn!(generation, query = %query, error = %err, "menu.fetch failed");
					let _ = events.send(LoaderEvent::Failed {
						generation,
						query,
						error: err.to_string(),
					});
				}
			}
		});
	}
}

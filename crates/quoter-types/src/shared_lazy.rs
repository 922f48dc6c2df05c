//! At-most-once shared asynchronous value.
//!
//! When N concurrent source adapters each need the same expensive lookup
//! (token metadata, gas price) within one aggregation call, they all hold a
//! reference to the same `SharedLazyValue`. The first `get()` claims the
//! factory and runs it; everyone else waits on the same outcome. The claim
//! is atomic (single-initialization cell), never check-then-run.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

type Factory<T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send>>;

/// Failure of a shared lookup, observed identically by every caller.
#[derive(Debug, Clone, Error)]
#[error("shared lookup failed: {message}")]
pub struct SharedValueError {
	message: Arc<str>,
}

impl SharedValueError {
	pub fn message(&self) -> &str {
		&self.message
	}
}

/// Single-assignment, at-most-once-computed asynchronous value.
///
/// Created per top-level aggregation call and shared by reference with every
/// participating source; never cached across calls.
pub struct SharedLazyValue<T> {
	cell: OnceCell<Result<T, SharedValueError>>,
	factory: Mutex<Option<Factory<T>>>,
}

impl<T: Clone + Send + Sync> SharedLazyValue<T> {
	pub fn new<F, Fut>(factory: F) -> Self
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
	{
		Self {
			cell: OnceCell::new(),
			factory: Mutex::new(Some(Box::pin(factory()))),
		}
	}

	/// Returns the shared value, triggering the factory if this is the first
	/// caller. Every caller, including ones arriving after resolution,
	/// observes the same resolved value or the same failure.
	pub async fn get(&self) -> Result<T, SharedValueError> {
		self.cell
			.get_or_init(|| async {
				// The cell guarantees this initializer runs at most once, so
				// the parked factory future is always still present here.
				match self.factory.lock().await.take() {
					Some(factory) => factory.await.map_err(|e| SharedValueError {
						message: format!("{e:#}").into(),
					}),
					None => Err(SharedValueError {
						message: "factory already consumed".into(),
					}),
				}
			})
			.await
			.clone()
	}

	/// Whether a terminal outcome has been reached.
	pub fn is_settled(&self) -> bool {
		self.cell.initialized()
	}
}

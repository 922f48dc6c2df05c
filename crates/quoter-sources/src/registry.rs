//! Built-in source registry.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::implementations::changelly::ChangellySource;
use crate::implementations::zero_ex::ZeroExSource;
use crate::QuoteSource;

/// Catalog of the built-in quote source adapters, keyed by source id.
///
/// Built once at startup; adapters are stateless and shared.
pub struct SourceRegistry {
	sources: HashMap<&'static str, Arc<dyn QuoteSource>>,
}

impl SourceRegistry {
	/// Create a new registry with the built-in adapters registered.
	pub fn new() -> Self {
		let mut registry = Self::empty();
		registry.register(Arc::new(ChangellySource::new()));
		registry.register(Arc::new(ZeroExSource::new()));
		registry
	}

	/// Create a registry with no adapters registered.
	pub fn empty() -> Self {
		Self { sources: HashMap::new() }
	}

	pub fn register(&mut self, source: Arc<dyn QuoteSource>) {
		debug!("Registering quote source '{}'", source.id());
		self.sources.insert(source.id(), source);
	}

	pub fn get(&self, source_id: &str) -> Option<Arc<dyn QuoteSource>> {
		self.sources.get(source_id).cloned()
	}

	pub fn all(&self) -> impl Iterator<Item = (&'static str, Arc<dyn QuoteSource>)> + '_ {
		self.sources.iter().map(|(id, source)| (*id, Arc::clone(source)))
	}

	pub fn len(&self) -> usize {
		self.sources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}
}

impl Default for SourceRegistry {
	fn default() -> Self {
		Self::new()
	}
}

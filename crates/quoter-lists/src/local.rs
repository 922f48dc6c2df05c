//! Source list backed by in-process adapters.

use async_trait::async_trait;
use quoter_sources::{
	GlobalSourceConfig, QuoteComponents, QuoteSource, SourceConfig, SourceRegistry,
};
use quoter_transport::FetchService;
use quoter_types::{
	QuoteSourceMetadata, QuoteTransaction, SourceId, SourceQuoteResponse,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{BuildTxRequest, SourceList, SourceListError, SourceListQuoteRequest};

/// Configuration for a local source list.
#[derive(Debug, Clone, Default)]
pub struct LocalSourceListConfig {
	pub global: GlobalSourceConfig,
	/// Custom configuration per source id (API keys, extensions).
	pub per_source: HashMap<SourceId, serde_json::Value>,
}

/// Owns the built-in adapters directly and dispatches to them in-process.
///
/// Adapters whose required configuration is missing or invalid are excluded
/// at construction time, so a deployment missing one provider's API key can
/// still use every other provider.
pub struct LocalSourceList {
	sources: HashMap<SourceId, Arc<dyn QuoteSource>>,
	components: QuoteComponents,
	global_config: GlobalSourceConfig,
	per_source_config: HashMap<SourceId, serde_json::Value>,
}

impl LocalSourceList {
	pub fn new(
		registry: &SourceRegistry,
		config: LocalSourceListConfig,
		fetch: Arc<dyn FetchService>,
	) -> Self {
		let total = registry.len();
		let mut sources: HashMap<SourceId, Arc<dyn QuoteSource>> = HashMap::new();
		for (id, source) in registry.all() {
			if source.is_config_valid(config.per_source.get(id)) {
				sources.insert(id.to_string(), source);
			} else {
				debug!("Excluding source '{}': configuration missing or invalid", id);
			}
		}
		info!(
			"Initialized local source list with {} of {} registered sources",
			sources.len(),
			total
		);

		Self {
			sources,
			components: QuoteComponents { fetch },
			global_config: config.global,
			per_source_config: config.per_source,
		}
	}

	/// Builds a list over the built-in registry.
	pub fn with_defaults(config: LocalSourceListConfig, fetch: Arc<dyn FetchService>) -> Self {
		Self::new(&SourceRegistry::new(), config, fetch)
	}

	fn source(&self, source_id: &str) -> Result<&Arc<dyn QuoteSource>, SourceListError> {
		self.sources
			.get(source_id)
			.ok_or_else(|| SourceListError::UnknownSource(source_id.to_string()))
	}

	fn config_for(&self, source_id: &str, custom: Option<serde_json::Value>) -> SourceConfig {
		SourceConfig {
			global: self.global_config.clone(),
			custom: custom.or_else(|| self.per_source_config.get(source_id).cloned()),
		}
	}
}

#[async_trait]
impl SourceList for LocalSourceList {
	fn sources(&self) -> HashMap<SourceId, QuoteSourceMetadata> {
		self.sources
			.iter()
			.map(|(id, source)| (id.clone(), source.metadata().clone()))
			.collect()
	}

	async fn quote(
		&self,
		source_id: &str,
		request: SourceListQuoteRequest,
	) -> Result<SourceQuoteResponse, SourceListError> {
		let source = self.source(source_id)?;
		let config = self.config_for(source_id, request.custom_config);
		let response = source
			.quote(&self.components, &request.request, &config)
			.await?;
		Ok(response)
	}

	async fn build_tx(
		&self,
		source_id: &str,
		request: BuildTxRequest,
	) -> Result<QuoteTransaction, SourceListError> {
		let source = self.source(source_id)?;
		Ok(source.build_tx(&request.quote))
	}
}

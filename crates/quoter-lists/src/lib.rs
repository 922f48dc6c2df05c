//! Source lists: the composable routing layer of the quoting engine.
//!
//! A `SourceList` provides sources to the orchestrator. Variants: local
//! (owns in-process adapters), api (proxies a remote aggregation endpoint),
//! and overridable (routes a partitioned id space across nested lists).

use async_trait::async_trait;
use quoter_sources::SourceQueryError;
use quoter_types::{
	QuoteSourceMetadata, QuoteTransaction, SourceId, SourceQuoteRequest, SourceQuoteResponse,
};
use std::collections::HashMap;
use thiserror::Error;

pub mod api;
pub mod factory;
pub mod local;
pub mod overridable;

pub use api::{ApiSourceList, ApiSourceListConfig};
pub use factory::{build_source_list, BuildListError, OverrideInput, SourceListInput};
pub use local::{LocalSourceList, LocalSourceListConfig};
pub use overridable::{OverridableListError, OverridableSourceList, OverrideEntry};

#[derive(Debug, Error)]
pub enum SourceListError {
	/// Ids normally originate from this list's own catalog, so hitting this
	/// indicates a routing bug rather than a recoverable condition.
	#[error("unknown source id '{0}'")]
	UnknownSource(SourceId),

	#[error(transparent)]
	Query(#[from] SourceQueryError),

	#[error("remote source list call failed: {0}")]
	Remote(String),
}

/// Quote request routed through a list to one source.
#[derive(Clone)]
pub struct SourceListQuoteRequest {
	pub request: SourceQuoteRequest,
	/// Per-call custom configuration for the target source, taking
	/// precedence over anything configured at list construction.
	pub custom_config: Option<serde_json::Value>,
}

/// Transaction-build request for a previously obtained quote.
#[derive(Debug, Clone)]
pub struct BuildTxRequest {
	pub quote: SourceQuoteResponse,
	pub custom_config: Option<serde_json::Value>,
}

/// Polymorphic provider of quote sources.
#[async_trait]
pub trait SourceList: Send + Sync {
	/// Catalog of sources this list can route to, with their metadata.
	fn sources(&self) -> HashMap<SourceId, QuoteSourceMetadata>;

	/// Obtains a quote from the given source.
	async fn quote(
		&self,
		source_id: &str,
		request: SourceListQuoteRequest,
	) -> Result<SourceQuoteResponse, SourceListError>;

	/// Builds the transaction payload for a quote obtained from the given
	/// source.
	async fn build_tx(
		&self,
		source_id: &str,
		request: BuildTxRequest,
	) -> Result<QuoteTransaction, SourceListError>;
}

impl std::fmt::Debug for dyn SourceList {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SourceList").finish_non_exhaustive()
	}
}

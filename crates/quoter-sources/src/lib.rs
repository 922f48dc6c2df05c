//! Quote source adapters for the aggregation engine.
//!
//! A `QuoteSource` is a stateless adapter to one external swap provider: it
//! validates its own configuration, reports static capability metadata, and
//! converts a normalized request into a normalized response with exactly one
//! upstream query. Adapters never retry internally and never mutate shared
//! state.

use async_trait::async_trait;
use quoter_transport::FetchService;
use quoter_types::{
	Address, ChainId, QuoteSourceMetadata, QuoteTransaction, SourceQuoteRequest,
	SourceQuoteResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod registry;
pub mod utils;

/// Re-export implementations
pub mod implementations {
	pub mod changelly;
	pub mod zero_ex;
}

pub use registry::SourceRegistry;

/// Adapter-level upstream failure.
///
/// Carries enough context (source, chain, token pair, raw upstream text) to
/// diagnose which provider misbehaved and why.
#[derive(Debug, Error)]
#[error("quote source {source_name} failed on chain {chain_id} ({sell_token} -> {buy_token}): {reason}")]
pub struct SourceQueryError {
	pub source_name: String,
	pub chain_id: ChainId,
	pub sell_token: Address,
	pub buy_token: Address,
	pub reason: String,
}

/// Referrer identification forwarded to providers that support it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerInfo {
	pub address: Address,
	pub name: String,
}

/// Configuration shared by every source in a local list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalSourceConfig {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub referrer: Option<ReferrerInfo>,
}

/// Configuration handed to one adapter for one call: the list-wide global
/// section plus the adapter's own opaque custom section.
#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
	pub global: GlobalSourceConfig,
	pub custom: Option<serde_json::Value>,
}

/// Collaborators every adapter may use while quoting.
#[derive(Clone)]
pub struct QuoteComponents {
	pub fetch: Arc<dyn FetchService>,
}

/// Stateless adapter to one external swap provider.
#[async_trait]
pub trait QuoteSource: Send + Sync {
	/// Stable identifier of this source within the built-in registry.
	fn id(&self) -> &'static str;

	/// Static capability metadata, constant after construction.
	fn metadata(&self) -> &QuoteSourceMetadata;

	/// Pure predicate: whether the given custom configuration is enough to
	/// operate this source. No I/O.
	fn is_config_valid(&self, custom: Option<&serde_json::Value>) -> bool;

	/// Issues exactly one upstream query and returns a fully-filled
	/// normalized response, or fails with the upstream reason.
	async fn quote(
		&self,
		components: &QuoteComponents,
		request: &SourceQuoteRequest,
		config: &SourceConfig,
	) -> Result<SourceQuoteResponse, SourceQueryError>;

	/// Produces the transaction payload for a previously obtained quote.
	///
	/// Built-in sources embed the transaction in the quote itself, so the
	/// default body just surfaces it.
	fn build_tx(&self, quote: &SourceQuoteResponse) -> QuoteTransaction {
		quote.tx.clone()
	}
}

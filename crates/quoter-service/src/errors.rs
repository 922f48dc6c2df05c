//! Error taxonomy for the quote orchestrator.

use quoter_lists::SourceListError;
use quoter_types::{ChainId, SourceId};
use std::collections::HashMap;
use thiserror::Error;

/// Terminal per-source outcome other than success, within one aggregation
/// call. There is no retry state: callers wanting retries re-invoke the
/// whole operation.
#[derive(Debug, Error)]
pub enum QuoteFailure {
	#[error(transparent)]
	Query(#[from] SourceListError),

	#[error("source timed out after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("source task failed: {0}")]
	Internal(String),
}

#[derive(Debug, Error)]
pub enum QuoteError {
	#[error("invalid request: {0}")]
	InvalidRequest(String),

	#[error("no source supports chain {chain_id}")]
	UnsupportedChain { chain_id: ChainId },

	#[error("no source on chain {chain_id} supports {capability}")]
	UnsupportedCapability {
		chain_id: ChainId,
		capability: &'static str,
	},

	/// Every eligible source failed or timed out. Carries each per-source
	/// reason for diagnosis.
	#[error("no quote available: every eligible source failed or timed out")]
	NoQuoteAvailable {
		failures: HashMap<SourceId, QuoteFailure>,
	},
}

//! Source list backed by a remote aggregation endpoint.
//!
//! Quoting and transaction building are each one HTTP call against a
//! configured base URL; the source catalog comes from configuration instead
//! of in-process adapters. This lets the identical routing and selection
//! logic run against a centrally hosted aggregator.

use async_trait::async_trait;
use quoter_transport::{FetchOptions, FetchService};
use quoter_types::{
	Address, ChainId, Order, QuoteSourceMetadata, QuoteTransaction, SourceId,
	SourceQuoteResponse, SwapAccounts,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{BuildTxRequest, SourceList, SourceListError, SourceListQuoteRequest};

/// Configuration for an API-backed source list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSourceListConfig {
	pub base_url: String,
	/// Provider catalog exposed through this list.
	pub sources: HashMap<SourceId, QuoteSourceMetadata>,
}

/// Wire form of a quote request as sent to the remote aggregator.
#[derive(Debug, Serialize)]
struct ApiQuoteRequestDto<'a> {
	chain_id: ChainId,
	sell_token: Address,
	buy_token: Address,
	order: Order,
	slippage_percentage: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	tx_valid_for_secs: Option<u64>,
	accounts: SwapAccounts,
	#[serde(skip_serializing_if = "Option::is_none")]
	source_config: Option<&'a serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ApiBuildTxDto<'a> {
	quote: &'a SourceQuoteResponse,
	#[serde(skip_serializing_if = "Option::is_none")]
	source_config: Option<&'a serde_json::Value>,
}

pub struct ApiSourceList {
	fetch: Arc<dyn FetchService>,
	base_url: String,
	sources: HashMap<SourceId, QuoteSourceMetadata>,
}

impl ApiSourceList {
	pub fn new(config: ApiSourceListConfig, fetch: Arc<dyn FetchService>) -> Self {
		Self {
			fetch,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			sources: config.sources,
		}
	}

	fn check_known(&self, source_id: &str) -> Result<(), SourceListError> {
		if self.sources.contains_key(source_id) {
			Ok(())
		} else {
			Err(SourceListError::UnknownSource(source_id.to_string()))
		}
	}

	async fn post<T: serde::de::DeserializeOwned>(
		&self,
		url: String,
		body: serde_json::Value,
		timeout: Option<Duration>,
	) -> Result<T, SourceListError> {
		debug!("Calling remote source list at {}", url);
		let options = FetchOptions::post_json(body).with_timeout(timeout);
		let response = self
			.fetch
			.fetch(&url, options)
			.await
			.map_err(|e| SourceListError::Remote(e.to_string()))?;
		if !response.ok() {
			return Err(SourceListError::Remote(format!(
				"status {}: {}",
				response.status(),
				response.text()
			)));
		}
		response
			.json()
			.map_err(|e| SourceListError::Remote(e.to_string()))
	}
}

#[async_trait]
impl SourceList for ApiSourceList {
	fn sources(&self) -> HashMap<SourceId, QuoteSourceMetadata> {
		self.sources.clone()
	}

	async fn quote(
		&self,
		source_id: &str,
		request: SourceListQuoteRequest,
	) -> Result<SourceQuoteResponse, SourceListError> {
		self.check_known(source_id)?;
		let dto = ApiQuoteRequestDto {
			chain_id: request.request.chain_id,
			sell_token: request.request.sell_token,
			buy_token: request.request.buy_token,
			order: request.request.order,
			slippage_percentage: request.request.slippage_percentage,
			tx_valid_for_secs: request.request.tx_valid_for_secs,
			accounts: request.request.accounts,
			source_config: request.custom_config.as_ref(),
		};
		let body = serde_json::to_value(&dto)
			.map_err(|e| SourceListError::Remote(e.to_string()))?;
		self.post(
			format!("{}/quotes/{}", self.base_url, source_id),
			body,
			request.request.timeout_ms.map(Duration::from_millis),
		)
		.await
	}

	async fn build_tx(
		&self,
		source_id: &str,
		request: BuildTxRequest,
	) -> Result<QuoteTransaction, SourceListError> {
		self.check_known(source_id)?;
		let dto = ApiBuildTxDto {
			quote: &request.quote,
			source_config: request.custom_config.as_ref(),
		};
		let body = serde_json::to_value(&dto)
			.map_err(|e| SourceListError::Remote(e.to_string()))?;
		self.post(format!("{}/txs/{}", self.base_url, source_id), body, None)
			.await
	}
}

//! Quote orchestration.
//!
//! `QuoteService` drives one aggregation call end to end: eligibility
//! filtering against source metadata, concurrent fan-out with a per-source
//! deadline, uniform slippage re-normalization, and deterministic best-quote
//! selection. Sources are reached only through the injected `SourceList`, so
//! the orchestrator is indifferent to whether they run in-process or behind
//! a remote aggregation endpoint.

use futures::future::join_all;
use quoter_lists::{BuildTxRequest, SourceList, SourceListQuoteRequest};
use quoter_types::slippage::slippage_bounds;
use quoter_types::{
	ChainId, ExternalAncillary, GasPriceSource, OrderKind, QuoteRequest,
	QuoteSourceMetadata, QuoteTransaction, SharedLazyValue, SourceId, SourceQuoteRequest,
	SourceQuoteResponse, TokenMetadataSource,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod errors;

pub use errors::{QuoteError, QuoteFailure};

/// Per-call knobs for an aggregation call.
#[derive(Debug, Clone, Default)]
pub struct GetQuoteConfig {
	/// Per-source deadline override, in milliseconds. Takes precedence over
	/// the request-level override and the service default.
	pub timeout_ms: Option<u64>,
}

/// One successful, normalized quote together with its source identity.
#[derive(Debug, Clone)]
pub struct RankedQuote {
	pub source_id: SourceId,
	pub source: QuoteSourceMetadata,
	pub quote: SourceQuoteResponse,
}

/// Outcome of a batch transaction build. Per-entry failures never abort the
/// batch.
#[derive(Debug, Default)]
pub struct BuildTxsResult {
	pub txs: HashMap<SourceId, QuoteTransaction>,
	pub failures: HashMap<SourceId, QuoteFailure>,
}

/// Orchestrates quote aggregation over a source list.
pub struct QuoteService {
	source_list: Arc<dyn SourceList>,
	token_metadata: Arc<dyn TokenMetadataSource>,
	gas_price: Arc<dyn GasPriceSource>,
	default_timeout_ms: u64,
}

impl QuoteService {
	pub fn new(
		source_list: Arc<dyn SourceList>,
		token_metadata: Arc<dyn TokenMetadataSource>,
		gas_price: Arc<dyn GasPriceSource>,
		default_timeout_ms: u64,
	) -> Self {
		Self {
			source_list,
			token_metadata,
			gas_price,
			default_timeout_ms,
		}
	}

	/// Catalog of routable sources, optionally restricted to one chain.
	pub fn list_supported_sources(
		&self,
		chain_id: Option<ChainId>,
	) -> HashMap<SourceId, QuoteSourceMetadata> {
		self.source_list
			.sources()
			.into_iter()
			.filter(|(_, metadata)| chain_id.is_none_or(|chain| metadata.supports_chain(chain)))
			.collect()
	}

	/// Runs one full aggregation call and returns every successful quote,
	/// best first.
	///
	/// Eligibility is decided entirely from source metadata before any
	/// network activity. Each eligible source runs in its own task bounded
	/// by the per-call deadline; a source past its deadline is abandoned and
	/// recorded as a timeout. Slippage bounds of every success are recomputed
	/// here so that ranking never depends on adapter-reported bounds.
	pub async fn get_all_quotes(
		&self,
		request: &QuoteRequest,
		config: &GetQuoteConfig,
	) -> Result<Vec<RankedQuote>, QuoteError> {
		if !request.slippage_percentage.is_finite()
			|| request.slippage_percentage < 0.0
			|| request.slippage_percentage >= 100.0
		{
			return Err(QuoteError::InvalidRequest(format!(
				"slippage percentage {} outside [0, 100)",
				request.slippage_percentage
			)));
		}

		let eligible = self.eligible_sources(request)?;
		let timeout_ms = config
			.timeout_ms
			.or(request.timeout_ms)
			.unwrap_or(self.default_timeout_ms);

		info!(
			chain_id = request.chain_id,
			sources = eligible.len(),
			timeout_ms,
			"Fanning out quote request"
		);

		let base = self.per_source_request(request, timeout_ms);
		let mut handles = Vec::with_capacity(eligible.len());
		for source_id in eligible.keys() {
			let list = Arc::clone(&self.source_list);
			let id = source_id.clone();
			let list_request = SourceListQuoteRequest {
				request: base.clone(),
				custom_config: request.source_config.get(source_id).cloned(),
			};
			handles.push(tokio::spawn(async move {
				match tokio::time::timeout(Duration::from_millis(timeout_ms), list.quote(&id, list_request))
					.await
				{
					Ok(result) => result.map_err(QuoteFailure::Query),
					Err(_) => Err(QuoteFailure::Timeout { timeout_ms }),
				}
			}));
		}

		let mut ranked = Vec::new();
		let mut failures = HashMap::new();
		for ((source_id, metadata), outcome) in eligible.into_iter().zip(join_all(handles).await) {
			let outcome = match outcome {
				Ok(outcome) => outcome,
				Err(join_error) => Err(QuoteFailure::Internal(join_error.to_string())),
			};
			match outcome {
				Ok(mut quote) => {
					let (max_sell, min_buy) = slippage_bounds(
						request.order.kind(),
						quote.sell_amount,
						quote.buy_amount,
						request.slippage_percentage,
					);
					quote.max_sell_amount = max_sell;
					quote.min_buy_amount = min_buy;
					quote.kind = request.order.kind();
					debug!(source = %source_id, "Source returned a quote");
					ranked.push(RankedQuote {
						source_id,
						source: metadata,
						quote,
					});
				}
				Err(failure) => {
					warn!(source = %source_id, error = %failure, "Source failed to quote");
					failures.insert(source_id, failure);
				}
			}
		}

		if ranked.is_empty() {
			return Err(QuoteError::NoQuoteAvailable { failures });
		}

		// Iteration above follows the eligible map's lexical id order, so a
		// stable sort makes ties resolve to the lexically smallest id.
		match request.order.kind() {
			OrderKind::Sell => {
				ranked.sort_by(|a, b| b.quote.buy_amount.cmp(&a.quote.buy_amount));
			}
			OrderKind::Buy => {
				ranked.sort_by(|a, b| a.quote.sell_amount.cmp(&b.quote.sell_amount));
			}
		}

		info!(
			best = %ranked[0].source_id,
			successes = ranked.len(),
			failures = failures.len(),
			"Quote aggregation complete"
		);
		Ok(ranked)
	}

	/// Runs one full aggregation call and returns the single best quote.
	pub async fn get_best_quote(
		&self,
		request: &QuoteRequest,
		config: &GetQuoteConfig,
	) -> Result<RankedQuote, QuoteError> {
		let ranked = self.get_all_quotes(request, config).await?;
		ranked
			.into_iter()
			.next()
			.ok_or(QuoteError::NoQuoteAvailable {
				failures: HashMap::new(),
			})
	}

	/// Builds the transaction payload for every given quote concurrently.
	///
	/// Each entry runs in its own deadline-bounded task; failures land in
	/// the result's failure map without affecting the other entries.
	pub async fn build_all_txs(
		&self,
		quotes: HashMap<SourceId, SourceQuoteResponse>,
		source_config: &HashMap<SourceId, serde_json::Value>,
		config: &GetQuoteConfig,
	) -> BuildTxsResult {
		let timeout_ms = config.timeout_ms.unwrap_or(self.default_timeout_ms);
		let entries: Vec<(SourceId, SourceQuoteResponse)> = quotes.into_iter().collect();

		let mut handles = Vec::with_capacity(entries.len());
		for (source_id, quote) in &entries {
			let list = Arc::clone(&self.source_list);
			let id = source_id.clone();
			let build_request = BuildTxRequest {
				quote: quote.clone(),
				custom_config: source_config.get(source_id).cloned(),
			};
			handles.push(tokio::spawn(async move {
				match tokio::time::timeout(
					Duration::from_millis(timeout_ms),
					list.build_tx(&id, build_request),
				)
				.await
				{
					Ok(result) => result.map_err(QuoteFailure::Query),
					Err(_) => Err(QuoteFailure::Timeout { timeout_ms }),
				}
			}));
		}

		let mut result = BuildTxsResult::default();
		for ((source_id, _), outcome) in entries.into_iter().zip(join_all(handles).await) {
			let outcome = match outcome {
				Ok(outcome) => outcome,
				Err(join_error) => Err(QuoteFailure::Internal(join_error.to_string())),
			};
			match outcome {
				Ok(tx) => {
					result.txs.insert(source_id, tx);
				}
				Err(failure) => {
					warn!(source = %source_id, error = %failure, "Transaction build failed");
					result.failures.insert(source_id, failure);
				}
			}
		}
		result
	}

	/// Computes the eligible source set for a request, entirely from
	/// metadata. Each narrowing stage reports its own error when it empties
	/// the set, so the caller learns which requirement was unsatisfiable.
	fn eligible_sources(
		&self,
		request: &QuoteRequest,
	) -> Result<BTreeMap<SourceId, QuoteSourceMetadata>, QuoteError> {
		let mut eligible: BTreeMap<SourceId, QuoteSourceMetadata> = self
			.source_list
			.sources()
			.into_iter()
			.filter(|(_, metadata)| metadata.supports_chain(request.chain_id))
			.collect();
		if eligible.is_empty() {
			return Err(QuoteError::UnsupportedChain {
				chain_id: request.chain_id,
			});
		}

		if request.order.kind() == OrderKind::Buy {
			eligible.retain(|_, metadata| metadata.supports.buy_orders);
			if eligible.is_empty() {
				return Err(QuoteError::UnsupportedCapability {
					chain_id: request.chain_id,
					capability: "buy orders",
				});
			}
		}

		if request.accounts.transfers_to_other() {
			eligible.retain(|_, metadata| metadata.supports.swap_and_transfer);
			if eligible.is_empty() {
				return Err(QuoteError::UnsupportedCapability {
					chain_id: request.chain_id,
					capability: "swap and transfer",
				});
			}
		}

		if let Some(filter) = &request.filters {
			eligible.retain(|source_id, _| filter.allows(source_id));
			if eligible.is_empty() {
				return Err(QuoteError::InvalidRequest(
					"source filter excluded every eligible source".to_string(),
				));
			}
		}

		Ok(eligible)
	}

	/// Derives the per-source view of the request, wiring up the shared
	/// ancillary lookups for this call. The handles are created fresh per
	/// call; nothing is cached across aggregation calls.
	fn per_source_request(&self, request: &QuoteRequest, timeout_ms: u64) -> SourceQuoteRequest {
		let token_metadata = Arc::clone(&self.token_metadata);
		let (chain_id, sell_token, buy_token) =
			(request.chain_id, request.sell_token, request.buy_token);
		let token_data = Arc::new(SharedLazyValue::new(move || async move {
			token_metadata
				.token_pair(chain_id, sell_token, buy_token)
				.await
		}));

		let gas_price_source = Arc::clone(&self.gas_price);
		let gas_price = Arc::new(SharedLazyValue::new(move || async move {
			gas_price_source.gas_price(chain_id).await
		}));

		SourceQuoteRequest {
			chain_id: request.chain_id,
			sell_token: request.sell_token,
			buy_token: request.buy_token,
			order: request.order,
			slippage_percentage: request.slippage_percentage,
			tx_valid_for_secs: request.tx_valid_for_secs,
			timeout_ms: Some(timeout_ms),
			accounts: request.accounts,
			external: ExternalAncillary {
				token_data,
				gas_price,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use quoter_lists::SourceListError;
	use quoter_types::{
		address, Address, GasPrice, Order, QuoteSourceSupport, SourceFilter, SwapAccounts,
		TokenMetadata, TokenPairMetadata, U256,
	};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Instant;

	#[derive(Clone)]
	enum Behavior {
		Quote { sell: u64, buy: u64 },
		Delay { millis: u64, sell: u64, buy: u64 },
		Fail(&'static str),
		FailBuild { sell: u64, buy: u64 },
	}

	struct MockList {
		catalog: HashMap<SourceId, QuoteSourceMetadata>,
		behaviors: HashMap<SourceId, Behavior>,
	}

	impl MockList {
		fn new(entries: Vec<(&str, QuoteSourceMetadata, Behavior)>) -> Self {
			let mut catalog = HashMap::new();
			let mut behaviors = HashMap::new();
			for (id, metadata, behavior) in entries {
				catalog.insert(id.to_string(), metadata);
				behaviors.insert(id.to_string(), behavior);
			}
			Self { catalog, behaviors }
		}

		fn response(&self, sell: u64, buy: u64, kind: OrderKind) -> SourceQuoteResponse {
			SourceQuoteResponse {
				sell_amount: U256::from(sell),
				// Bogus bounds on purpose: the orchestrator recomputes them.
				max_sell_amount: U256::from(sell) * U256::from(2u64),
				buy_amount: U256::from(buy),
				min_buy_amount: U256::ZERO,
				kind,
				allowance_target: Address::ZERO,
				estimated_gas: None,
				tx: QuoteTransaction {
					to: address!("00000000000000000000000000000000000000aa"),
					calldata: vec![0x01u8].into(),
					value: U256::ZERO,
				},
			}
		}
	}

	#[async_trait]
	impl SourceList for MockList {
		fn sources(&self) -> HashMap<SourceId, QuoteSourceMetadata> {
			self.catalog.clone()
		}

		async fn quote(
			&self,
			source_id: &str,
			request: SourceListQuoteRequest,
		) -> Result<SourceQuoteResponse, SourceListError> {
			// Every mock source touches the shared lookup, like real
			// adapters would.
			let _ = request.request.external.token_data.get().await;
			let kind = request.request.order.kind();
			match self.behaviors.get(source_id) {
				Some(Behavior::Quote { sell, buy }) => Ok(self.response(*sell, *buy, kind)),
				Some(Behavior::Delay { millis, sell, buy }) => {
					tokio::time::sleep(Duration::from_millis(*millis)).await;
					Ok(self.response(*sell, *buy, kind))
				}
				Some(Behavior::Fail(reason)) => Err(SourceListError::Remote(reason.to_string())),
				Some(Behavior::FailBuild { sell, buy }) => Ok(self.response(*sell, *buy, kind)),
				None => Err(SourceListError::UnknownSource(source_id.to_string())),
			}
		}

		async fn build_tx(
			&self,
			source_id: &str,
			request: BuildTxRequest,
		) -> Result<QuoteTransaction, SourceListError> {
			match self.behaviors.get(source_id) {
				Some(Behavior::FailBuild { .. }) => {
					Err(SourceListError::Remote("build rejected".to_string()))
				}
				Some(_) => Ok(request.quote.tx),
				None => Err(SourceListError::UnknownSource(source_id.to_string())),
			}
		}
	}

	struct CountingTokenSource {
		calls: AtomicUsize,
	}

	#[async_trait]
	impl TokenMetadataSource for CountingTokenSource {
		async fn token_pair(
			&self,
			_chain_id: ChainId,
			_sell_token: Address,
			_buy_token: Address,
		) -> anyhow::Result<TokenPairMetadata> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(TokenPairMetadata {
				sell_token: TokenMetadata {
					symbol: "WETH".to_string(),
					decimals: 18,
				},
				buy_token: TokenMetadata {
					symbol: "USDC".to_string(),
					decimals: 6,
				},
			})
		}
	}

	struct FixedGasSource;

	#[async_trait]
	impl GasPriceSource for FixedGasSource {
		async fn gas_price(&self, _chain_id: ChainId) -> anyhow::Result<GasPrice> {
			Ok(U256::from(30_000_000_000u64))
		}
	}

	fn metadata(chains: Vec<ChainId>, buy_orders: bool, swap_and_transfer: bool) -> QuoteSourceMetadata {
		QuoteSourceMetadata {
			name: "Mock".to_string(),
			supported_chains: chains,
			supports: QuoteSourceSupport {
				buy_orders,
				swap_and_transfer,
			},
			logo_uri: String::new(),
		}
	}

	fn service_with(list: MockList) -> (QuoteService, Arc<CountingTokenSource>) {
		let token_source = Arc::new(CountingTokenSource {
			calls: AtomicUsize::new(0),
		});
		let service = QuoteService::new(
			Arc::new(list),
			Arc::clone(&token_source) as Arc<dyn TokenMetadataSource>,
			Arc::new(FixedGasSource),
			5_000,
		);
		(service, token_source)
	}

	fn sell_request(chain_id: ChainId) -> QuoteRequest {
		QuoteRequest {
			chain_id,
			sell_token: address!("1111111111111111111111111111111111111111"),
			buy_token: address!("2222222222222222222222222222222222222222"),
			order: Order::Sell {
				sell_amount: U256::from(1_000u64),
			},
			slippage_percentage: 1.0,
			tx_valid_for_secs: None,
			timeout_ms: None,
			accounts: SwapAccounts {
				take_from: address!("3333333333333333333333333333333333333333"),
				recipient: None,
			},
			filters: None,
			source_config: HashMap::new(),
		}
	}

	#[tokio::test]
	async fn test_sell_order_picks_highest_buy_amount() {
		let list = MockList::new(vec![
			("alpha", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
			("beta", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 120 }),
		]);
		let (service, _) = service_with(list);

		let best = service
			.get_best_quote(&sell_request(1), &GetQuoteConfig::default())
			.await
			.unwrap();
		assert_eq!(best.source_id, "beta");
		assert_eq!(best.quote.buy_amount, U256::from(120u64));
	}

	#[tokio::test]
	async fn test_tie_breaks_to_lexically_smallest_source_id() {
		let list = MockList::new(vec![
			("zeta", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
			("alpha", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
			("mid", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
		]);
		let (service, _) = service_with(list);

		let best = service
			.get_best_quote(&sell_request(1), &GetQuoteConfig::default())
			.await
			.unwrap();
		assert_eq!(best.source_id, "alpha");
	}

	#[tokio::test]
	async fn test_buy_order_picks_lowest_sell_amount_among_capable_sources() {
		let list = MockList::new(vec![
			("cheap", metadata(vec![1], true, false), Behavior::Quote { sell: 900, buy: 500 }),
			("pricey", metadata(vec![1], true, false), Behavior::Quote { sell: 950, buy: 500 }),
			// Cheapest of all, but cannot do buy orders.
			("no-buy", metadata(vec![1], false, false), Behavior::Quote { sell: 100, buy: 500 }),
		]);
		let (service, _) = service_with(list);

		let mut request = sell_request(1);
		request.order = Order::Buy {
			buy_amount: U256::from(500u64),
		};
		let best = service
			.get_best_quote(&request, &GetQuoteConfig::default())
			.await
			.unwrap();
		assert_eq!(best.source_id, "cheap");
		assert_eq!(best.quote.sell_amount, U256::from(900u64));
	}

	#[tokio::test]
	async fn test_slow_source_excluded_within_deadline() {
		let list = MockList::new(vec![
			("fast", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
			(
				"slow",
				metadata(vec![1], false, false),
				Behavior::Delay { millis: 500, sell: 1_000, buy: 999 },
			),
		]);
		let (service, _) = service_with(list);

		let config = GetQuoteConfig {
			timeout_ms: Some(100),
		};
		let started = Instant::now();
		let ranked = service.get_all_quotes(&sell_request(1), &config).await.unwrap();
		let elapsed = started.elapsed();

		assert_eq!(ranked.len(), 1);
		assert_eq!(ranked[0].source_id, "fast");
		assert!(
			elapsed < Duration::from_millis(400),
			"aggregation took {elapsed:?}, expected to finish near the 100ms deadline"
		);
	}

	#[tokio::test]
	async fn test_all_sources_timing_out_yields_no_quote_available() {
		let list = MockList::new(vec![(
			"slow",
			metadata(vec![1], false, false),
			Behavior::Delay { millis: 500, sell: 1_000, buy: 100 },
		)]);
		let (service, _) = service_with(list);

		let config = GetQuoteConfig {
			timeout_ms: Some(50),
		};
		let error = service
			.get_all_quotes(&sell_request(1), &config)
			.await
			.unwrap_err();
		match error {
			QuoteError::NoQuoteAvailable { failures } => {
				assert!(matches!(
					failures.get("slow"),
					Some(QuoteFailure::Timeout { timeout_ms: 50 })
				));
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[tokio::test]
	async fn test_unsupported_chain_rejected_before_any_query() {
		let list = MockList::new(vec![(
			"alpha",
			metadata(vec![1], false, false),
			Behavior::Fail("must never be reached"),
		)]);
		let (service, token_source) = service_with(list);

		let error = service
			.get_all_quotes(&sell_request(137), &GetQuoteConfig::default())
			.await
			.unwrap_err();
		assert!(matches!(error, QuoteError::UnsupportedChain { chain_id: 137 }));
		assert_eq!(token_source.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_buy_order_without_capable_source_rejected() {
		let list = MockList::new(vec![(
			"sell-only",
			metadata(vec![1], false, false),
			Behavior::Quote { sell: 1_000, buy: 100 },
		)]);
		let (service, _) = service_with(list);

		let mut request = sell_request(1);
		request.order = Order::Buy {
			buy_amount: U256::from(100u64),
		};
		let error = service
			.get_all_quotes(&request, &GetQuoteConfig::default())
			.await
			.unwrap_err();
		assert!(matches!(
			error,
			QuoteError::UnsupportedCapability {
				capability: "buy orders",
				..
			}
		));
	}

	#[tokio::test]
	async fn test_distinct_recipient_requires_swap_and_transfer() {
		let list = MockList::new(vec![
			("plain", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 200 }),
			("transfer", metadata(vec![1], false, true), Behavior::Quote { sell: 1_000, buy: 100 }),
		]);
		let (service, _) = service_with(list);

		let mut request = sell_request(1);
		request.accounts.recipient = Some(address!("4444444444444444444444444444444444444444"));
		let ranked = service
			.get_all_quotes(&request, &GetQuoteConfig::default())
			.await
			.unwrap();

		// The better-priced source lacks the capability, so it never runs.
		assert_eq!(ranked.len(), 1);
		assert_eq!(ranked[0].source_id, "transfer");
	}

	#[tokio::test]
	async fn test_invalid_slippage_rejected() {
		let list = MockList::new(vec![(
			"alpha",
			metadata(vec![1], false, false),
			Behavior::Quote { sell: 1_000, buy: 100 },
		)]);
		let (service, _) = service_with(list);

		for slippage in [-0.5, 100.0, f64::NAN] {
			let mut request = sell_request(1);
			request.slippage_percentage = slippage;
			let error = service
				.get_all_quotes(&request, &GetQuoteConfig::default())
				.await
				.unwrap_err();
			assert!(matches!(error, QuoteError::InvalidRequest(_)));
		}
	}

	#[tokio::test]
	async fn test_include_filter_restricts_fanout() {
		let list = MockList::new(vec![
			("wanted", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
			("better", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 500 }),
		]);
		let (service, _) = service_with(list);

		let mut request = sell_request(1);
		request.filters = Some(SourceFilter::Include(vec!["wanted".to_string()]));
		let ranked = service
			.get_all_quotes(&request, &GetQuoteConfig::default())
			.await
			.unwrap();
		assert_eq!(ranked.len(), 1);
		assert_eq!(ranked[0].source_id, "wanted");
	}

	#[tokio::test]
	async fn test_filter_excluding_everything_is_invalid() {
		let list = MockList::new(vec![(
			"alpha",
			metadata(vec![1], false, false),
			Behavior::Quote { sell: 1_000, buy: 100 },
		)]);
		let (service, _) = service_with(list);

		let mut request = sell_request(1);
		request.filters = Some(SourceFilter::Exclude(vec!["alpha".to_string()]));
		let error = service
			.get_all_quotes(&request, &GetQuoteConfig::default())
			.await
			.unwrap_err();
		assert!(matches!(error, QuoteError::InvalidRequest(_)));
	}

	#[tokio::test]
	async fn test_slippage_bounds_recomputed_uniformly() {
		// The mock reports max_sell = 2x and min_buy = 0; neither must
		// survive normalization.
		let list = MockList::new(vec![(
			"alpha",
			metadata(vec![1], false, false),
			Behavior::Quote { sell: 1_000, buy: 2_000 },
		)]);
		let (service, _) = service_with(list);

		let best = service
			.get_best_quote(&sell_request(1), &GetQuoteConfig::default())
			.await
			.unwrap();
		assert_eq!(best.quote.max_sell_amount, U256::from(1_000u64));
		assert_eq!(best.quote.min_buy_amount, U256::from(1_980u64));
	}

	#[tokio::test]
	async fn test_no_quote_available_carries_every_failure_reason() {
		let list = MockList::new(vec![
			("down", metadata(vec![1], false, false), Behavior::Fail("status 503")),
			("broken", metadata(vec![1], false, false), Behavior::Fail("bad payload")),
		]);
		let (service, _) = service_with(list);

		let error = service
			.get_all_quotes(&sell_request(1), &GetQuoteConfig::default())
			.await
			.unwrap_err();
		match error {
			QuoteError::NoQuoteAvailable { failures } => {
				assert_eq!(failures.len(), 2);
				assert!(failures["down"].to_string().contains("status 503"));
				assert!(failures["broken"].to_string().contains("bad payload"));
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[tokio::test]
	async fn test_get_all_quotes_returns_every_success_ranked() {
		let list = MockList::new(vec![
			("a", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 90 }),
			("b", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 110 }),
			("c", metadata(vec![1], false, false), Behavior::Fail("offline")),
			("d", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
		]);
		let (service, _) = service_with(list);

		let ranked = service
			.get_all_quotes(&sell_request(1), &GetQuoteConfig::default())
			.await
			.unwrap();
		let order: Vec<&str> = ranked.iter().map(|q| q.source_id.as_str()).collect();
		assert_eq!(order, vec!["b", "d", "a"]);
	}

	#[tokio::test]
	async fn test_build_all_txs_isolates_failures() {
		let list = MockList::new(vec![
			("good", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
			("bad", metadata(vec![1], false, false), Behavior::FailBuild { sell: 1_000, buy: 100 }),
		]);
		let (service, _) = service_with(list);

		let ranked = service
			.get_all_quotes(&sell_request(1), &GetQuoteConfig::default())
			.await
			.unwrap();
		let quotes: HashMap<SourceId, SourceQuoteResponse> = ranked
			.into_iter()
			.map(|q| (q.source_id, q.quote))
			.collect();

		let result = service
			.build_all_txs(quotes, &HashMap::new(), &GetQuoteConfig::default())
			.await;
		assert_eq!(result.txs.len(), 1);
		assert!(result.txs.contains_key("good"));
		assert_eq!(result.failures.len(), 1);
		assert!(result.failures["bad"].to_string().contains("build rejected"));
	}

	#[tokio::test]
	async fn test_ancillary_lookup_shared_across_sources() {
		let list = MockList::new(vec![
			("a", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 100 }),
			("b", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 110 }),
			("c", metadata(vec![1], false, false), Behavior::Quote { sell: 1_000, buy: 120 }),
		]);
		let (service, token_source) = service_with(list);

		service
			.get_all_quotes(&sell_request(1), &GetQuoteConfig::default())
			.await
			.unwrap();
		assert_eq!(token_source.calls.load(Ordering::SeqCst), 1);

		// A second call builds fresh handles, so the lookup runs again.
		service
			.get_all_quotes(&sell_request(1), &GetQuoteConfig::default())
			.await
			.unwrap();
		assert_eq!(token_source.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn test_list_supported_sources_chain_filter() {
		let list = MockList::new(vec![
			("mainnet-only", metadata(vec![1], false, false), Behavior::Fail("unused")),
			("multi", metadata(vec![1, 10, 137], false, false), Behavior::Fail("unused")),
		]);
		let (service, _) = service_with(list);

		assert_eq!(service.list_supported_sources(None).len(), 2);
		let on_optimism = service.list_supported_sources(Some(10));
		assert_eq!(on_optimism.len(), 1);
		assert!(on_optimism.contains_key("multi"));
	}
}

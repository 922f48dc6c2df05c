//! Changelly DEX quote source.
//!
//! Sell orders only, supports swap-and-transfer, requires an API key.

use async_trait::async_trait;
use quoter_transport::FetchOptions;
use quoter_types::{
	Address, Bytes, Order, OrderKind, QuoteSourceMetadata, QuoteSourceSupport, QuoteTransaction,
	SourceQuoteRequest, SourceQuoteResponse, U256, NATIVE_TOKEN,
};
use serde::Deserialize;
use std::time::Duration;

use crate::utils::{attach_slippage, calculate_allowance_target, failed, parse_amount, PartialQuote};
use crate::{QuoteComponents, QuoteSource, SourceConfig, SourceQueryError};

const SOURCE_ID: &str = "changelly";
const BASE_URL: &str = "https://dex-api.changelly.com/v1";

#[derive(Debug, Clone, Deserialize)]
struct ChangellyConfig {
	api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChangellyQuoteBody {
	amount_out_total: String,
	estimate_gas_total: String,
	calldata: String,
	to: Address,
}

pub struct ChangellySource {
	metadata: QuoteSourceMetadata,
}

impl ChangellySource {
	pub fn new() -> Self {
		Self {
			metadata: QuoteSourceMetadata {
				name: "Changelly DEX".to_string(),
				// Ethereum, Optimism, BNB Chain, Polygon, Fantom, Arbitrum, Avalanche
				supported_chains: vec![1, 10, 56, 137, 250, 42161, 43114],
				supports: QuoteSourceSupport {
					buy_orders: false,
					swap_and_transfer: true,
				},
				logo_uri: "ipfs://Qmbnnx5bD1wytBna4oY8DaL1cw5c5mTStwUMqLCoLt3yHR".to_string(),
			},
		}
	}

	fn parse_config(&self, custom: Option<&serde_json::Value>) -> Option<ChangellyConfig> {
		let config: ChangellyConfig = serde_json::from_value(custom?.clone()).ok()?;
		if config.api_key.is_empty() {
			return None;
		}
		Some(config)
	}
}

impl Default for ChangellySource {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl QuoteSource for ChangellySource {
	fn id(&self) -> &'static str {
		SOURCE_ID
	}

	fn metadata(&self) -> &QuoteSourceMetadata {
		&self.metadata
	}

	fn is_config_valid(&self, custom: Option<&serde_json::Value>) -> bool {
		self.parse_config(custom).is_some()
	}

	async fn quote(
		&self,
		components: &QuoteComponents,
		request: &SourceQuoteRequest,
		config: &SourceConfig,
	) -> Result<SourceQuoteResponse, SourceQueryError> {
		let name = &self.metadata.name;
		let Order::Sell { sell_amount } = request.order else {
			return Err(failed(name, request, "buy orders are not supported"));
		};
		let Some(config) = self.parse_config(config.custom.as_ref()) else {
			return Err(failed(name, request, "missing api key configuration"));
		};

		// Changelly expresses slippage in tenths of a percent
		let mut url = format!(
			"{BASE_URL}/{}/quote?fromTokenAddress={}&toTokenAddress={}&amount={}&slippage={}&skipValidation=true",
			request.chain_id,
			request.sell_token,
			request.buy_token,
			sell_amount,
			request.slippage_percentage * 10.0,
		);
		if request.accounts.transfers_to_other() {
			url.push_str(&format!(
				"&recipientAddress={}",
				request.accounts.effective_recipient()
			));
		}

		let options = FetchOptions::get()
			.with_timeout(request.timeout_ms.map(Duration::from_millis))
			.with_header("X-Api-Key", config.api_key);

		let response = components
			.fetch
			.fetch(&url, options)
			.await
			.map_err(|e| failed(name, request, e.to_string()))?;
		if !response.ok() {
			return Err(failed(name, request, response.text()));
		}

		let body: ChangellyQuoteBody = response
			.json()
			.map_err(|e| failed(name, request, e.to_string()))?;
		let buy_amount =
			parse_amount(&body.amount_out_total).map_err(|e| failed(name, request, e))?;
		let estimated_gas =
			parse_amount(&body.estimate_gas_total).map_err(|e| failed(name, request, e))?;
		let calldata: Bytes = body
			.calldata
			.parse()
			.map_err(|_| failed(name, request, "invalid calldata in response"))?;

		let quote = PartialQuote {
			sell_amount,
			buy_amount,
			estimated_gas: Some(estimated_gas),
			allowance_target: calculate_allowance_target(request.sell_token, body.to),
			tx: QuoteTransaction {
				to: body.to,
				calldata,
				value: if request.sell_token == NATIVE_TOKEN {
					sell_amount
				} else {
					U256::ZERO
				},
			},
		};
		Ok(attach_slippage(
			quote,
			OrderKind::Sell,
			request.slippage_percentage,
		))
	}
}

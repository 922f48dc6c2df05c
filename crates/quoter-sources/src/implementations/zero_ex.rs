//! 0x quote source.
//!
//! Supports both sell and buy orders; output always goes back to the taker,
//! so swap-and-transfer is not declared. The API key is optional.

use async_trait::async_trait;
use quoter_transport::FetchOptions;
use quoter_types::{
	Address, Bytes, Order, QuoteSourceMetadata, QuoteSourceSupport, QuoteTransaction,
	SourceQuoteRequest, SourceQuoteResponse, U256,
};
use serde::Deserialize;
use std::time::Duration;

use crate::utils::{attach_slippage, failed, parse_amount, PartialQuote};
use crate::{QuoteComponents, QuoteSource, SourceConfig, SourceQueryError};

const SOURCE_ID: &str = "0x";

#[derive(Debug, Clone, Default, Deserialize)]
struct ZeroExConfig {
	#[serde(default)]
	api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZeroExQuoteBody {
	sell_amount: String,
	buy_amount: String,
	estimated_gas: String,
	allowance_target: Address,
	to: Address,
	data: String,
	value: String,
}

pub struct ZeroExSource {
	metadata: QuoteSourceMetadata,
}

impl ZeroExSource {
	pub fn new() -> Self {
		Self {
			metadata: QuoteSourceMetadata {
				name: "0x".to_string(),
				supported_chains: vec![1, 10, 56, 137, 250, 8453, 42161, 43114],
				supports: QuoteSourceSupport {
					buy_orders: true,
					swap_and_transfer: false,
				},
				logo_uri: "ipfs://QmPUn2a4wepU6AbQHmFrJHFNYXfGfNTNEbGeGWGJR8LxYj".to_string(),
			},
		}
	}

	fn api_host(chain_id: u64) -> Option<&'static str> {
		match chain_id {
			1 => Some("api.0x.org"),
			10 => Some("optimism.api.0x.org"),
			56 => Some("bsc.api.0x.org"),
			137 => Some("polygon.api.0x.org"),
			250 => Some("fantom.api.0x.org"),
			8453 => Some("base.api.0x.org"),
			42161 => Some("arbitrum.api.0x.org"),
			43114 => Some("avalanche.api.0x.org"),
			_ => None,
		}
	}
}

impl Default for ZeroExSource {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl QuoteSource for ZeroExSource {
	fn id(&self) -> &'static str {
		SOURCE_ID
	}

	fn metadata(&self) -> &QuoteSourceMetadata {
		&self.metadata
	}

	fn is_config_valid(&self, custom: Option<&serde_json::Value>) -> bool {
		match custom {
			// Works without any custom configuration
			None => true,
			Some(value) => serde_json::from_value::<ZeroExConfig>(value.clone()).is_ok(),
		}
	}

	async fn quote(
		&self,
		components: &QuoteComponents,
		request: &SourceQuoteRequest,
		config: &SourceConfig,
	) -> Result<SourceQuoteResponse, SourceQueryError> {
		let name = &self.metadata.name;
		let Some(host) = Self::api_host(request.chain_id) else {
			return Err(failed(name, request, "unsupported chain"));
		};

		let amount_param = match request.order {
			Order::Sell { sell_amount } => format!("sellAmount={sell_amount}"),
			Order::Buy { buy_amount } => format!("buyAmount={buy_amount}"),
		};
		let mut url = format!(
			"https://{host}/swap/v1/quote?sellToken={}&buyToken={}&{}&slippagePercentage={}&takerAddress={}&skipValidation=true",
			request.sell_token,
			request.buy_token,
			amount_param,
			request.slippage_percentage / 100.0,
			request.accounts.take_from,
		);
		let custom: ZeroExConfig = config
			.custom
			.as_ref()
			.and_then(|value| serde_json::from_value(value.clone()).ok())
			.unwrap_or_default();
		if let Some(referrer) = &config.global.referrer {
			url.push_str(&format!("&affiliateAddress={}", referrer.address));
		}

		let mut options =
			FetchOptions::get().with_timeout(request.timeout_ms.map(Duration::from_millis));
		if let Some(api_key) = custom.api_key {
			options = options.with_header("0x-api-key", api_key);
		}

		let response = components
			.fetch
			.fetch(&url, options)
			.await
			.map_err(|e| failed(name, request, e.to_string()))?;
		if !response.ok() {
			return Err(failed(name, request, response.text()));
		}

		let body: ZeroExQuoteBody = response
			.json()
			.map_err(|e| failed(name, request, e.to_string()))?;
		let sell_amount = parse_amount(&body.sell_amount).map_err(|e| failed(name, request, e))?;
		let buy_amount = parse_amount(&body.buy_amount).map_err(|e| failed(name, request, e))?;
		let estimated_gas =
			parse_amount(&body.estimated_gas).map_err(|e| failed(name, request, e))?;
		let value = parse_amount(&body.value).map_err(|e| failed(name, request, e))?;
		let calldata: Bytes = body
			.data
			.parse()
			.map_err(|_| failed(name, request, "invalid calldata in response"))?;

		let quote = PartialQuote {
			sell_amount,
			buy_amount,
			estimated_gas: Some(estimated_gas),
			allowance_target: body.allowance_target,
			tx: QuoteTransaction {
				to: body.to,
				calldata,
				value,
			},
		};
		Ok(attach_slippage(
			quote,
			request.order.kind(),
			request.slippage_percentage,
		))
	}
}

//! Normalized quote request/response model.
//!
//! `QuoteRequest` is the caller-facing request handed to the orchestrator.
//! `SourceQuoteRequest` is the per-source view derived from it for one
//! aggregation call; it additionally carries the shared ancillary lookup
//! handles so that concurrent adapters never duplicate the same expensive
//! fetch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::chain_data::{GasPrice, TokenPairMetadata};
use crate::common::{Address, Bytes, ChainId, SourceId, U256};
use crate::shared_lazy::SharedLazyValue;

/// Order side of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
	Sell,
	Buy,
}

/// A swap order: either sell an exact amount or buy an exact amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Order {
	Sell { sell_amount: U256 },
	Buy { buy_amount: U256 },
}

impl Order {
	pub fn kind(&self) -> OrderKind {
		match self {
			Order::Sell { .. } => OrderKind::Sell,
			Order::Buy { .. } => OrderKind::Buy,
		}
	}

	/// The exact amount named by the order, regardless of side.
	pub fn amount(&self) -> U256 {
		match self {
			Order::Sell { sell_amount } => *sell_amount,
			Order::Buy { buy_amount } => *buy_amount,
		}
	}
}

/// Accounts involved in the swap.
///
/// A `recipient` distinct from `take_from` is only legal against sources
/// whose metadata declares swap-and-transfer support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapAccounts {
	/// Address the sell token is taken from.
	pub take_from: Address,
	/// Optional distinct recipient of the buy token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub recipient: Option<Address>,
}

impl SwapAccounts {
	/// Whether the swap output goes to an address other than the taker.
	pub fn transfers_to_other(&self) -> bool {
		self.recipient.is_some_and(|recipient| recipient != self.take_from)
	}

	/// The effective recipient of the swap output.
	pub fn effective_recipient(&self) -> Address {
		self.recipient.unwrap_or(self.take_from)
	}
}

/// Capability flags declared by a quote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSourceSupport {
	pub buy_orders: bool,
	pub swap_and_transfer: bool,
}

/// Immutable per-source metadata, created once at source construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSourceMetadata {
	/// Display name of the provider.
	pub name: String,
	/// Chains the provider can quote on.
	pub supported_chains: Vec<ChainId>,
	/// Capability flags.
	pub supports: QuoteSourceSupport,
	/// Logo reference (URL or IPFS URI).
	pub logo_uri: String,
}

impl QuoteSourceMetadata {
	pub fn supports_chain(&self, chain_id: ChainId) -> bool {
		self.supported_chains.contains(&chain_id)
	}
}

/// Restricts which sources participate in an aggregation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFilter {
	Include(Vec<SourceId>),
	Exclude(Vec<SourceId>),
}

impl SourceFilter {
	pub fn allows(&self, source_id: &str) -> bool {
		match self {
			SourceFilter::Include(ids) => ids.iter().any(|id| id == source_id),
			SourceFilter::Exclude(ids) => !ids.iter().any(|id| id == source_id),
		}
	}
}

/// Caller-facing quote request handed to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
	pub chain_id: ChainId,
	pub sell_token: Address,
	pub buy_token: Address,
	pub order: Order,
	/// Slippage tolerance, `0 <= p < 100`.
	pub slippage_percentage: f64,
	/// How long the produced transaction should stay valid, in seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_valid_for_secs: Option<u64>,
	/// Per-source timeout override, in milliseconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timeout_ms: Option<u64>,
	pub accounts: SwapAccounts,
	/// Optional include/exclude restriction on participating sources.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filters: Option<SourceFilter>,
	/// Opaque per-source configuration, keyed by source id. Passed through
	/// to the owning adapter without interpretation by the orchestrator.
	#[serde(default, skip_serializing_if = "HashMap::is_empty")]
	pub source_config: HashMap<SourceId, serde_json::Value>,
}

/// Ancillary lookups shared by every source participating in one
/// aggregation call. Created per call, never cached across calls.
#[derive(Clone)]
pub struct ExternalAncillary {
	pub token_data: Arc<SharedLazyValue<TokenPairMetadata>>,
	pub gas_price: Arc<SharedLazyValue<GasPrice>>,
}

/// Per-source view of a quote request for one aggregation call.
#[derive(Clone)]
pub struct SourceQuoteRequest {
	pub chain_id: ChainId,
	pub sell_token: Address,
	pub buy_token: Address,
	pub order: Order,
	pub slippage_percentage: f64,
	pub tx_valid_for_secs: Option<u64>,
	pub timeout_ms: Option<u64>,
	pub accounts: SwapAccounts,
	pub external: ExternalAncillary,
}

/// Ready-to-send transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTransaction {
	pub to: Address,
	pub calldata: Bytes,
	#[serde(default)]
	pub value: U256,
}

/// Normalized output of one source for one request.
///
/// Invariants: for a sell order `max_sell_amount == sell_amount` and
/// `min_buy_amount <= buy_amount`; for a buy order `min_buy_amount ==
/// buy_amount` and `max_sell_amount >= sell_amount`. At slippage 0 both
/// bounds collapse to the exact amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceQuoteResponse {
	pub sell_amount: U256,
	pub max_sell_amount: U256,
	pub buy_amount: U256,
	pub min_buy_amount: U256,
	pub kind: OrderKind,
	/// Address that must be authorized to move the sell token.
	pub allowance_target: Address,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_gas: Option<U256>,
	pub tx: QuoteTransaction,
}

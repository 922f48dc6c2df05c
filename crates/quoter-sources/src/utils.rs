//! Helpers shared by quote source adapters.

use quoter_types::slippage::slippage_bounds;
use quoter_types::{
	Address, OrderKind, QuoteTransaction, SourceQuoteRequest, SourceQuoteResponse, U256,
	NATIVE_TOKEN,
};

use crate::SourceQueryError;

/// A provider response before slippage bounds are attached.
#[derive(Debug, Clone)]
pub struct PartialQuote {
	pub sell_amount: U256,
	pub buy_amount: U256,
	pub estimated_gas: Option<U256>,
	pub allowance_target: Address,
	pub tx: QuoteTransaction,
}

/// Attaches `max_sell_amount`/`min_buy_amount` bounds to a partial quote.
pub fn attach_slippage(
	quote: PartialQuote,
	kind: OrderKind,
	slippage_percentage: f64,
) -> SourceQuoteResponse {
	let (max_sell_amount, min_buy_amount) =
		slippage_bounds(kind, quote.sell_amount, quote.buy_amount, slippage_percentage);
	SourceQuoteResponse {
		sell_amount: quote.sell_amount,
		max_sell_amount,
		buy_amount: quote.buy_amount,
		min_buy_amount,
		kind,
		allowance_target: quote.allowance_target,
		estimated_gas: quote.estimated_gas,
		tx: quote.tx,
	}
}

/// Selling the native token needs no allowance, so the target collapses to
/// the zero address; otherwise the provider-reported spender is used.
pub fn calculate_allowance_target(sell_token: Address, spender: Address) -> Address {
	if sell_token == NATIVE_TOKEN {
		Address::ZERO
	} else {
		spender
	}
}

/// Builds the standard adapter failure for this request.
pub fn failed(
	source_name: &str,
	request: &SourceQuoteRequest,
	reason: impl Into<String>,
) -> SourceQueryError {
	SourceQueryError {
		source_name: source_name.to_string(),
		chain_id: request.chain_id,
		sell_token: request.sell_token,
		buy_token: request.buy_token,
		reason: reason.into(),
	}
}

/// Parses a provider-reported decimal amount string.
pub fn parse_amount(value: &str) -> Result<U256, String> {
	U256::from_str_radix(value.trim(), 10).map_err(|e| format!("invalid amount '{value}': {e}"))
}

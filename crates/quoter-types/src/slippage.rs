//! Slippage bound arithmetic.
//!
//! Percentages are converted to integer basis points so that bounds are
//! computed with exact integer math: the buy bound rounds down, the sell
//! bound rounds up, and at 0% both bounds equal the unadjusted amount.

use crate::common::U256;
use crate::quote::OrderKind;

const BPS_DENOMINATOR: u64 = 10_000;

/// Converts a percentage (`0 <= p < 100`) to basis points.
pub fn slippage_bps(slippage_percentage: f64) -> u64 {
	(slippage_percentage * 100.0).round() as u64
}

/// Worst-case received amount: `floor(buy_amount * (1 - p / 100))`.
pub fn min_buy_amount(buy_amount: U256, slippage_percentage: f64) -> U256 {
	let bps = slippage_bps(slippage_percentage);
	buy_amount * U256::from(BPS_DENOMINATOR - bps) / U256::from(BPS_DENOMINATOR)
}

/// Worst-case spent amount: `ceil(sell_amount * (1 + p / 100))`.
pub fn max_sell_amount(sell_amount: U256, slippage_percentage: f64) -> U256 {
	let bps = slippage_bps(slippage_percentage);
	let scaled = sell_amount * U256::from(BPS_DENOMINATOR + bps);
	let denominator = U256::from(BPS_DENOMINATOR);
	(scaled + denominator - U256::from(1u64)) / denominator
}

/// Derives both bounds for the given order side.
///
/// The exact side of the order is never widened: a sell order spends exactly
/// `sell_amount`, a buy order receives exactly `buy_amount`.
pub fn slippage_bounds(
	kind: OrderKind,
	sell_amount: U256,
	buy_amount: U256,
	slippage_percentage: f64,
) -> (U256, U256) {
	match kind {
		OrderKind::Sell => (sell_amount, min_buy_amount(buy_amount, slippage_percentage)),
		OrderKind::Buy => (max_sell_amount(sell_amount, slippage_percentage), buy_amount),
	}
}

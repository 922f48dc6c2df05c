//! Chain-data collaborator interfaces.
//!
//! The engine never reads the chain itself; token metadata and gas prices
//! are supplied by injected services and wrapped behind per-call
//! `SharedLazyValue` handles by the orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::{Address, ChainId, U256};

/// Basic metadata for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
	pub symbol: String,
	pub decimals: u8,
}

/// Metadata for the sell/buy pair of a quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPairMetadata {
	pub sell_token: TokenMetadata,
	pub buy_token: TokenMetadata,
}

/// Current gas price in wei.
pub type GasPrice = U256;

/// Resolves token metadata for a sell/buy pair.
#[async_trait]
pub trait TokenMetadataSource: Send + Sync {
	async fn token_pair(
		&self,
		chain_id: ChainId,
		sell_token: Address,
		buy_token: Address,
	) -> anyhow::Result<TokenPairMetadata>;
}

/// Resolves the current gas price for a chain.
#[async_trait]
pub trait GasPriceSource: Send + Sync {
	async fn gas_price(&self, chain_id: ChainId) -> anyhow::Result<GasPrice>;
}

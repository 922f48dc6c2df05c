//! Common aliases used throughout the quoting engine.

// Re-export commonly used ethereum primitives
pub use alloy_primitives::{address, Address, Bytes, U256};

/// Chain identifier (EVM chain id).
pub type ChainId = u64;

/// Stable identifier distinguishing one provider within a source list.
pub type SourceId = String;

/// Sentinel address used by providers to represent the chain's native token.
pub const NATIVE_TOKEN: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

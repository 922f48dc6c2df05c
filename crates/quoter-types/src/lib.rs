//! Shared types for the swap quote aggregation engine.
//!
//! This crate defines the normalized data model exchanged between the
//! orchestrator, source lists, and individual quote source adapters, plus
//! the shared lazy-value primitive used to deduplicate ancillary lookups
//! within a single aggregation call.

pub mod chain_data;
pub mod common;
pub mod quote;
pub mod shared_lazy;
pub mod slippage;

pub use chain_data::*;
pub use common::*;
pub use quote::*;
pub use shared_lazy::*;

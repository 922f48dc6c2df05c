//! Composite source list that partitions source ids across nested lists.
//!
//! One default list handles everything not explicitly claimed; each
//! override entry owns an explicit id subset. The ownership partition is
//! fixed and validated at construction.

use async_trait::async_trait;
use quoter_types::{
	QuoteSourceMetadata, QuoteTransaction, SourceId, SourceQuoteResponse,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::{BuildTxRequest, SourceList, SourceListError, SourceListQuoteRequest};

/// Construction-time configuration error for the composite list.
#[derive(Debug, Error)]
pub enum OverridableListError {
	/// Overlapping ownership is a configuration bug, not a runtime
	/// condition: routing must be unambiguous.
	#[error("source '{0}' is claimed by more than one override entry")]
	AmbiguousOverrideOwnership(SourceId),

	#[error("override collection must not be empty")]
	EmptyOverrides,
}

/// One override: a nested list plus the source ids it owns.
pub struct OverrideEntry {
	pub list: Arc<dyn SourceList>,
	pub source_ids: Vec<SourceId>,
}

pub struct OverridableSourceList {
	default_list: Arc<dyn SourceList>,
	overrides: Vec<OverrideEntry>,
}

impl std::fmt::Debug for OverridableSourceList {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OverridableSourceList").finish_non_exhaustive()
	}
}

impl OverridableSourceList {
	pub fn new(
		default_list: Arc<dyn SourceList>,
		overrides: Vec<OverrideEntry>,
	) -> Result<Self, OverridableListError> {
		if overrides.is_empty() {
			return Err(OverridableListError::EmptyOverrides);
		}

		let mut claimed: HashSet<&str> = HashSet::new();
		for entry in &overrides {
			for source_id in &entry.source_ids {
				if !claimed.insert(source_id.as_str()) {
					return Err(OverridableListError::AmbiguousOverrideOwnership(
						source_id.clone(),
					));
				}
			}
		}

		Ok(Self { default_list, overrides })
	}

	/// First override entry owning the id wins, in declaration order; no
	/// match routes to the default list.
	fn route(&self, source_id: &str) -> &Arc<dyn SourceList> {
		for entry in &self.overrides {
			if entry.source_ids.iter().any(|id| id == source_id) {
				debug!("Routing source '{}' to its override list", source_id);
				return &entry.list;
			}
		}
		&self.default_list
	}
}

#[async_trait]
impl SourceList for OverridableSourceList {
	fn sources(&self) -> HashMap<SourceId, QuoteSourceMetadata> {
		let mut sources = self.default_list.sources();
		for entry in &self.overrides {
			// Only the owned subset is surfaced: an override list may expose
			// more sources than it was granted, but those never route here.
			let exposed = entry.list.sources();
			for source_id in &entry.source_ids {
				if let Some(metadata) = exposed.get(source_id) {
					sources.insert(source_id.clone(), metadata.clone());
				}
			}
		}
		sources
	}

	async fn quote(
		&self,
		source_id: &str,
		request: SourceListQuoteRequest,
	) -> Result<SourceQuoteResponse, SourceListError> {
		self.route(source_id).quote(source_id, request).await
	}

	async fn build_tx(
		&self,
		source_id: &str,
		request: BuildTxRequest,
	) -> Result<QuoteTransaction, SourceListError> {
		self.route(source_id).build_tx(source_id, request).await
	}
}

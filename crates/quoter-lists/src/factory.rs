//! Factory mapping the tagged source-list configuration to a constructed
//! list.

use quoter_config::SourceListSettings;
use quoter_transport::FetchService;
use quoter_types::SourceId;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::api::{ApiSourceList, ApiSourceListConfig};
use crate::local::{LocalSourceList, LocalSourceListConfig};
use crate::overridable::{OverridableListError, OverridableSourceList, OverrideEntry};
use crate::SourceList;

/// Closed tagged choice of source-list kinds.
pub enum SourceListInput {
	/// An externally supplied list instance.
	Custom(Arc<dyn SourceList>),
	/// In-process adapters from the built-in registry.
	Local(LocalSourceListConfig),
	/// Remote aggregation endpoint.
	Api(ApiSourceListConfig),
	/// Partitioned composite of nested lists.
	Overridable {
		default: Box<SourceListInput>,
		overrides: Vec<OverrideInput>,
	},
}

pub struct OverrideInput {
	pub list: SourceListInput,
	pub source_ids: Vec<SourceId>,
}

impl From<SourceListSettings> for SourceListInput {
	fn from(settings: SourceListSettings) -> Self {
		match settings {
			SourceListSettings::Local { global, per_source } => {
				SourceListInput::Local(LocalSourceListConfig { global, per_source })
			}
			SourceListSettings::Api { base_url, sources } => {
				SourceListInput::Api(ApiSourceListConfig { base_url, sources })
			}
			SourceListSettings::Overridable { default, overrides } => {
				SourceListInput::Overridable {
					default: Box::new((*default).into()),
					overrides: overrides
						.into_iter()
						.map(|entry| OverrideInput {
							list: entry.list.into(),
							source_ids: entry.source_ids,
						})
						.collect(),
				}
			}
		}
	}
}

#[derive(Debug, Error)]
pub enum BuildListError {
	#[error(transparent)]
	Overridable(#[from] OverridableListError),
}

/// Builds a source list from its configuration. Construction-time errors
/// (ambiguous override ownership, empty overrides) are fatal: the list never
/// enters service.
pub fn build_source_list(
	input: SourceListInput,
	fetch: Arc<dyn FetchService>,
) -> Result<Arc<dyn SourceList>, BuildListError> {
	match input {
		SourceListInput::Custom(list) => Ok(list),
		SourceListInput::Local(config) => {
			info!("Building local source list");
			Ok(Arc::new(LocalSourceList::with_defaults(config, fetch)))
		}
		SourceListInput::Api(config) => {
			info!("Building API source list against {}", config.base_url);
			Ok(Arc::new(ApiSourceList::new(config, fetch)))
		}
		SourceListInput::Overridable { default, overrides } => {
			let default_list = build_source_list(*default, Arc::clone(&fetch))?;
			let overrides = overrides
				.into_iter()
				.map(|entry| {
					Ok(OverrideEntry {
						list: build_source_list(entry.list, Arc::clone(&fetch))?,
						source_ids: entry.source_ids,
					})
				})
				.collect::<Result<Vec<_>, BuildListError>>()?;
			info!("Building overridable source list with {} overrides", overrides.len());
			Ok(Arc::new(OverridableSourceList::new(default_list, overrides)?))
		}
	}
}

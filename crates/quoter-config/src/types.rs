//! Configuration types for the quoting engine.

use quoter_sources::GlobalSourceConfig;
use quoter_types::{QuoteSourceMetadata, SourceId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoterConfig {
	pub quotes: QuotesSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotesSettings {
	/// Per-source deadline applied when a request does not carry its own.
	#[serde(default = "default_timeout_ms")]
	pub default_timeout_ms: u64,
	pub source_list: SourceListSettings,
}

pub(crate) fn default_timeout_ms() -> u64 {
	5_000
}

/// Tagged choice of source-list kinds, as it appears in configuration
/// files. The `custom` variant of the runtime union cannot be expressed in
/// configuration; it is only available programmatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceListSettings {
	Local {
		#[serde(default)]
		global: GlobalSourceConfig,
		#[serde(default)]
		per_source: HashMap<SourceId, serde_json::Value>,
	},
	Api {
		base_url: String,
		sources: HashMap<SourceId, QuoteSourceMetadata>,
	},
	Overridable {
		default: Box<SourceListSettings>,
		overrides: Vec<OverrideSettings>,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideSettings {
	pub list: SourceListSettings,
	pub source_ids: Vec<SourceId>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_local_list() {
		let config: QuoterConfig = toml::from_str(
			r#"
			[quotes]
			default_timeout_ms = 3000

			[quotes.source_list]
			type = "local"

			[quotes.source_list.per_source.changelly]
			api_key = "secret"
			"#,
		)
		.unwrap();

		assert_eq!(config.quotes.default_timeout_ms, 3000);
		match config.quotes.source_list {
			SourceListSettings::Local { per_source, .. } => {
				assert_eq!(per_source["changelly"]["api_key"], "secret");
			}
			other => panic!("unexpected list kind: {other:?}"),
		}
	}

	#[test]
	fn test_parse_api_list() {
		let config: QuoterConfig = toml::from_str(
			r#"
			[quotes.source_list]
			type = "api"
			base_url = "https://aggregator.example"

			[quotes.source_list.sources.remote]
			name = "Remote"
			supported_chains = [1, 10]
			logo_uri = ""
			supports = { buy_orders = true, swap_and_transfer = false }
			"#,
		)
		.unwrap();

		// Default applies when the field is omitted
		assert_eq!(config.quotes.default_timeout_ms, 5_000);
		match config.quotes.source_list {
			SourceListSettings::Api { base_url, sources } => {
				assert_eq!(base_url, "https://aggregator.example");
				assert!(sources["remote"].supports.buy_orders);
				assert_eq!(sources["remote"].supported_chains, vec![1, 10]);
			}
			other => panic!("unexpected list kind: {other:?}"),
		}
	}

	#[test]
	fn test_parse_overridable_list() {
		let config: QuoterConfig = toml::from_str(
			r#"
			[quotes.source_list]
			type = "overridable"

			[quotes.source_list.default]
			type = "local"

			[[quotes.source_list.overrides]]
			source_ids = ["0x"]

			[quotes.source_list.overrides.list]
			type = "api"
			base_url = "https://aggregator.example"
			sources = {}
			"#,
		)
		.unwrap();

		match config.quotes.source_list {
			SourceListSettings::Overridable { default, overrides } => {
				assert!(matches!(*default, SourceListSettings::Local { .. }));
				assert_eq!(overrides.len(), 1);
				assert_eq!(overrides[0].source_ids, vec!["0x"]);
			}
			other => panic!("unexpected list kind: {other:?}"),
		}
	}
}

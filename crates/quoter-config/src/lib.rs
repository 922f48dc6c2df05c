// quoter-config/src/lib.rs

use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub mod types;

pub use types::{OverrideSettings, QuoterConfig, QuotesSettings, SourceListSettings};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "QUOTER_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<QuoterConfig, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		self.apply_env_overrides(&mut config)?;
		self.validate_config(&config)?;

		info!("Loaded quoter configuration");
		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<QuoterConfig, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;
		let substituted_content = self.substitute_env_vars(&content)?;

		let config: QuoterConfig = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut QuoterConfig) -> Result<(), ConfigError> {
		if let Ok(timeout_ms) = env::var(format!("{}DEFAULT_TIMEOUT_MS", self.env_prefix)) {
			config.quotes.default_timeout_ms = timeout_ms.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid default timeout: {}", e))
			})?;
		}

		Ok(())
	}

	fn validate_config(&self, config: &QuoterConfig) -> Result<(), ConfigError> {
		if config.quotes.default_timeout_ms == 0 {
			return Err(ConfigError::ValidationError(
				"Default timeout must be greater than zero".to_string(),
			));
		}
		validate_list(&config.quotes.source_list)
	}
}

fn validate_list(list: &SourceListSettings) -> Result<(), ConfigError> {
	match list {
		SourceListSettings::Local { .. } => Ok(()),
		SourceListSettings::Api { base_url, .. } => {
			if base_url.is_empty() {
				return Err(ConfigError::ValidationError(
					"API source list base_url must not be empty".to_string(),
				));
			}
			Ok(())
		}
		SourceListSettings::Overridable { default, overrides } => {
			if overrides.is_empty() {
				return Err(ConfigError::ValidationError(
					"Overridable source list requires at least one override".to_string(),
				));
			}
			validate_list(default)?;
			for entry in overrides {
				validate_list(&entry.list)?;
			}
			Ok(())
		}
	}
}

//! HTTP transport collaborator for the quoting engine.
//!
//! Every HTTP-backed source and the API-backed source list talk to the
//! network exclusively through the `FetchService` trait, which keeps the
//! engine testable with in-memory fakes and leaves per-request cancellation
//! to the transport implementation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod reqwest;
}

pub use implementations::reqwest::ReqwestFetchService;

#[derive(Debug, Error)]
pub enum FetchError {
	#[error("request to {url} failed: {reason}")]
	Request { url: String, reason: String },

	#[error("response body could not be decoded: {0}")]
	Decode(String),
}

/// HTTP method for a fetch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMethod {
	#[default]
	Get,
	Post,
}

/// Options for one fetch call.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
	pub method: FetchMethod,
	pub headers: HashMap<String, String>,
	/// Per-request deadline; the implementation must abort the request when
	/// it elapses.
	pub timeout: Option<Duration>,
	/// JSON body, sent for POST requests.
	pub body: Option<serde_json::Value>,
}

impl FetchOptions {
	pub fn get() -> Self {
		Self::default()
	}

	pub fn post_json(body: serde_json::Value) -> Self {
		Self {
			method: FetchMethod::Post,
			body: Some(body),
			..Self::default()
		}
	}

	pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());
		self
	}
}

/// Raw response of a fetch call.
#[derive(Debug, Clone)]
pub struct FetchResponse {
	status: u16,
	body: Vec<u8>,
}

impl FetchResponse {
	pub fn new(status: u16, body: Vec<u8>) -> Self {
		Self { status, body }
	}

	pub fn status(&self) -> u16 {
		self.status
	}

	/// Whether the status code is in the 2xx range.
	pub fn ok(&self) -> bool {
		(200..300).contains(&self.status)
	}

	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
		serde_json::from_slice(&self.body).map_err(|e| FetchError::Decode(e.to_string()))
	}
}

/// Narrow transport capability consumed by sources and lists.
#[async_trait]
pub trait FetchService: Send + Sync {
	async fn fetch(&self, url: &str, options: FetchOptions) -> Result<FetchResponse, FetchError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_response_status_classification() {
		assert!(FetchResponse::new(200, Vec::new()).ok());
		assert!(FetchResponse::new(204, Vec::new()).ok());
		assert!(!FetchResponse::new(404, Vec::new()).ok());
		assert!(!FetchResponse::new(500, Vec::new()).ok());
	}

	#[test]
	fn test_response_json_decoding() {
		let response = FetchResponse::new(200, br#"{"value": 7}"#.to_vec());
		let decoded: serde_json::Value = response.json().unwrap();
		assert_eq!(decoded["value"], 7);

		let garbage = FetchResponse::new(200, b"not json".to_vec());
		assert!(garbage.json::<serde_json::Value>().is_err());
	}

	#[test]
	fn test_options_builder() {
		let options = FetchOptions::post_json(serde_json::json!({"a": 1}))
			.with_timeout(Some(Duration::from_millis(500)))
			.with_header("X-Api-Key", "secret");
		assert_eq!(options.method, FetchMethod::Post);
		assert_eq!(options.timeout, Some(Duration::from_millis(500)));
		assert_eq!(options.headers.get("X-Api-Key").unwrap(), "secret");
	}
}

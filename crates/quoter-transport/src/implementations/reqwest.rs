//! reqwest-backed `FetchService` implementation.

use async_trait::async_trait;
use tracing::debug;

use crate::{FetchError, FetchMethod, FetchOptions, FetchResponse, FetchService};

/// Production transport built on a shared `reqwest::Client`.
///
/// Dropping an in-flight request (e.g. when the orchestrator abandons a
/// timed-out source task) cancels it at the connection level, so abandoned
/// tasks do not leak network resources.
#[derive(Clone, Default)]
pub struct ReqwestFetchService {
	client: reqwest::Client,
}

impl ReqwestFetchService {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl FetchService for ReqwestFetchService {
	async fn fetch(&self, url: &str, options: FetchOptions) -> Result<FetchResponse, FetchError> {
		let mut builder = match options.method {
			FetchMethod::Get => self.client.get(url),
			FetchMethod::Post => self.client.post(url),
		};

		for (name, value) in &options.headers {
			builder = builder.header(name, value);
		}
		if let Some(timeout) = options.timeout {
			builder = builder.timeout(timeout);
		}
		if let Some(body) = &options.body {
			builder = builder.json(body);
		}

		debug!("Fetching {} ({:?})", url, options.method);

		let response = builder.send().await.map_err(|e| FetchError::Request {
			url: url.to_string(),
			reason: e.to_string(),
		})?;

		let status = response.status().as_u16();
		let body = response
			.bytes()
			.await
			.map_err(|e| FetchError::Request {
				url: url.to_string(),
				reason: e.to_string(),
			})?
			.to_vec();

		Ok(FetchResponse::new(status, body))
	}
}

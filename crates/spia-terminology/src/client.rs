//! HTTP client for a FHIR terminology server.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TerminologyError};
use crate::retry::RetryPolicy;

/// Public CSIRO Ontoserver endpoint for FHIR R4.
pub const DEFAULT_SERVER: &str = "https://r4.ontoserver.csiro.au/fhir";

const FHIR_JSON: &str = "application/fhir+json";
const USER_AGENT_VALUE: &str = concat!("spia-fhir/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for the terminology server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminologyConfig {
    /// FHIR base URL, with or without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; later retries wait proportionally longer.
    pub backoff_ms: u64,
}

impl Default for TerminologyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER.to_string(),
            timeout_secs: 60,
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

impl TerminologyConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_ms))
    }
}

/// Transport for terminology operations.
///
/// Requests and responses are FHIR JSON resources. Implementations must be
/// shareable across threads because reference sets may be parsed in
/// parallel.
pub trait TerminologyService: Send + Sync {
    /// Submits a `batch` Bundle and returns the `batch-response` Bundle.
    fn batch(&self, bundle: &Value) -> Result<Value>;

    /// Executes a single `CodeSystem/$lookup` with a Parameters resource.
    fn lookup(&self, parameters: &Value) -> Result<Value>;
}

/// Blocking FHIR terminology client with timeouts and bounded retries.
#[derive(Debug, Clone)]
pub struct FhirTerminologyClient {
    client: reqwest::blocking::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl FhirTerminologyClient {
    /// Creates a client for the configured server.
    pub fn new(config: &TerminologyConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TerminologyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry_policy(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, url: &str, body: &Value) -> Result<Value> {
        let payload = serde_json::to_vec(body)?;
        self.retry.run(|| {
            tracing::debug!("POST {}", url);
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, FHIR_JSON)
                .body(payload.clone())
                .send()?;
            let status = response.status();
            let text = response.text()?;
            if !status.is_success() {
                return Err(TerminologyError::Status {
                    status: status.as_u16(),
                    body: truncate(&text, MAX_ERROR_BODY),
                });
            }
            Ok(serde_json::from_str(&text)?)
        })
    }
}

impl TerminologyService for FhirTerminologyClient {
    fn batch(&self, bundle: &Value) -> Result<Value> {
        self.post(&self.base_url, bundle)
    }

    fn lookup(&self, parameters: &Value) -> Result<Value> {
        let url = format!("{}/CodeSystem/$lookup", self.base_url);
        self.post(&url, parameters)
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let config = TerminologyConfig {
            base_url: "http://localhost:8080/fhir/".to_string(),
            ..TerminologyConfig::default()
        };
        let client = FhirTerminologyClient::new(&config).expect("client");
        assert_eq!(client.base_url(), "http://localhost:8080/fhir");
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[test]
    fn config_defaults_apply_to_missing_fields() {
        let config: TerminologyConfig =
            serde_json::from_str(r#"{"base_url":"http://tx.example/fhir"}"#).expect("config");
        assert_eq!(config.base_url, "http://tx.example/fhir");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout_secs, 60);
    }
}

//! API key validation logic

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

/// Substring the endpoint returns in the body when a key is rejected
pub const FAILURE_MARKER: &str = "Could not authenticate";

/// Per-key transport failure. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request could not be built or sent (bad URL, connection refused, DNS...)
    #[error("Error sending request: {0}")]
    Request(String),

    /// Response arrived but its body could not be read
    #[error("Error reading response body: {0}")]
    Body(String),
}

/// Black-box GET: takes a full URL, returns the response body.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<String, TransportError>;
}

/// Blocking HTTP transport backed by a single shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client with default transport settings and no request timeout
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        // Status codes are ignored; only the body is inspected.
        response
            .text()
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}

/// Raw outcome of one network call, before inversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub contains_failure_marker: bool,
    pub body: String,
    pub error: Option<TransportError>,
}

/// Result of validating a single API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub key: String,
    pub is_valid: bool,
    pub body: String,
    /// Transport failure, if any. Such keys are always invalid.
    pub error: Option<TransportError>,
}

impl ValidationResult {
    /// Invert a probe: a body carrying the failure marker means the key is invalid.
    ///
    /// A transport error also yields an invalid result, so network trouble and a
    /// rejected key look the same to the reporter.
    pub fn from_probe(key: &str, probe: Probe) -> Self {
        let is_valid = probe.error.is_none() && !probe.contains_failure_marker;
        Self {
            key: key.to_string(),
            is_valid,
            body: probe.body,
            error: probe.error,
        }
    }
}

/// Checks keys against one endpoint template
pub struct Validator<T: Transport = HttpTransport> {
    transport: T,
    endpoint: String,
}

impl<T: Transport> Validator<T> {
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The key is appended to the template as-is, without escaping.
    pub fn request_url(&self, key: &str) -> String {
        format!("{}{}", self.endpoint, key)
    }

    /// Issue one GET for `key` and test the body for the failure marker
    ///
    /// # Returns
    /// A `Probe` whose `contains_failure_marker` is `false` and `body` empty
    /// when the request or body read failed.
    pub fn probe(&self, key: &str) -> Probe {
        match self.transport.get(&self.request_url(key)) {
            Ok(body) => Probe {
                contains_failure_marker: body.contains(FAILURE_MARKER),
                body,
                error: None,
            },
            Err(e) => Probe {
                contains_failure_marker: false,
                body: String::new(),
                error: Some(e),
            },
        }
    }

    /// Probe `key` and classify it
    pub fn validate(&self, key: &str) -> ValidationResult {
        ValidationResult::from_probe(key, self.probe(key))
    }
}

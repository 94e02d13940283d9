//! HTTP transport to the Axiom ingest API.

use crate::application::ports::Transport;
use crate::domain::event::Event;
use crate::error::{BuildError, TransportError};
use crate::infrastructure::config::AxiomConfig;
use crate::infrastructure::transport::document::IngestDocument;
use reqwest::blocking::Client;
use std::fmt;

/// Sends each event as a one-document batch to the ingest endpoint.
///
/// Uses the blocking reqwest client, so `send` must not run on an async
/// runtime worker thread. One attempt per event; the configured timeout
/// bounds how long a logging call can block.
#[derive(Clone)]
pub struct AxiomTransport {
    client: Client,
    ingest_url: String,
    token: String,
}

impl AxiomTransport {
    /// Create a transport for the given configuration.
    ///
    /// # Errors
    /// Returns `BuildError::Config` if the dataset name is not URL-safe and
    /// `BuildError::HttpClient` if the HTTP client cannot be created.
    pub fn new(config: &AxiomConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BuildError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            ingest_url: config.ingest_url(),
            token: config.token.clone(),
        })
    }

    /// The ingest endpoint this transport posts to.
    pub fn ingest_url(&self) -> &str {
        &self.ingest_url
    }
}

impl Transport for AxiomTransport {
    fn send(&self, event: &Event) -> Result<(), TransportError> {
        let batch = [IngestDocument::from(event)];
        let response = self
            .client
            .post(&self.ingest_url)
            .bearer_auth(&self.token)
            .json(&batch)
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(TransportError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl fmt::Debug for AxiomTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxiomTransport")
            .field("ingest_url", &self.ingest_url)
            .finish_non_exhaustive()
    }
}

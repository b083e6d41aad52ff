//! Event ingestion
//!
//! Two payload families exist: structured events (pre-parsed field maps with
//! timestamps, routed by tags) and unstructured messages (raw lines run through a
//! server-side parser). Both are exposed on the full [`Client`] via
//! repository-scoped endpoints and on the token-scoped [`IngestClient`].

use crate::config::TransportConfig;
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{StructuredEvents, UnstructuredEvents};

impl super::Client {
    /// Send batches of structured, pre-parsed events to this client's repository.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use chrono::Utc;
    /// use loghive_client::{Client, StructuredEvent, StructuredEvents};
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), loghive_client::Error> {
    /// # let client = Client::new("http://localhost:3000", "sandbox", "token")?;
    /// client
    ///     .ingest_structured(&[StructuredEvents {
    ///         tags: None,
    ///         events: vec![StructuredEvent {
    ///             timestamp: Utc::now(),
    ///             attributes: json!({ "loglevel": "INFO", "message": "service started" }),
    ///         }],
    ///     }])
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn ingest_structured(&self, batches: &[StructuredEvents]) -> Result<()> {
        let endpoint = format!("dataspaces/{}/ingest", self.repository());
        self.transport()
            .post_json(&endpoint, self.token(), batches)
            .await?;
        tracing::debug!(repository = %self.repository(), batches = batches.len(), "ingested structured events");
        Ok(())
    }

    /// Send a batch of unstructured message lines to this client's repository.
    ///
    /// The server parses the lines with the batch's parser (or the repository
    /// default) before storing them.
    pub async fn ingest_messages(&self, batch: &UnstructuredEvents) -> Result<()> {
        let endpoint = format!("dataspaces/{}/ingest-messages", self.repository());
        // The endpoint takes a list of batches; a single batch is the common case.
        self.transport()
            .post_json(&endpoint, self.token(), std::slice::from_ref(batch))
            .await?;
        tracing::debug!(repository = %self.repository(), messages = batch.messages.len(), "ingested messages");
        Ok(())
    }
}

/// Ingest-only client authorized by an ingest token
///
/// An ingest token is bound server-side to one repository and one parser, so this
/// client takes no repository name and exposes nothing but ingestion. Use it in
/// shippers and appenders that have no business reading data back.
///
/// # Example
///
/// ```no_run
/// use loghive_client::{IngestClient, UnstructuredEvents};
///
/// # async fn example() -> Result<(), loghive_client::Error> {
/// let client = IngestClient::new("http://localhost:3000", "ingest-token")?;
/// client
///     .ingest_messages(&UnstructuredEvents::new(["127.0.0.1 - GET /health 200"]))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct IngestClient {
    ingest_token: String,
    transport: Transport,
}

impl IngestClient {
    /// Create an ingest client with default transport settings
    pub fn new(base_url: &str, ingest_token: impl Into<String>) -> Result<Self> {
        Self::with_config(base_url, ingest_token, &TransportConfig::default())
    }

    /// Create an ingest client with custom transport settings
    pub fn with_config(
        base_url: &str,
        ingest_token: impl Into<String>,
        config: &TransportConfig,
    ) -> Result<Self> {
        Ok(Self {
            ingest_token: ingest_token.into(),
            transport: Transport::new(base_url, config)?,
        })
    }

    /// Send batches of structured, pre-parsed events
    pub async fn ingest_structured(&self, batches: &[StructuredEvents]) -> Result<()> {
        self.transport
            .post_json("ingest/structured", &self.ingest_token, batches)
            .await?;
        tracing::debug!(batches = batches.len(), "ingested structured events");
        Ok(())
    }

    /// Send a batch of unstructured message lines
    pub async fn ingest_messages(&self, batch: &UnstructuredEvents) -> Result<()> {
        self.transport
            .post_json(
                "ingest/unstructured",
                &self.ingest_token,
                std::slice::from_ref(batch),
            )
            .await?;
        tracing::debug!(messages = batch.messages.len(), "ingested messages");
        Ok(())
    }
}

//! Client entry points, organized by API domain:
//! - this module - construction, query jobs, streaming queries, instance status
//! - `ingest` - event ingestion and the ingest-only client
//! - `admin` - user and organization administration
//! - `files` - uploaded-file management
//! - `saved_queries` - saved-query management

mod admin;
mod files;
mod ingest;
mod saved_queries;

pub use ingest::IngestClient;

use crate::config::TransportConfig;
use crate::error::Result;
use crate::query_job::{JobCore, LiveQueryJob, StaticQueryJob};
use crate::stream::EventStream;
use crate::transport::Transport;
use crate::types::{CreatedJob, InstanceStatus, QueryOptions, QueryRequest};

/// Response content type requested for streaming queries
const NDJSON: &str = "application/x-ndjson";

/// Full-access client for one repository on a LogHive instance
///
/// Holds the repository name, the user token authorizing access to it, and a pooled
/// HTTP transport. Cloning is cheap and clones share the connection pool.
///
/// For pure ingestion pipelines prefer [`IngestClient`], which carries an ingest
/// token instead of a user token.
///
/// # Example
///
/// ```no_run
/// use loghive_client::{Client, QueryOptions};
///
/// # async fn example() -> Result<(), loghive_client::Error> {
/// let client = Client::new("http://localhost:3000", "sandbox", "user-token")?;
///
/// let mut job = client
///     .create_query_job("loglevel=ERROR | tail(200)", &QueryOptions::default())
///     .await?;
/// let segment = job.poll().await?;
/// println!("got {} events", segment.events.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    repository: String,
    user_token: String,
    transport: Transport,
}

impl Client {
    /// Create a client with default transport settings.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidUrl`](crate::Error::InvalidUrl) if `base_url` is
    /// not an absolute http(s) URL.
    pub fn new(
        base_url: &str,
        repository: impl Into<String>,
        user_token: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(base_url, repository, user_token, &TransportConfig::default())
    }

    /// Create a client with custom transport settings
    pub fn with_config(
        base_url: &str,
        repository: impl Into<String>,
        user_token: impl Into<String>,
        config: &TransportConfig,
    ) -> Result<Self> {
        Ok(Self {
            repository: repository.into(),
            user_token: user_token.into(),
            transport: Transport::new(base_url, config)?,
        })
    }

    /// Repository this client operates on
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Create a one-shot query job executing asynchronously on the server.
    ///
    /// Query jobs suit live queries and static queries with modest result sizes;
    /// for bulk exports prefer [`streaming_query`](Self::streaming_query), which
    /// does not page through segments.
    ///
    /// # Errors
    ///
    /// An invalid query string is rejected by the server with
    /// [`Error::Http`](crate::Error::Http) (status 400).
    pub async fn create_query_job(
        &self,
        query_string: &str,
        options: &QueryOptions,
    ) -> Result<StaticQueryJob> {
        let core = self.create_job(query_string, false, options).await?;
        Ok(StaticQueryJob::new(core))
    }

    /// Create a continuously refreshed query job.
    ///
    /// The returned handle should be [`close`](LiveQueryJob::close)d when no
    /// longer needed; the server keeps unclosed live jobs around well after the
    /// last poll.
    pub async fn create_live_query_job(
        &self,
        query_string: &str,
        options: &QueryOptions,
    ) -> Result<LiveQueryJob> {
        let core = self.create_job(query_string, true, options).await?;
        Ok(LiveQueryJob::new(core))
    }

    /// Open a streaming query and return its lazy event sequence.
    ///
    /// The preferred way to run static queries with large results. Works for live
    /// queries too (`live = true`), with the caveat that a stream idle for long
    /// enough is dropped by intermediaries — expect
    /// [`Error::ConnectionDropped`](crate::Error::ConnectionDropped) and reconnect.
    pub async fn streaming_query(
        &self,
        query_string: &str,
        live: bool,
        options: &QueryOptions,
    ) -> Result<EventStream> {
        let endpoint = format!("dataspaces/{}/query", self.repository);
        let request = QueryRequest::new(query_string, live.then_some(true), options);
        let response = self
            .transport
            .post_json_streaming(&endpoint, &self.user_token, NDJSON, &request)
            .await?;

        tracing::debug!(repository = %self.repository, live, "opened streaming query");
        Ok(EventStream::new(response))
    }

    /// Health and version of the server instance
    pub async fn status(&self) -> Result<InstanceStatus> {
        let response = self.transport.get("status", &self.user_token).await?;
        Transport::json_body(response).await
    }

    async fn create_job(
        &self,
        query_string: &str,
        live: bool,
        options: &QueryOptions,
    ) -> Result<JobCore> {
        let endpoint = format!("dataspaces/{}/queryjobs", self.repository);
        let request = QueryRequest::new(query_string, live.then_some(true), options);
        let response = self
            .transport
            .post_json(&endpoint, &self.user_token, &request)
            .await?;
        let created: CreatedJob = Transport::json_body(response).await?;

        tracing::debug!(query_id = %created.id, repository = %self.repository, live, "created query job");
        Ok(JobCore::new(
            created.id,
            self.repository.clone(),
            self.user_token.clone(),
            self.transport.clone(),
        ))
    }

    /// Shared accessors for the sibling modules in this directory
    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    pub(crate) fn token(&self) -> &str {
        &self.user_token
    }
}

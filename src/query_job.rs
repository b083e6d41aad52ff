//! Query-job polling state machine
//!
//! A query job is a query executing asynchronously on the server. The server hands
//! back an id at creation time; results are then pulled by polling the job's status
//! endpoint until the current segment reports `done`, respecting the backoff the
//! server attaches to every response.
//!
//! Two variants exist with different exhaustion semantics:
//! - [`StaticQueryJob`] — a one-shot query over a fixed interval; once the server
//!   has no further segments, additional polls are a caller error.
//! - [`LiveQueryJob`] — a continuously refreshed query; polling never exhausts it,
//!   and the server-side resource should be released with [`LiveQueryJob::close`].
//!
//! # Example
//!
//! ```no_run
//! use loghive_client::{Client, QueryOptions};
//!
//! # async fn example() -> Result<(), loghive_client::Error> {
//! let client = Client::new("http://localhost:3000", "sandbox", "token")?;
//! let mut job = client
//!     .create_query_job("loglevel=ERROR", &QueryOptions::default())
//!     .await?;
//!
//! let mut segments = job.poll_until_done();
//! while let Some(segment) = segments.next().await {
//!     for event in segment?.events {
//!         println!("{event}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{PollMetadata, PollResponse};
use std::time::{Duration, Instant};

/// Result of polling one completed segment of query-job results
///
/// Events come bundled with the metadata of the poll that produced them, because
/// the metadata (work progress, continuation state) changes from poll to poll.
#[derive(Clone, Debug)]
pub struct PollResult {
    /// The segment's events, in server order
    pub events: Vec<serde_json::Value>,
    /// Metadata the server attached to the final poll of this segment
    pub metadata: PollMetadata,
}

/// Mutable polling state, updated from every status response
#[derive(Debug)]
struct PollState {
    /// Whether the most recently polled segment has finished computing
    segment_done: bool,
    /// Whether the server reports the job as cancelled
    cancelled: bool,
    /// Whether a subsequent poll may yield more data
    more_segments_available: bool,
    /// Completion time of the most recent status request
    last_poll: Option<Instant>,
    /// Server-dictated minimum delay before the next status request
    next_poll_delay: Duration,
}

impl PollState {
    fn new() -> Self {
        Self {
            segment_done: false,
            cancelled: false,
            more_segments_available: true,
            last_poll: None,
            next_poll_delay: Duration::ZERO,
        }
    }
}

/// Identity and poll state shared by both job variants
#[derive(Debug)]
pub(crate) struct JobCore {
    query_id: String,
    repository: String,
    token: String,
    transport: Transport,
    state: PollState,
}

impl JobCore {
    pub(crate) fn new(
        query_id: String,
        repository: String,
        token: String,
        transport: Transport,
    ) -> Self {
        Self {
            query_id,
            repository,
            token,
            transport,
            state: PollState::new(),
        }
    }

    fn job_endpoint(&self) -> String {
        format!("dataspaces/{}/queryjobs/{}", self.repository, self.query_id)
    }

    /// Wait until the server-dictated backoff has elapsed since the last poll.
    ///
    /// Always passes immediately on the first poll. This is a cooperative
    /// `tokio::time::sleep`, so sibling tasks keep running while the job waits.
    async fn wait_for_backoff(&self) {
        if let Some(last) = self.state.last_poll {
            let elapsed = last.elapsed();
            if elapsed < self.state.next_poll_delay {
                tokio::time::sleep(self.state.next_poll_delay - elapsed).await;
            }
        }
    }

    /// Issue one status request and refresh the poll state from the response
    async fn fetch_next_segment(&mut self) -> Result<PollResult> {
        self.wait_for_backoff().await;

        let endpoint = self.job_endpoint();
        let response = match self.transport.get(&endpoint, &self.token).await {
            Ok(response) => response,
            // A 404 here means the job's server-side lifetime ran out. The job is
            // not recreated automatically: a fresh job would replay segments the
            // caller already consumed, and only the caller can judge that.
            Err(Error::Http { status: 404, body }) => {
                tracing::warn!(query_id = %self.query_id, "query job no longer exists on the server");
                return Err(Error::QueryJobExpired(body));
            }
            Err(e) => return Err(e),
        };
        let poll: PollResponse = Transport::json_body(response).await?;

        self.state.next_poll_delay = Duration::from_millis(poll.meta_data.poll_after);
        self.state.segment_done = poll.done;
        self.state.cancelled = poll.cancelled;
        self.state.last_poll = Some(Instant::now());

        tracing::debug!(
            query_id = %self.query_id,
            done = poll.done,
            events = poll.events.len(),
            poll_after_ms = poll.meta_data.poll_after,
            "fetched query job segment"
        );

        Ok(PollResult {
            events: poll.events,
            metadata: poll.meta_data,
        })
    }

    /// Poll until the current segment is done, then recompute continuation state
    async fn poll(&mut self) -> Result<PollResult> {
        let mut result = self.fetch_next_segment().await?;
        while !self.state.segment_done {
            result = self.fetch_next_segment().await?;
        }

        // Aggregate queries return their full answer in one finished segment;
        // event-list queries continue while the server flags more events.
        self.state.more_segments_available =
            !result.metadata.is_aggregate && result.metadata.has_more_events();

        Ok(result)
    }
}

/// Handle to a one-shot query job over a fixed time interval
///
/// Created by [`Client::create_query_job`](crate::Client::create_query_job).
/// Polling past the final segment fails with
/// [`Error::QueryJobExhausted`]; prefer [`poll_until_done`](Self::poll_until_done),
/// which stops cleanly instead.
#[derive(Debug)]
pub struct StaticQueryJob {
    core: JobCore,
}

impl StaticQueryJob {
    pub(crate) fn new(core: JobCore) -> Self {
        Self { core }
    }

    /// Server-assigned id of this query job
    pub fn query_id(&self) -> &str {
        &self.core.query_id
    }

    /// Repository this job queries
    pub fn repository(&self) -> &str {
        &self.core.repository
    }

    /// Whether a further [`poll`](Self::poll) may yield another segment
    pub fn has_more_segments(&self) -> bool {
        self.core.state.more_segments_available
    }

    /// Whether the server reported the job as cancelled on the last poll
    pub fn is_cancelled(&self) -> bool {
        self.core.state.cancelled
    }

    /// Poll the next segment of results.
    ///
    /// Waits out the server-dictated backoff, then polls until the segment reports
    /// `done`. Fails with [`Error::QueryJobExhausted`] once
    /// [`has_more_segments`](Self::has_more_segments) is false, and with
    /// [`Error::QueryJobExpired`] if the job's server-side lifetime ran out.
    pub async fn poll(&mut self) -> Result<PollResult> {
        if !self.core.state.more_segments_available {
            return Err(Error::QueryJobExhausted);
        }
        self.core.poll().await
    }

    /// Iterate over all remaining segments.
    ///
    /// The first call to [`next`](PollResults::next) always polls (and therefore
    /// reports exhaustion as an error if the job was already drained); afterwards
    /// the sequence ends with `None` once the server has no more segments. The
    /// sequence also ends after any error; a job can only be restarted by creating
    /// a new one.
    pub fn poll_until_done(&mut self) -> PollResults<'_> {
        PollResults {
            job: self,
            first: true,
            finished: false,
        }
    }
}

/// Lazy sequence of the remaining segments of a [`StaticQueryJob`]
///
/// Returned by [`StaticQueryJob::poll_until_done`].
#[derive(Debug)]
pub struct PollResults<'a> {
    job: &'a mut StaticQueryJob,
    first: bool,
    finished: bool,
}

impl PollResults<'_> {
    /// Fetch the next segment, or `None` once the job is drained.
    ///
    /// An `Err` item ends the sequence; subsequent calls return `None`.
    pub async fn next(&mut self) -> Option<Result<PollResult>> {
        if self.finished {
            return None;
        }
        if !self.first && !self.job.core.state.more_segments_available {
            self.finished = true;
            return None;
        }
        self.first = false;

        let polled = self.job.poll().await;
        if polled.is_err() {
            self.finished = true;
        }
        Some(polled)
    }
}

/// Handle to a continuously refreshed query job
///
/// Created by [`Client::create_live_query_job`](crate::Client::create_live_query_job).
/// Query progress never exhausts a live job; it is done when the caller says so.
/// Call [`close`](Self::close) when finished — the server otherwise keeps the job
/// alive for a while after the last poll, holding resources for nothing.
#[derive(Debug)]
pub struct LiveQueryJob {
    core: JobCore,
    closed: bool,
}

impl LiveQueryJob {
    pub(crate) fn new(core: JobCore) -> Self {
        Self { core, closed: false }
    }

    /// Server-assigned id of this query job
    pub fn query_id(&self) -> &str {
        &self.core.query_id
    }

    /// Repository this job queries
    pub fn repository(&self) -> &str {
        &self.core.repository
    }

    /// Whether the server reported the job as cancelled on the last poll
    pub fn is_cancelled(&self) -> bool {
        self.core.state.cancelled
    }

    /// Poll the next segment of results.
    ///
    /// Never fails with [`Error::QueryJobExhausted`]: a live job always has a next
    /// segment eventually. May fail with [`Error::QueryJobExpired`] if the job's
    /// server-side lifetime ran out; creating a replacement job is the caller's
    /// call (see [`Error::QueryJobExpired`] for why it is not automatic).
    pub async fn poll(&mut self) -> Result<PollResult> {
        self.core.poll().await
    }

    /// Release the server-side job resource.
    ///
    /// Best-effort: any failure (including the job already being gone) is logged
    /// at debug level and swallowed — the caller has released the handle and has
    /// no actionable response to a failed delete.
    pub async fn close(mut self) {
        self.closed = true;
        let endpoint = self.core.job_endpoint();
        match self.core.transport.delete(&endpoint, &self.core.token).await {
            Ok(_) => {
                tracing::debug!(query_id = %self.core.query_id, "live query job deleted");
            }
            Err(e) => {
                tracing::debug!(
                    query_id = %self.core.query_id,
                    error = %e,
                    "best-effort live query job deletion failed"
                );
            }
        }
    }
}

impl Drop for LiveQueryJob {
    fn drop(&mut self) {
        if !self.closed {
            // No network from Drop; the server expires unclosed jobs on its own.
            tracing::debug!(
                query_id = %self.core.query_id,
                "live query job dropped without close()"
            );
        }
    }
}

//! # loghive-client
//!
//! Client library for the LogHive log-management platform's HTTP and GraphQL APIs.
//!
//! ## Design Philosophy
//!
//! loghive-client is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Transport-insulating** - Every failure surfaces as one [`Error`] taxonomy;
//!   callers never handle HTTP-library error types
//! - **Server-paced** - Query-job polling honors the backoff the server attaches
//!   to every response instead of inventing its own
//! - **Lazy** - Poll results and streamed events are pulled one step at a time,
//!   never buffered wholesale
//!
//! ## Quick Start
//!
//! ```no_run
//! use loghive_client::{Client, QueryOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("http://localhost:3000", "sandbox", "user-token")?;
//!
//!     // One-shot query job: create, then drain its segments.
//!     let options = QueryOptions {
//!         start: Some("24hours".into()),
//!         ..Default::default()
//!     };
//!     let mut job = client.create_query_job("loglevel=ERROR", &options).await?;
//!     let mut segments = job.poll_until_done();
//!     while let Some(segment) = segments.next().await {
//!         for event in segment?.events {
//!             println!("{event}");
//!         }
//!     }
//!
//!     // Streaming query: one long-lived response, one record per line.
//!     let mut events = client
//!         .streaming_query("loglevel=ERROR", false, &QueryOptions::default())
//!         .await?;
//!     while let Some(event) = events.next_event().await {
//!         println!("{}", event?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Picking a query mode
//!
//! Query jobs ([`Client::create_query_job`], [`Client::create_live_query_job`]) poll
//! a server-side job and suit live dashboards and static queries with modest result
//! sizes. Streaming queries ([`Client::streaming_query`]) hold one socket open and
//! suit bulk exports; for live use they require reconnect handling, see
//! [`Error::ConnectionDropped`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Client types and API methods
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Query-job polling state machine
pub mod query_job;
/// Retry logic with exponential backoff
pub mod retry;
/// Streaming-query response reader
pub mod stream;
/// Wire-facing request and response types
pub mod types;

mod transport;

// Re-export commonly used types
pub use client::{Client, IngestClient};
pub use config::{RetryConfig, TransportConfig};
pub use error::{Error, Result};
pub use query_job::{LiveQueryJob, PollResult, PollResults, StaticQueryJob};
pub use stream::EventStream;
pub use types::{
    ExtraData, FileContent, FileName, InstanceStatus, Organization, PollMetadata, QueryOptions,
    SavedQuery, SavedQueryBody, StructuredEvent, StructuredEvents, TimeBound, UnstructuredEvents,
    User,
};

//! Core types for loghive-client
//!
//! Wire-facing types for query execution, ingestion, and the administrative APIs.
//! Field names follow the server's JSON shapes exactly; undocumented keys are kept
//! in flattened maps rather than dropped, since the server adds metadata between
//! releases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One bound of a query's time interval
///
/// The server accepts either an absolute timestamp in milliseconds since the Unix
/// epoch or a relative expression it parses itself (`"24hours"`, `"30d"`, `"now"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeBound {
    /// Milliseconds since the Unix epoch
    EpochMillis(u64),
    /// Relative time expression evaluated by the server, e.g. `"24hours"`
    Relative(String),
}

impl From<u64> for TimeBound {
    fn from(millis: u64) -> Self {
        TimeBound::EpochMillis(millis)
    }
}

impl From<&str> for TimeBound {
    fn from(expr: &str) -> Self {
        TimeBound::Relative(expr.to_string())
    }
}

impl From<String> for TimeBound {
    fn from(expr: String) -> Self {
        TimeBound::Relative(expr)
    }
}

/// Optional parameters shared by query jobs and streaming queries
///
/// Fields left as `None` are omitted from the request payload entirely; the server
/// applies its own defaults (e.g. a 24-hour search window).
///
/// # Example
///
/// ```
/// use loghive_client::QueryOptions;
///
/// let options = QueryOptions {
///     start: Some("24hours".into()),
///     ..Default::default()
/// };
/// # let _ = options;
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    /// Start of the searched interval
    pub start: Option<TimeBound>,
    /// End of the searched interval
    pub end: Option<TimeBound>,
    /// Timezone offset applied to time expressions, in minutes
    pub timezone_offset_minutes: Option<i32>,
    /// Values for free variables used in the query string
    pub arguments: Option<HashMap<String, String>>,
}

/// Request body for creating query jobs and opening streaming queries
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest<'a> {
    pub query_string: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<&'a TimeBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<&'a TimeBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone_offset_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<&'a HashMap<String, String>>,
}

impl<'a> QueryRequest<'a> {
    pub(crate) fn new(query_string: &'a str, live: Option<bool>, options: &'a QueryOptions) -> Self {
        Self {
            query_string,
            start: options.start.as_ref(),
            end: options.end.as_ref(),
            is_live: live,
            time_zone_offset_minutes: options.timezone_offset_minutes,
            arguments: options.arguments.as_ref(),
        }
    }
}

/// Server response to query-job creation
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedJob {
    pub id: String,
}

/// One poll response from the job-status endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PollResponse {
    pub done: bool,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    pub meta_data: PollMetadata,
}

/// Metadata the server attaches to every poll response
///
/// Only the fields the polling state machine consumes are typed; everything else the
/// server reports lands in [`PollMetadata::other`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollMetadata {
    /// Minimum delay before the next poll, in milliseconds
    #[serde(default)]
    pub poll_after: u64,

    /// Whether the query is an aggregate (e.g. `timechart()`, `count()`)
    ///
    /// Aggregates deliver their complete answer in a single finished segment.
    #[serde(default)]
    pub is_aggregate: bool,

    /// Work units completed so far
    #[serde(default)]
    pub work_done: Option<u64>,

    /// Total work units the query amounts to
    #[serde(default)]
    pub total_work: Option<u64>,

    /// Secondary metadata, including event-list continuation state
    #[serde(default)]
    pub extra_data: ExtraData,

    /// Any metadata keys this crate does not model
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// The `extraData` sub-object of poll metadata
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraData {
    /// `"true"` while an event-list query has further segments to poll
    ///
    /// The server encodes this flag as a string, not a boolean.
    #[serde(default)]
    pub has_more_events: Option<String>,

    /// Unmodeled keys
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl PollMetadata {
    /// Whether the server reports further event segments after this one
    pub fn has_more_events(&self) -> bool {
        self.extra_data.has_more_events.as_deref() == Some("true")
    }
}

/// A batch of structured events sharing one set of tags
///
/// Payload element for the structured ingest endpoints; the endpoint takes a list
/// of these.
#[derive(Clone, Debug, Serialize)]
pub struct StructuredEvents {
    /// Tags routing the events to matching datasources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    /// The events themselves
    pub events: Vec<StructuredEvent>,
}

/// A single pre-parsed event
#[derive(Clone, Debug, Serialize)]
pub struct StructuredEvent {
    /// Event timestamp, serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
    /// Arbitrary event fields
    pub attributes: serde_json::Value,
}

/// A batch of unstructured message lines plus parsing directives
///
/// Fields left as `None` are omitted from the payload; the server then applies
/// repository defaults.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UnstructuredEvents {
    /// Raw message lines to be parsed server-side
    pub messages: Vec<String>,
    /// Name of the parser to run over the messages
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,
    /// Fields added to every event after parsing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<HashMap<String, String>>,
    /// Tags routing the messages to matching datasources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

impl UnstructuredEvents {
    /// Batch of plain messages with no parser, fields, or tags
    pub fn new<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// Health/version report of a server instance
#[derive(Clone, Debug, Deserialize)]
pub struct InstanceStatus {
    /// Overall instance health, `"OK"` when serving
    pub status: String,
    /// Server version string
    #[serde(default)]
    pub version: Option<String>,
    /// Unmodeled keys
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// A user registered on the server instance
#[derive(Clone, Debug, Deserialize)]
pub struct User {
    /// Server-assigned user id
    #[serde(rename = "userID")]
    pub id: String,
    /// Login email, if the account has one
    #[serde(default)]
    pub email: Option<String>,
    /// Remaining account fields (root flag, names, timestamps, …)
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// An organization on the server instance
#[derive(Clone, Debug, Deserialize)]
pub struct Organization {
    /// Server-assigned organization id
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// Name and repository path of an uploaded file
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileName {
    /// File name within the repository
    pub name: String,
    /// Full path, including the repository prefix
    pub path: String,
}

/// A page of rows from an uploaded file
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// Total number of rows in the file
    pub total_lines_count: u64,
    /// Page size used for this fetch
    pub limit: u64,
    /// Row offset of this page
    pub offset: u64,
    /// Column headers
    #[serde(default)]
    pub headers: Vec<String>,
    /// Row data for the requested window
    #[serde(default)]
    pub lines: Vec<serde_json::Value>,
}

/// A saved query stored in a repository
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    /// Server-assigned saved-query id
    pub id: String,
    /// Name the query was saved under
    pub name: String,
    /// Name shown in the UI, when different from `name`
    #[serde(default)]
    pub display_name: Option<String>,
    /// The stored query itself
    #[serde(default)]
    pub query: Option<SavedQueryBody>,
}

/// The query string wrapped inside a [`SavedQuery`]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQueryBody {
    /// The saved query text
    pub query_string: String,
}

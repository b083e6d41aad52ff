//! Streaming-query response reader
//!
//! A streaming query holds one long-lived HTTP response whose body is
//! newline-delimited JSON, one record per line. [`EventStream`] turns that body
//! into a lazy, single-pass sequence of decoded records.
//!
//! The one subtlety is distinguishing endings. A server that is finished closes
//! the stream cleanly and the sequence ends with `None`. A live stream that sits
//! idle too long dies mid-chunk instead — the socket is open but frames stop
//! arriving intact — and that surfaces as
//! [`Error::ConnectionDropped`](crate::Error::ConnectionDropped), so callers can
//! tell "query ended" from "reconnect and resume".

use crate::error::{Error, Result};

/// Lazy reader over a streaming query's newline-delimited JSON response
///
/// Created by [`Client::streaming_query`](crate::Client::streaming_query). Records
/// are yielded in wire order; nothing is buffered beyond the bytes needed to
/// assemble the current line.
///
/// # Example
///
/// ```no_run
/// use loghive_client::{Client, QueryOptions};
///
/// # async fn example() -> Result<(), loghive_client::Error> {
/// let client = Client::new("http://localhost:3000", "sandbox", "token")?;
/// let mut events = client
///     .streaming_query("loglevel=ERROR", false, &QueryOptions::default())
///     .await?;
///
/// while let Some(event) = events.next_event().await {
///     println!("{}", event?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EventStream {
    response: reqwest::Response,
    buf: Vec<u8>,
    eof: bool,
    failed: bool,
}

impl EventStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            buf: Vec::new(),
            eof: false,
            failed: false,
        }
    }

    /// Fetch and decode the next record, or `None` when the stream has ended.
    ///
    /// `None` means the server closed the stream normally. An `Err` item — a
    /// dropped connection or an undecodable record — ends the sequence; subsequent
    /// calls return `None`.
    pub async fn next_event(&mut self) -> Option<Result<serde_json::Value>> {
        if self.failed {
            return None;
        }

        loop {
            // Serve complete lines already buffered; blank lines are keep-alives.
            while let Some(line) = take_line(&mut self.buf) {
                if !is_blank(&line) {
                    return Some(self.decode(line));
                }
            }

            if self.eof {
                // A final record may arrive without a trailing newline.
                if self.buf.is_empty() || is_blank(&self.buf) {
                    self.buf.clear();
                    return None;
                }
                let line = std::mem::take(&mut self.buf);
                return Some(self.decode(line));
            }

            match self.response.chunk().await {
                Ok(Some(chunk)) => self.buf.extend_from_slice(&chunk),
                Ok(None) => {
                    tracing::debug!("streaming query response closed by server");
                    self.eof = true;
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(Error::ConnectionDropped(format!(
                        "connection to streaming socket was lost: {e}"
                    ))));
                }
            }
        }
    }

    fn decode(&mut self, line: Vec<u8>) -> Result<serde_json::Value> {
        match serde_json::from_slice(&line) {
            Ok(value) => Ok(value),
            Err(e) => {
                // An undecodable line means the framing is gone; nothing after it
                // can be trusted either.
                self.failed = true;
                Err(Error::Json(e))
            }
        }
    }
}

/// Split one `\n`-terminated line off the front of `buf`, stripping the
/// terminator and an optional preceding `\r`.
fn take_line(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let pos = buf.iter().position(|&b| b == b'\n')?;
    let mut line: Vec<u8> = buf.drain(..=pos).collect();
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Some(line)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

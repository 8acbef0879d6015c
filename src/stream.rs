//! Server-push text streams.
//!
//! The backend pushes assistant text as `text/event-stream` frames over one
//! long-lived GET. Each event's `data` is a chunk to append to the open
//! message; the payload `[DONE]` ends the stream. A background task reads the
//! body and forwards [`StreamEvent`]s to a [`StreamHandle`], which the caller
//! drains with [`StreamHandle::next`] and closes when finished.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::ClientError;

/// Payload that marks the end of a stream.
pub const SENTINEL: &str = "[DONE]";

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Chunk(String),
    Done,
    Error(ClientError),
}

/// Receiving end of one open stream.
///
/// Closing (explicitly or by drop) aborts the reader task and stops delivery;
/// events already buffered are discarded.
#[derive(Debug)]
pub struct StreamHandle {
    events: mpsc::Receiver<StreamEvent>,
    task: Option<JoinHandle<()>>,
    closed: bool,
}

impl StreamHandle {
    /// Wraps a channel fed by `task` (or by any other producer when `task` is `None`).
    pub fn new(events: mpsc::Receiver<StreamEvent>, task: Option<JoinHandle<()>>) -> Self {
        Self { events, task, closed: false }
    }

    /// Next event, or `None` once the handle is closed or the producer went away
    /// without sending a terminal event.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        if self.closed {
            return None;
        }
        self.events.recv().await
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.events.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens `url` as an event stream. Fails only if the request cannot be sent or
/// the server answers with a non-success status; later failures arrive as
/// [`StreamEvent::Error`].
pub async fn open(
    client: &reqwest::Client,
    endpoint: &'static str,
    url: &str,
) -> Result<StreamHandle, ClientError> {
    debug!("Opening {endpoint} stream at {url}");
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|e| ClientError::network(endpoint, e))?;

    if !response.status().is_success() {
        return Err(ClientError::Status {
            endpoint: endpoint.to_string(),
            status: response.status().as_u16(),
        });
    }

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let task = tokio::spawn(pump(response, endpoint, tx));
    Ok(StreamHandle::new(rx, Some(task)))
}

async fn pump(
    response: reqwest::Response,
    endpoint: &'static str,
    tx: mpsc::Sender<StreamEvent>,
) {
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::default();

    while let Some(read) = body.next().await {
        let bytes = match read {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{endpoint} stream failed: {e}");
                let _ = tx.send(StreamEvent::Error(ClientError::stream(e.to_string()))).await;
                return;
            }
        };

        for data in decoder.push(&bytes) {
            if data == SENTINEL {
                let _ = tx.send(StreamEvent::Done).await;
                return;
            }
            if tx.send(StreamEvent::Chunk(data)).await.is_err() {
                // Receiver closed: the handle was dropped or closed.
                return;
            }
        }
    }

    warn!("{endpoint} stream ended without {SENTINEL}");
    let _ = tx
        .send(StreamEvent::Error(ClientError::stream(format!(
            "{endpoint} connection closed before {SENTINEL}"
        ))))
        .await;
}

/// Incremental `text/event-stream` decoder yielding the `data` of each complete event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (&*line, ""),
            };
            if field == "data" {
                self.data.push(value.to_string());
            }
        }

        events
    }
}

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::backend::{Backend, StreamChannel};
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::formatter::{format_flights, format_hotels};
use crate::models::Message;
use crate::state::{ConversationState, Phase};
use crate::stream::{StreamEvent, StreamHandle, SENTINEL};

pub const ANNOUNCEMENT: &str =
    "Great, I have everything I need. Next I'll look for flights and hotels for you.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationOptions {
    /// Stream the recommendations endpoint after the results are shown.
    pub auto_recommendations: bool,
}

impl From<&ClientConfig> for ConversationOptions {
    fn from(config: &ClientConfig) -> Self {
        Self { auto_recommendations: config.auto_recommendations }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    Busy,
    NoSession,
    Completed,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Ignored(IgnoreReason),
}

struct ActiveStream {
    handle: StreamHandle,
    message_id: String,
}

/// Drives one slot-filling conversation: session creation, status checks,
/// streamed questions, and the final flight/hotel results.
///
/// Owns the only [`ConversationState`]; observers get snapshots through
/// [`ConversationService::subscribe`]. Dropping the service closes any open stream.
pub struct ConversationService<B> {
    backend: B,
    options: ConversationOptions,
    state: ConversationState,
    started: bool,
    active_stream: Option<ActiveStream>,
    updates: watch::Sender<ConversationState>,
}

impl<B: Backend> ConversationService<B> {
    pub fn new(backend: B, options: ConversationOptions) -> Self {
        let state = ConversationState::default();
        let (updates, _) = watch::channel(state.clone());
        Self {
            backend,
            options,
            state,
            started: false,
            active_stream: None,
            updates,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.updates.subscribe()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates the session and asks the first question. Only the first call does anything.
    pub async fn start(&mut self) {
        if self.started {
            debug!("Conversation already started; ignoring start");
            return;
        }
        self.started = true;

        self.state.phase = Phase::Starting;
        self.state.is_loading = true;
        self.state.last_error = None;
        self.publish();

        match self.backend.create_session().await {
            Ok(session_id) => {
                info!("Conversation started with session {session_id}");
                self.state.session_id = Some(session_id.clone());
                self.publish();
                self.check_status(&session_id).await;
            }
            Err(e) => self.fail("start", e),
        }
    }

    /// Sends the user's answer, then moves on to the next question or the results.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        if let Some(reason) = self.ignore_reason(text) {
            debug!("Ignoring submission: {reason:?}");
            return SubmitOutcome::Ignored(reason);
        }
        let Some(session_id) = self.state.session_id.clone() else {
            return SubmitOutcome::Ignored(IgnoreReason::NoSession);
        };

        self.state.push(Message::user(text));
        self.state.phase = Phase::Submitting;
        self.state.is_loading = true;
        self.state.last_error = None;
        self.publish();

        match self.backend.submit_input(&session_id, text).await {
            Ok(()) => self.check_status(&session_id).await,
            Err(e) => self.fail("submit", e),
        }
        SubmitOutcome::Accepted
    }

    /// Closes the open stream, keeping whatever content already arrived.
    pub fn shutdown(&mut self) {
        if self.active_stream.is_some() {
            self.close_stream();
            self.state.is_loading = false;
            self.publish();
        }
    }

    fn ignore_reason(&self, text: &str) -> Option<IgnoreReason> {
        if text.trim().is_empty() {
            Some(IgnoreReason::EmptyInput)
        } else if self.state.is_loading {
            Some(IgnoreReason::Busy)
        } else if self.state.session_id.is_none() {
            Some(IgnoreReason::NoSession)
        } else if self.state.is_complete {
            Some(IgnoreReason::Completed)
        } else if self.state.phase == Phase::Errored {
            Some(IgnoreReason::Errored)
        } else {
            None
        }
    }

    async fn check_status(&mut self, session_id: &str) {
        self.state.is_loading = true;
        match self.backend.slot_status(session_id).await {
            Ok(status) if status.is_complete() => self.complete(session_id).await,
            Ok(status) => {
                debug!("Slots {status:?}; asking next question");
                self.state.phase = Phase::Questioning;
                self.stream_into_message(StreamChannel::SlotQuestion, "slot-stream", session_id)
                    .await;
            }
            Err(e) => self.fail("status check", e),
        }
    }

    async fn complete(&mut self, session_id: &str) {
        info!("Slots complete for session {session_id}; fetching results");
        self.state.phase = Phase::Completing;
        self.state.is_complete = true;
        self.state.push(Message::assistant("status-complete", ANNOUNCEMENT));
        self.publish();

        let (flights, hotels) = tokio::join!(
            self.backend.flights(session_id),
            self.backend.hotels(session_id)
        );
        let flights = flights
            .inspect_err(|e| warn!("Flight results unavailable: {e}"))
            .ok();
        let hotels = hotels
            .inspect_err(|e| warn!("Hotel results unavailable: {e}"))
            .ok();

        self.state
            .push(Message::assistant("flight-info", format_flights(flights.as_deref())));
        self.state
            .push(Message::assistant("hotel-info", format_hotels(hotels.as_deref())));
        self.publish();

        if self.options.auto_recommendations {
            self.stream_into_message(
                StreamChannel::Recommendations,
                "recommendation-stream",
                session_id,
            )
            .await;
        } else {
            self.state.is_loading = false;
        }
        self.state.phase = Phase::Done;
        self.publish();
    }

    /// Appends an empty assistant message and fills it from a fresh stream.
    async fn stream_into_message(&mut self, channel: StreamChannel, kind: &str, session_id: &str) {
        self.close_stream();
        self.state.is_loading = true;
        let message_id = self.state.push(Message::assistant(kind, ""));
        self.publish();

        match self.backend.open_stream(channel, session_id).await {
            Ok(handle) => {
                debug!("{channel:?} stream open for message {message_id}");
                self.active_stream = Some(ActiveStream { handle, message_id });
                self.drain_stream().await;
            }
            Err(e) => self.finish_stream(Some(ClientError::stream(format!(
                "could not open {channel:?} stream: {e}"
            )))),
        }
    }

    async fn drain_stream(&mut self) {
        loop {
            let (event, message_id) = match self.active_stream.as_mut() {
                Some(active) => (active.handle.next().await, active.message_id.clone()),
                None => return,
            };
            match event {
                Some(StreamEvent::Chunk(chunk)) => {
                    self.state.append_to(&message_id, &chunk);
                    self.publish();
                }
                Some(StreamEvent::Done) => return self.finish_stream(None),
                Some(StreamEvent::Error(e)) => return self.finish_stream(Some(e)),
                None => {
                    return self.finish_stream(Some(ClientError::stream(format!(
                        "stream ended without {SENTINEL}"
                    ))))
                }
            }
        }
    }

    /// Stream problems are recoverable: the error is shown and the user may answer again.
    fn finish_stream(&mut self, failure: Option<ClientError>) {
        self.close_stream();
        self.state.is_loading = false;
        if let Some(e) = failure {
            warn!("Stream failed: {e}");
            self.state.last_error = Some(e);
        }
        self.publish();
    }

    fn fail(&mut self, step: &str, e: ClientError) {
        error!("Conversation {step} failed: {e}");
        self.close_stream();
        self.state.phase = Phase::Errored;
        self.state.is_loading = false;
        self.state.last_error = Some(e);
        self.publish();
    }

    fn close_stream(&mut self) {
        if let Some(mut active) = self.active_stream.take() {
            debug!("Closing stream for message {}", active.message_id);
            active.handle.close();
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}

use serde::Serialize;

use crate::errors::ClientError;
use crate::models::Message;

/// Where the conversation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Starting,
    /// A slot question is streaming or has been asked; waiting for the user.
    Questioning,
    Submitting,
    /// Slots are filled; results are being fetched.
    Completing,
    Done,
    /// Terminal. Recovery means starting a new conversation.
    Errored,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Errored)
    }
}

/// Snapshot of one conversation, as shown to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    pub phase: Phase,
    pub session_id: Option<String>,
    pub transcript: Vec<Message>,
    pub is_loading: bool,
    pub is_complete: bool,
    pub last_error: Option<ClientError>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            session_id: None,
            transcript: Vec::new(),
            is_loading: false,
            is_complete: false,
            last_error: None,
        }
    }
}

impl ConversationState {
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.transcript.iter().find(|m| m.id == id)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.transcript.last()
    }

    /// Whether the user may type right now.
    pub fn accepts_input(&self) -> bool {
        self.session_id.is_some()
            && !self.is_loading
            && !self.is_complete
            && self.phase != Phase::Errored
    }

    pub(crate) fn push(&mut self, message: Message) -> String {
        let id = message.id.clone();
        self.transcript.push(message);
        id
    }

    /// Appends `chunk` to the message with `id`. Returns false if no such message exists.
    pub(crate) fn append_to(&mut self, id: &str, chunk: &str) -> bool {
        match self.transcript.iter_mut().rev().find(|m| m.id == id) {
            Some(message) => {
                message.content.push_str(chunk);
                true
            }
            None => false,
        }
    }
}

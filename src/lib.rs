//! Client-side orchestration for a slot-filling travel assistant.
//!
//! [`ConversationService`] creates a backend session, streams the assistant's
//! questions until every slot is filled, then fetches and formats flight and
//! hotel offers into the transcript.

pub mod api;
pub mod backend;
pub mod config;
pub mod errors;
pub mod formatter;
pub mod models;
pub mod service;
pub mod state;
pub mod stream;

pub use backend::{Backend, HttpBackend, StreamChannel};
pub use config::ClientConfig;
pub use errors::ClientError;
pub use service::{ConversationOptions, ConversationService, IgnoreReason, SubmitOutcome};
pub use state::{ConversationState, Phase};

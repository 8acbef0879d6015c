pub mod conversation_service;

pub use conversation_service::{
    ConversationOptions, ConversationService, IgnoreReason, SubmitOutcome, ANNOUNCEMENT,
};

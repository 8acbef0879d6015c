use tracing::debug;

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{SlotStatus, SlotStatusResponse, SubmitRequest};
use crate::stream::{self, StreamHandle};

impl ApiClient {
    /// POST `/slot/collection/start`: hands the user's utterance to the session.
    /// The response body is an acknowledgement and is not inspected.
    pub async fn submit_input(&self, session_id: &str, message: &str) -> Result<(), ClientError> {
        let body = SubmitRequest { session_id, message };
        self.post_json("insert slot", "slot/collection/start", &body).await
    }

    /// GET `/slot/{session_id}`
    pub async fn slot_status(&self, session_id: &str) -> Result<SlotStatus, ClientError> {
        let body: SlotStatusResponse = self
            .get_json("check status", &format!("slot/{session_id}"))
            .await?;
        debug!("Session {session_id} slot status: {:?}", body.status);
        Ok(body.status)
    }

    /// GET `/slot/collection/stream/{session_id}`: the next question, streamed.
    pub async fn open_slot_stream(&self, session_id: &str) -> Result<StreamHandle, ClientError> {
        let url = self.url(&format!("slot/collection/stream/{session_id}"));
        stream::open(self.http(), "slot question", &url).await
    }
}

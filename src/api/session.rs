use tracing::info;

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::NewSessionResponse;

const ENDPOINT: &str = "new session";

impl ApiClient {
    /// GET `/slot/new_session`: opens a server-side conversation and returns its id.
    pub async fn create_session(&self) -> Result<String, ClientError> {
        let body: NewSessionResponse = self.get_json(ENDPOINT, "slot/new_session").await?;
        let session_id = body
            .session_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ClientError::MissingField {
                endpoint: ENDPOINT.to_string(),
                field: "session_id".to_string(),
            })?;
        info!("Session {session_id} created");
        Ok(session_id)
    }
}

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::models::{FlightOffer, HotelOffer, SlotStatus};
use crate::stream::StreamHandle;

/// Which server-push endpoint to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChannel {
    SlotQuestion,
    Recommendations,
}

/// Everything the conversation service needs from the server.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn create_session(&self) -> Result<String, ClientError>;

    async fn submit_input(&self, session_id: &str, message: &str) -> Result<(), ClientError>;

    async fn slot_status(&self, session_id: &str) -> Result<SlotStatus, ClientError>;

    async fn flights(&self, session_id: &str) -> Result<Vec<FlightOffer>, ClientError>;

    async fn hotels(&self, session_id: &str) -> Result<Vec<HotelOffer>, ClientError>;

    /// Opens a fresh connection; connections are never reused.
    async fn open_stream(
        &self,
        channel: StreamChannel,
        session_id: &str,
    ) -> Result<StreamHandle, ClientError>;
}

/// [`Backend`] over HTTP and server-sent events.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    api: ApiClient,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self { api: ApiClient::new(config)? })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn create_session(&self) -> Result<String, ClientError> {
        self.api.create_session().await
    }

    async fn submit_input(&self, session_id: &str, message: &str) -> Result<(), ClientError> {
        self.api.submit_input(session_id, message).await
    }

    async fn slot_status(&self, session_id: &str) -> Result<SlotStatus, ClientError> {
        self.api.slot_status(session_id).await
    }

    async fn flights(&self, session_id: &str) -> Result<Vec<FlightOffer>, ClientError> {
        self.api.flights(session_id).await
    }

    async fn hotels(&self, session_id: &str) -> Result<Vec<HotelOffer>, ClientError> {
        self.api.hotels(session_id).await
    }

    async fn open_stream(
        &self,
        channel: StreamChannel,
        session_id: &str,
    ) -> Result<StreamHandle, ClientError> {
        match channel {
            StreamChannel::SlotQuestion => self.api.open_slot_stream(session_id).await,
            StreamChannel::Recommendations => {
                self.api.open_recommendations_stream(session_id).await
            }
        }
    }
}

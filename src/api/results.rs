use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{FlightOffer, FlightsResponse, HotelOffer, HotelsResponse};
use crate::stream::{self, StreamHandle};

impl ApiClient {
    /// GET `/flight/{session_id}`: a missing `flights` array reads as no offers.
    pub async fn flights(&self, session_id: &str) -> Result<Vec<FlightOffer>, ClientError> {
        let body: FlightsResponse = self
            .get_json("flight info", &format!("flight/{session_id}"))
            .await?;
        Ok(body.flights)
    }

    /// GET `/hotel/{session_id}`: a missing `hotels` array reads as no offers.
    pub async fn hotels(&self, session_id: &str) -> Result<Vec<HotelOffer>, ClientError> {
        let body: HotelsResponse = self
            .get_json("hotel info", &format!("hotel/{session_id}"))
            .await?;
        Ok(body.hotels)
    }

    /// GET `/conversation/results/{session_id}/recommendations`, streamed.
    pub async fn open_recommendations_stream(
        &self,
        session_id: &str,
    ) -> Result<StreamHandle, ClientError> {
        let url = self.url(&format!("conversation/results/{session_id}/recommendations"));
        stream::open(self.http(), "recommendations", &url).await
    }
}

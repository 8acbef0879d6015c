//! HTTP clients for the travel backend.

pub mod results;
pub mod session;
pub mod slot;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::ClientError;

/// Thin wrapper over a shared [`reqwest::Client`] that knows the API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::network("client setup", e))?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            timeout: config.request_timeout,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!("GET {url} ({endpoint})");
        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::network(endpoint, e))?;
        decode(endpoint, check_status(endpoint, response)?).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        let url = self.url(path);
        debug!("POST {url} ({endpoint})");
        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::network(endpoint, e))?;
        check_status(endpoint, response)?;
        Ok(())
    }
}

fn check_status(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            endpoint: endpoint.to_string(),
            status: response.status().as_u16(),
        })
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| ClientError::network(endpoint, e))?;
    serde_json::from_slice(&body).map_err(|e| ClientError::decode(endpoint, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let config = ClientConfig {
            api_url: "http://localhost:8000/".to_string(),
            ..ClientConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("/slot/abc"), "http://localhost:8000/api/v1/slot/abc");
        assert_eq!(client.url("flight/abc"), "http://localhost:8000/api/v1/flight/abc");
    }
}

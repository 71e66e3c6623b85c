use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use reqwest::Url;
use thiserror::Error;

use ozunlu_core::config::ClientConfig;
use ozunlu_core::domain::quote::{QuoteRecord, QuoteRequest};
use ozunlu_core::form::{
    classify_response, IntakeEnvelope, QuoteIntakeClient, SubmitError, GENERIC_FAILURE_MESSAGE,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach the quote service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("quote service answered {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response from the quote service: {0}")]
    UnexpectedBody(String),
    #[error("invalid quote service URL: {0}")]
    InvalidUrl(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// HTTP client for the intake API.
#[derive(Clone, Debug)]
pub struct HttpIntakeClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIntakeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_quotes(&self) -> Result<Vec<QuoteRecord>, ClientError> {
        self.get_envelope(self.url("/api/quotes")).await
    }

    pub async fn get_quote(&self, id: &str) -> Result<QuoteRecord, ClientError> {
        let url = self.quote_url(id)?;
        self.get_envelope(url.as_str().to_string()).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        serde_json::from_slice::<HealthStatus>(&body)
            .map_err(|error| ClientError::UnexpectedBody(format!("status {status}: {error}")))
    }

    async fn get_envelope<T: DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        match serde_json::from_slice::<IntakeEnvelope<T>>(&body) {
            Ok(IntakeEnvelope { success: true, data: Some(data), .. }) => Ok(data),
            Ok(IntakeEnvelope { success: true, data: None, .. }) => Err(
                ClientError::UnexpectedBody(format!("status {status} response carried no data")),
            ),
            Ok(IntakeEnvelope { success: false, message, .. }) => Err(ClientError::Rejected {
                status,
                message: message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            }),
            Err(error) => Err(ClientError::UnexpectedBody(format!("status {status}: {error}"))),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `/api/quote/{id}` with the id as a single percent-encoded segment.
    fn quote_url(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.url("/api/quote"))
            .map_err(|error| ClientError::InvalidUrl(error.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .push(id.trim());
        Ok(url)
    }
}

#[async_trait]
impl QuoteIntakeClient for HttpIntakeClient {
    async fn create_quote(&self, request: &QuoteRequest) -> Result<QuoteRecord, SubmitError> {
        let response = self
            .http
            .post(self.url("/api/quote"))
            .json(request)
            .send()
            .await
            .map_err(|error| SubmitError::Connectivity(error.to_string()))?;
        let status = response.status().as_u16();
        let body =
            response.bytes().await.map_err(|error| SubmitError::Connectivity(error.to_string()))?;
        classify_response(status, &body)
    }
}

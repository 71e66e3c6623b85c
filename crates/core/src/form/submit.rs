use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::quote::{QuoteRecord, QuoteRequest};

pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred.";
pub const CONNECTIVITY_MESSAGE: &str = "Could not connect to the server. Please try again.";

/// `{success, message?, data?}` body shared by every intake endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> IntakeEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, message: None, data: Some(data) }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: Some(message.into()), data: Some(data) }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), data: None }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The service answered with a `success: false` envelope.
    #[error("quote rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// No usable answer: transport failure or a body that is not an envelope.
    #[error("quote service unreachable: {0}")]
    Connectivity(String),
}

impl SubmitError {
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected { message, .. } => message,
            Self::Connectivity(_) => CONNECTIVITY_MESSAGE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Skipped,
    Submitted(QuoteRecord),
    Failed(SubmitError),
}

#[async_trait]
pub trait QuoteIntakeClient: Send + Sync {
    async fn create_quote(&self, request: &QuoteRequest) -> Result<QuoteRecord, SubmitError>;
}

/// Classifies a `POST /api/quote` answer by its shape rather than its status.
pub fn classify_response(status: u16, body: &[u8]) -> Result<QuoteRecord, SubmitError> {
    match serde_json::from_slice::<IntakeEnvelope<QuoteRecord>>(body) {
        Ok(IntakeEnvelope { success: true, data: Some(record), .. }) => Ok(record),
        Ok(IntakeEnvelope { success: true, data: None, .. }) => Err(SubmitError::Connectivity(
            format!("status {status} response did not include the created quote"),
        )),
        Ok(IntakeEnvelope { success: false, message, .. }) => Err(SubmitError::Rejected {
            status,
            message: message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        }),
        Err(error) => Err(SubmitError::Connectivity(format!(
            "unexpected status {status} response from quote service: {error}"
        ))),
    }
}

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use ozunlu_core::domain::quote::{QuoteId, QuoteIdGenerator, QuoteRecord, QuoteRequest};
use ozunlu_core::errors::{ApplicationError, DomainError};
use ozunlu_db::{QuoteRepository, RepositoryError};

/// Validates, stamps and stores incoming quote requests.
pub struct QuoteIntake {
    repository: Arc<dyn QuoteRepository>,
    ids: QuoteIdGenerator,
}

impl QuoteIntake {
    pub fn new(repository: Arc<dyn QuoteRepository>) -> Self {
        Self { repository, ids: QuoteIdGenerator::default() }
    }

    /// Builds an intake whose ids continue after the highest stored one.
    pub async fn resume(repository: Arc<dyn QuoteRepository>) -> Result<Self, RepositoryError> {
        let latest = repository.latest_id().await?;
        let mut intake = Self::new(repository);
        if let Some(latest) = latest {
            intake.ids = QuoteIdGenerator::starting_after(latest);
        }
        Ok(intake)
    }

    pub async fn create(
        &self,
        request: QuoteRequest,
        correlation_id: &str,
    ) -> Result<QuoteRecord, ApplicationError> {
        let valid = match request.validate() {
            Ok(valid) => valid,
            Err(error) => {
                log_rejection(&error, correlation_id);
                return Err(error.into());
            }
        };

        let now = Utc::now();
        let record = valid.into_record(self.ids.next_id(now), now);
        self.repository.insert(record.clone()).await.map_err(|error| {
            error!(
                event_name = "quote.intake.persist_failed",
                correlation_id,
                quote_id = %record.id,
                error = %error,
                "failed to store quote"
            );
            ApplicationError::from(error)
        })?;

        info!(
            event_name = "quote.intake.accepted",
            correlation_id,
            quote_id = %record.id,
            product_type = %record.product_type,
            payment_method = %record.payment_method,
            "quote request accepted"
        );
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<QuoteRecord>, ApplicationError> {
        Ok(self.repository.list().await?)
    }

    /// Looks a quote up by its raw path segment. Anything that is not a
    /// stored id, including non-numeric input, is reported as not found.
    pub async fn get(&self, raw_id: &str) -> Result<QuoteRecord, ApplicationError> {
        let Ok(id) = raw_id.parse::<QuoteId>() else {
            return Err(ApplicationError::NotFound(raw_id.to_string()));
        };
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(id.to_string()))
    }
}

fn log_rejection(error: &DomainError, correlation_id: &str) {
    match error {
        DomainError::MissingRequiredFields { fields } => warn!(
            event_name = "quote.intake.rejected",
            correlation_id,
            quote_id = "unassigned",
            missing_fields = %fields.join(","),
            "quote request is missing required fields"
        ),
        other => warn!(
            event_name = "quote.intake.rejected",
            correlation_id,
            quote_id = "unassigned",
            reason = %other,
            "quote request rejected"
        ),
    }
}

use async_trait::async_trait;
use thiserror::Error;

use ozunlu_core::domain::quote::{QuoteId, QuoteRecord};
use ozunlu_core::errors::ApplicationError;

pub mod memory;
pub mod quote;

pub use memory::InMemoryQuoteRepository;
pub use quote::SqlQuoteRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("duplicate quote id {0}")]
    Duplicate(QuoteId),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

/// Append-only quote store. Records are never updated or deleted.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn insert(&self, record: QuoteRecord) -> Result<(), RepositoryError>;
    /// All records in insertion order.
    async fn list(&self) -> Result<Vec<QuoteRecord>, RepositoryError>;
    async fn find_by_id(&self, id: QuoteId) -> Result<Option<QuoteRecord>, RepositoryError>;
    /// Highest id stored so far, used to keep ids increasing across restarts.
    async fn latest_id(&self) -> Result<Option<QuoteId>, RepositoryError>;
}

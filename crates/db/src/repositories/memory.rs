use tokio::sync::RwLock;

use ozunlu_core::domain::quote::{QuoteId, QuoteRecord};

use super::{QuoteRepository, RepositoryError};

/// Process-scoped store; contents are lost when the process exits.
#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: RwLock<Vec<QuoteRecord>>,
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn insert(&self, record: QuoteRecord) -> Result<(), RepositoryError> {
        let mut quotes = self.quotes.write().await;
        if quotes.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Duplicate(record.id));
        }
        quotes.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<QuoteRecord>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.clone())
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<QuoteRecord>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.iter().find(|quote| quote.id == id).cloned())
    }

    async fn latest_id(&self) -> Result<Option<QuoteId>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.iter().map(|quote| quote.id).max())
    }
}

use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::values::fingerprint::Fingerprint;
use std::sync::Arc;

pub struct DocumentsUseCase {
    store: Arc<dyn DocumentStore>,
}

impl DocumentsUseCase {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn list(&self, limit: Option<usize>) -> Result<Vec<Document>, DomainError> {
        self.store.list(limit)
    }

    pub fn get(&self, id: &str) -> Result<Document, DomainError> {
        let fp = Fingerprint::parse(id).map_err(DomainError::InvalidInput)?;
        self.store
            .get(&fp)?
            .ok_or_else(|| DomainError::NotFound(format!("document {id}")))
    }

    /// Delete by id. A missing id is a no-op, not an error.
    pub fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let fp = Fingerprint::parse(id).map_err(DomainError::InvalidInput)?;
        let deleted = self.store.delete(&fp)?;
        if deleted {
            tracing::info!(id, "document deleted");
        }
        Ok(deleted)
    }

    pub fn clear(&self) -> Result<(), DomainError> {
        self.store.clear()?;
        tracing::info!("store cleared");
        Ok(())
    }
}

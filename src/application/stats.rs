use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use std::sync::Arc;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StoreStats {
    pub total_documents: usize,
    pub embedding_dimension: usize,
}

pub struct StatsUseCase {
    store: Arc<dyn DocumentStore>,
    dimension: usize,
}

impl StatsUseCase {
    pub fn new(store: Arc<dyn DocumentStore>, dimension: usize) -> Self {
        Self { store, dimension }
    }

    pub fn stats(&self) -> Result<StoreStats, DomainError> {
        Ok(StoreStats {
            total_documents: self.store.count()?,
            embedding_dimension: self.dimension,
        })
    }
}

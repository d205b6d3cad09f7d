pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod server;

use crate::application::compare::CompareUseCase;
use crate::application::documents::DocumentsUseCase;
use crate::application::ingest::{DuplicatePolicy, IngestOutcome, IngestUseCase};
use crate::application::search::{SearchResults, SearchUseCase};
use crate::application::stats::{StatsUseCase, StoreStats};
use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::infrastructure::embeddings::fastembed::FastEmbedProvider;
use crate::infrastructure::embeddings::openai::OpenAiProvider;
use crate::infrastructure::embeddings::voyage::VoyageProvider;
use crate::infrastructure::sqlite::document_store::SqliteDocumentStore;
use crate::infrastructure::sqlite::migrations::run_migrations;
use rusqlite::Connection;
use std::sync::Arc;

pub struct DocSim {
    ingest_uc: IngestUseCase,
    search_uc: SearchUseCase,
    compare_uc: CompareUseCase,
    documents_uc: DocumentsUseCase,
    stats_uc: StatsUseCase,
}

impl DocSim {
    /// Environment-driven constructor. `DOCSIM_EMBEDDING_PROVIDER` selects
    /// the embedder (fastembed is the no-credentials default),
    /// `DOCSIM_ON_DUPLICATE` the duplicate-metadata policy.
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let provider =
            std::env::var("DOCSIM_EMBEDDING_PROVIDER").unwrap_or_else(|_| "fastembed".into());
        let api_key = std::env::var("DOCSIM_EMBEDDING_API_KEY").unwrap_or_default();
        let model = std::env::var("DOCSIM_EMBEDDING_MODEL").ok();

        let embedder: Arc<dyn EmbeddingProvider> = match provider.as_str() {
            "voyage" => Arc::new(VoyageProvider::new(api_key, model, None)),
            "openai" => Arc::new(OpenAiProvider::new(api_key, model)),
            _ => Arc::new(FastEmbedProvider::new(model)?),
        };

        let on_duplicate = match std::env::var("DOCSIM_ON_DUPLICATE") {
            Ok(s) => s.parse().map_err(DomainError::InvalidInput)?,
            Err(_) => DuplicatePolicy::default(),
        };

        Self::with_providers(db_path, embedder, on_duplicate)
    }

    pub fn with_providers(
        db_path: &str,
        embedder: Arc<dyn EmbeddingProvider>,
        on_duplicate: DuplicatePolicy,
    ) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Storage(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Storage(format!("WAL error: {e}")))?;

        run_migrations(&conn)?;

        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(conn));

        let provider_dim = embedder.dimension();
        if provider_dim > 0 {
            if let Ok(Some(stored_dim)) = store.stored_dimension() {
                if stored_dim != provider_dim {
                    tracing::warn!(
                        stored_dim,
                        provider_dim,
                        "stored vectors do not match the current embedding provider; \
                         searches against old vectors will be meaningless"
                    );
                }
            }
        }

        Ok(Self {
            ingest_uc: IngestUseCase::new(store.clone(), embedder.clone(), on_duplicate),
            search_uc: SearchUseCase::new(store.clone(), embedder.clone()),
            compare_uc: CompareUseCase::new(embedder.clone()),
            documents_uc: DocumentsUseCase::new(store.clone()),
            stats_uc: StatsUseCase::new(store, provider_dim),
        })
    }

    // Delegating methods
    pub async fn ingest(
        &self,
        content: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<IngestOutcome, DomainError> {
        self.ingest_uc.execute(content, metadata).await
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, DomainError> {
        self.search_uc.execute(query, limit).await
    }

    pub async fn compare(&self, text_a: &str, text_b: &str) -> Result<f64, DomainError> {
        self.compare_uc.execute(text_a, text_b).await
    }

    pub fn documents(&self, limit: Option<usize>) -> Result<Vec<Document>, DomainError> {
        self.documents_uc.list(limit)
    }

    pub fn document(&self, id: &str) -> Result<Document, DomainError> {
        self.documents_uc.get(id)
    }

    pub fn delete_document(&self, id: &str) -> Result<bool, DomainError> {
        self.documents_uc.delete(id)
    }

    pub fn clear(&self) -> Result<(), DomainError> {
        self.documents_uc.clear()
    }

    pub fn stats(&self) -> Result<StoreStats, DomainError> {
        self.stats_uc.stats()
    }
}

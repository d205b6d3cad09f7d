use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use std::sync::Arc;

#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchHit {
    pub document: Document,
    pub similarity: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    /// Set when the store held no documents at all, in which case neither
    /// the embedder nor the store's query path was invoked.
    pub store_empty: bool,
}

pub struct SearchUseCase {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SearchUseCase {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Nearest-neighbor search. `requested` is clamped to [1, count].
    ///
    /// Similarity is reported as `1 - distance` for whatever metric the
    /// store uses (cosine in the bundled store, so [0, 1] there). Hits are
    /// returned in the store's order, which is expected to be descending
    /// similarity; this layer does not re-sort.
    pub async fn execute(
        &self,
        query: &str,
        requested: usize,
    ) -> Result<SearchResults, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }

        let total = self.store.count()?;
        if total == 0 {
            return Ok(SearchResults {
                hits: vec![],
                store_empty: true,
            });
        }
        let k = requested.clamp(1, total);

        let vectors = self
            .embedder
            .embed(&[query.to_string()], InputType::Query)
            .await?;
        let query_vec = vectors
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                DomainError::Embedding("provider returned no embedding".to_string())
            })?;

        let neighbors = self.store.nearest(&query_vec, k)?;
        let mut hits = Vec::with_capacity(neighbors.len());
        for (id, distance) in neighbors {
            // A concurrent delete can remove a row between query and fetch.
            if let Some(document) = self.store.get(&id)? {
                hits.push(SearchHit {
                    document,
                    similarity: 1.0 - distance,
                });
            }
        }

        Ok(SearchResults {
            hits,
            store_empty: false,
        })
    }
}

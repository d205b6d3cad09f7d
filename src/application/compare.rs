use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::values::similarity::cosine_similarity;
use std::sync::Arc;

pub struct CompareUseCase {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl CompareUseCase {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Cosine similarity of two texts' embeddings. Pure: no store access.
    pub async fn execute(&self, text_a: &str, text_b: &str) -> Result<f64, DomainError> {
        if text_a.trim().is_empty() || text_b.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "both texts must be non-empty".to_string(),
            ));
        }

        let vectors = self
            .embedder
            .embed(
                &[text_a.to_string(), text_b.to_string()],
                InputType::Document,
            )
            .await?;
        if vectors.len() < 2 {
            return Err(DomainError::Embedding(format!(
                "expected 2 embeddings, got {}",
                vectors.len()
            )));
        }

        cosine_similarity(&vectors[0], &vectors[1]).ok_or_else(|| {
            DomainError::DegenerateInput(
                "zero-magnitude or mismatched embedding".to_string(),
            )
        })
    }
}

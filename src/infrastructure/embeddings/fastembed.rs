use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Local ONNX sentence-embedding models. No credentials needed, which makes
/// this the default provider.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    dimension: usize,
}

impl FastEmbedProvider {
    pub fn new(model_name: Option<String>) -> Result<Self, DomainError> {
        let model_type = match model_name.as_deref() {
            None | Some("all-minilm-l6-v2") => EmbeddingModel::AllMiniLML6V2,
            Some("bge-small-en-v1.5") => EmbeddingModel::BGESmallENV15,
            Some("bge-base-en-v1.5") => EmbeddingModel::BGEBaseENV15,
            Some("nomic-embed-text-v1.5") => EmbeddingModel::NomicEmbedTextV15,
            Some(other) => {
                return Err(DomainError::InvalidInput(format!(
                    "Unknown embedding model: {other}"
                )))
            }
        };
        let dimension = match model_type {
            EmbeddingModel::AllMiniLML6V2 => 384,
            EmbeddingModel::BGESmallENV15 => 384,
            EmbeddingModel::BGEBaseENV15 => 768,
            EmbeddingModel::NomicEmbedTextV15 => 768,
            _ => 384,
        };

        let text_embedding = TextEmbedding::try_new(InitOptions::new(model_type))
            .map_err(|e| DomainError::Embedding(format!("Failed to initialize model: {e}")))?;

        Ok(Self {
            model: Arc::new(Mutex::new(text_embedding)),
            dimension,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(
        &self,
        texts: &[String],
        _input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let mut model = self.model.lock().await;
        model
            .embed(texts.to_vec(), None)
            .map_err(|e| DomainError::Embedding(format!("Embedding generation failed: {e}")))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

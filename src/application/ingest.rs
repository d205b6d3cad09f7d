use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::values::fingerprint::Fingerprint;
use std::sync::Arc;

/// What happens to caller-supplied metadata when content already exists.
/// Discarding is the default; merging into the stored record is opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    Keep,
    UpdateMetadata,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(DuplicatePolicy::Keep),
            "update" => Ok(DuplicatePolicy::UpdateMetadata),
            other => Err(format!("Unknown duplicate policy: {other} (use keep|update)")),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestOutcome {
    pub id: Fingerprint,
    pub inserted: bool,
}

pub struct IngestUseCase {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    on_duplicate: DuplicatePolicy,
}

impl IngestUseCase {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        on_duplicate: DuplicatePolicy,
    ) -> Self {
        Self {
            store,
            embedder,
            on_duplicate,
        }
    }

    /// Ingest content with at-most-one-copy semantics.
    ///
    /// The fast path skips embedding for content whose fingerprint is
    /// already stored. Uniqueness itself is enforced by the store's atomic
    /// `insert_if_absent`; losing that race is reported as a duplicate, so
    /// calling ingest twice with identical content is a no-op the second
    /// time regardless of interleaving.
    pub async fn execute(
        &self,
        content: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<IngestOutcome, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "content must not be empty".to_string(),
            ));
        }
        if let Some(meta) = &metadata {
            if !meta.is_object() {
                return Err(DomainError::InvalidInput(
                    "metadata must be a JSON object".to_string(),
                ));
            }
        }

        let id = Fingerprint::of(content);

        if let Some(existing) = self.store.get(&id)? {
            tracing::debug!(id = %id, "duplicate content, skipping embed");
            self.resolve_duplicate(&existing, metadata)?;
            return Ok(IngestOutcome {
                id,
                inserted: false,
            });
        }

        let vectors = self
            .embedder
            .embed(&[content.to_string()], InputType::Document)
            .await?;
        let embedding = vectors
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                DomainError::Embedding("provider returned no embedding".to_string())
            })?;

        let document = Document::new(content.to_string(), metadata.clone());
        if self.store.insert_if_absent(&document, &embedding)? {
            tracing::info!(id = %document.id, "document ingested");
            Ok(IngestOutcome {
                id: document.id,
                inserted: true,
            })
        } else {
            // A concurrent ingest of the same content won the insert.
            tracing::debug!(id = %document.id, "lost insert race, treating as duplicate");
            if let Some(existing) = self.store.get(&id)? {
                self.resolve_duplicate(&existing, metadata)?;
            }
            Ok(IngestOutcome {
                id,
                inserted: false,
            })
        }
    }

    fn resolve_duplicate(
        &self,
        existing: &Document,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), DomainError> {
        match self.on_duplicate {
            DuplicatePolicy::Keep => Ok(()),
            DuplicatePolicy::UpdateMetadata => {
                let Some(serde_json::Value::Object(user)) = metadata else {
                    return Ok(());
                };
                if user.is_empty() {
                    return Ok(());
                }
                let mut merged = existing.metadata.as_object().cloned().unwrap_or_default();
                for (k, v) in user {
                    merged.insert(k, v);
                }
                self.store
                    .update_metadata(&existing.id, &serde_json::Value::Object(merged))
            }
        }
    }
}

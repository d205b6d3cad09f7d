use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::values::fingerprint::Fingerprint;

/// Keyed document + vector store.
///
/// `insert_if_absent` is the store's atomic conditional insert: uniqueness
/// per fingerprint is enforced here, not by caller-side check-then-act
/// sequencing. Implementations must make the existence check and the write
/// a single indivisible operation.
pub trait DocumentStore: Send + Sync {
    /// Insert the document and its embedding unless the fingerprint already
    /// exists. Returns whether a row was actually written.
    fn insert_if_absent(&self, document: &Document, embedding: &[f32])
        -> Result<bool, DomainError>;

    fn get(&self, id: &Fingerprint) -> Result<Option<Document>, DomainError>;

    fn update_metadata(
        &self,
        id: &Fingerprint,
        metadata: &serde_json::Value,
    ) -> Result<(), DomainError>;

    /// K-nearest neighbors as `(id, distance)` pairs, nearest first.
    fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<(Fingerprint, f64)>, DomainError>;

    /// Documents in insertion order.
    fn list(&self, limit: Option<usize>) -> Result<Vec<Document>, DomainError>;

    /// Returns whether a row existed. Deleting a missing id is a no-op.
    fn delete(&self, id: &Fingerprint) -> Result<bool, DomainError>;

    /// Remove every document. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<(), DomainError>;

    fn count(&self) -> Result<usize, DomainError>;

    /// Dimension of stored vectors, if any are present.
    fn stored_dimension(&self) -> Result<Option<usize>, DomainError>;
}

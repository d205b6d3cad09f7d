use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::document_store::DocumentStore;
use crate::domain::values::fingerprint::Fingerprint;
use crate::domain::values::similarity::cosine_distance;
use chrono::DateTime;
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// Column list shared by all document SELECTs.
const SELECT_COLS: &str = "id, content, metadata, created_at";

pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn serialize_vector(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn row_to_document(row: &rusqlite::Row) -> Result<Document, rusqlite::Error> {
        let id_str: String = row.get(0)?;
        let metadata_str: String = row.get(2)?;
        let created_str: String = row.get(3)?;

        Ok(Document {
            id: Fingerprint::parse(&id_str)
                .map_err(|_| rusqlite::Error::InvalidParameterName(id_str.clone()))?,
            content: row.get(1)?,
            metadata: serde_json::from_str(&metadata_str)
                .unwrap_or(serde_json::Value::Object(Default::default())),
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn insert_if_absent(
        &self,
        document: &Document,
        embedding: &[f32],
    ) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let blob = Self::serialize_vector(embedding);
        // INSERT OR IGNORE against the primary key makes the existence
        // check and the write one atomic statement; a changed-row count of
        // zero means another writer holds this fingerprint.
        let changed = conn
            .execute(
                "INSERT OR IGNORE INTO documents (id, content, metadata, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    document.id.as_str(),
                    document.content,
                    serde_json::to_string(&document.metadata).unwrap_or_default(),
                    blob,
                    document.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DomainError::Storage(format!("Failed to insert document: {e}")))?;
        Ok(changed > 0)
    }

    fn get(&self, id: &Fingerprint) -> Result<Option<Document>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let sql = format!("SELECT {SELECT_COLS} FROM documents WHERE id = ?1");
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id.as_str()], Self::row_to_document)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn update_metadata(
        &self,
        id: &Fingerprint,
        metadata: &serde_json::Value,
    ) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        conn.execute(
            "UPDATE documents SET metadata = ?2 WHERE id = ?1",
            params![
                id.as_str(),
                serde_json::to_string(metadata).unwrap_or_default()
            ],
        )
        .map_err(|e| DomainError::Storage(format!("Failed to update metadata: {e}")))?;
        Ok(())
    }

    fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<(Fingerprint, f64)>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT id, embedding FROM documents")
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut results: Vec<(Fingerprint, f64)> = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                Ok((id, blob))
            })
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .filter_map(|(id, blob)| {
                let stored = Self::deserialize_vector(&blob);
                let distance = cosine_distance(embedding, &stored);
                Fingerprint::parse(&id).ok().map(|fp| (fp, distance))
            })
            .collect();

        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    fn list(&self, limit: Option<usize>) -> Result<Vec<Document>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let mut sql = format!("SELECT {SELECT_COLS} FROM documents ORDER BY rowid ASC");
        if limit.is_some() {
            sql.push_str(" LIMIT ?1");
        }
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let documents = if let Some(limit) = limit {
            stmt.query_map(params![limit as i64], Self::row_to_document)
                .map_err(|e| DomainError::Storage(e.to_string()))?
                .filter_map(|r| r.ok())
                .collect()
        } else {
            stmt.query_map([], Self::row_to_document)
                .map_err(|e| DomainError::Storage(e.to_string()))?
                .filter_map(|r| r.ok())
                .collect()
        };
        Ok(documents)
    }

    fn delete(&self, id: &Fingerprint) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let changed = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id.as_str()])
            .map_err(|e| DomainError::Storage(format!("Failed to delete document: {e}")))?;
        Ok(changed > 0)
    }

    fn clear(&self) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        conn.execute("DELETE FROM documents", [])
            .map_err(|e| DomainError::Storage(format!("Failed to clear documents: {e}")))?;
        Ok(())
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let count: usize = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(count)
    }

    fn stored_dimension(&self) -> Result<Option<usize>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let bytes: Option<i64> = conn
            .query_row("SELECT length(embedding) FROM documents LIMIT 1", [], |r| {
                r.get(0)
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(DomainError::Storage(other.to_string())),
            })?;
        Ok(bytes.map(|b| (b as usize) / std::mem::size_of::<f32>()))
    }
}

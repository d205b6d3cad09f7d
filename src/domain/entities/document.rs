use crate::domain::values::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata key guaranteed to be present on every stored document.
pub const SOURCE_KEY: &str = "source";
pub const DEFAULT_SOURCE: &str = "user_input";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Fingerprint,
    pub content: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Build a document from raw content. The id is derived from the content
    /// and the metadata object is completed with the default `source` tag;
    /// caller-supplied keys win over defaults.
    pub fn new(content: String, metadata: Option<serde_json::Value>) -> Self {
        let id = Fingerprint::of(&content);
        Self {
            id,
            content,
            metadata: merge_metadata(metadata),
            created_at: Utc::now(),
        }
    }

    /// Content preview for display surfaces, truncated on a char boundary.
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.content, max_chars)
    }
}

pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

/// Overlay caller metadata on the default set. `None` yields just the
/// defaults; a non-object value is the caller's error and handled upstream.
pub fn merge_metadata(metadata: Option<serde_json::Value>) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert(
        SOURCE_KEY.to_string(),
        serde_json::Value::String(DEFAULT_SOURCE.to_string()),
    );
    if let Some(serde_json::Value::Object(user)) = metadata {
        for (k, v) in user {
            map.insert(k, v);
        }
    }
    serde_json::Value::Object(map)
}

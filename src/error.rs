use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecordsError>;

/// Failures of a single records operation. Every variant aborts the
/// operation before anything is written back.
#[derive(Error, Debug)]
pub enum RecordsError {
    /// Missing or malformed input; the message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    #[error("Student not found: {0}")]
    NotFound(String),

    #[error("Student ID already exists: {0}")]
    DuplicateId(String),

    /// Stored text for a collection no longer decodes.
    #[error("stored {collection} data is unreadable: {source}")]
    StorageCorrupt {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {collection}: {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Export failed: {0}")]
    Export(String),
}

impl RecordsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wire error code reported to the UI.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::DuplicateId(_) => "duplicate_id",
            Self::StorageCorrupt { .. } => "storage_corrupt",
            Self::Encode { .. } | Self::Database(_) => "db_query_failed",
            Self::Export(_) => "export_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::StorageCorrupt { collection, .. } => {
                Some(serde_json::json!({ "collection": collection }))
            }
            Self::NotFound(id) | Self::DuplicateId(id) => {
                Some(serde_json::json!({ "studentId": id }))
            }
            _ => None,
        }
    }
}

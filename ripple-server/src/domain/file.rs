use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a file registered by the external upload service.
/// This engine only ever reads these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredFile {
    pub(crate) id: i64,
    pub(crate) path: String,
    pub(crate) mime_type: String,
    pub(crate) created_at: DateTime<Utc>,
}

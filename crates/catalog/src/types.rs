use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user-visible uploaded file.
///
/// `chunk_ids` is the load-bearing field: concatenating the referenced
/// blobs in stored order reconstructs the original payload byte-exactly.
/// The record is immutable once saved — there are no partial or append
/// updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// Stable external identifier, independently generated — never derived
    /// from a chunk's blob id.
    pub id: String,
    /// Identifier of the user who created the transfer. Every id-addressed
    /// access must check this.
    pub owner_id: String,
    /// Filename as supplied by the uploading client.
    pub original_name: String,
    /// Ordered blob identifiers, length >= 1.
    pub chunk_ids: Vec<String>,
    /// Size of the original payload in bytes.
    pub total_size: u64,
    /// SHA-256 hex digest of the original payload, verified on reassembly.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,
    /// Record-creation time, used for most-recent-first display ordering.
    pub created_at: DateTime<Utc>,
    /// Optional precomputed preview image, base64-encoded PNG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

//! Preview-type inference and thumbnail encoding.
//!
//! Thumbnail *generation* (image resizing, video frame grabs) is an
//! external collaborator; this module only classifies filenames and
//! encodes precomputed thumbnail bytes for storage.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

/// Content classes the dashboard can preview inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Video,
}

/// Infers the preview kind from a filename extension.
///
/// Anything unrecognized is download-only (`None`).
pub fn preview_kind(original_name: &str) -> Option<PreviewKind> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("jpg" | "jpeg" | "png" | "gif") => Some(PreviewKind::Image),
        Some("mp4" | "webm" | "avi" | "mov") => Some(PreviewKind::Video),
        _ => None,
    }
}

/// Encodes precomputed thumbnail bytes for the catalog record.
pub fn encode_thumbnail(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

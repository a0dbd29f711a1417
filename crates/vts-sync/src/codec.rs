//! Base64 encoding of file content for the contents API.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Result, SyncError};

/// Encodes UTF-8 text as standard Base64.
#[must_use]
pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decodes Base64 content into UTF-8 text.
///
/// GitHub wraps encoded content at 60 columns; whitespace is ignored.
pub fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| SyncError::Decode(format!("invalid base64 content: {e}")))?;
    String::from_utf8(bytes).map_err(|e| SyncError::Decode(format!("content is not UTF-8: {e}")))
}

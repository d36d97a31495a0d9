//! Base64 transport for binary attributes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode raw bytes as standard (padded) base64.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a standard base64 payload. Returns `None` for malformed input.
pub fn decode_base64(text: &str) -> Option<Vec<u8>> {
    STANDARD.decode(text.trim()).ok()
}

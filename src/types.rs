//! Common types used throughout ldap-pager
//!
//! Type aliases and helpers shared by several modules.

use base64::Engine as _;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A mapped directory entry
pub type Record = JsonObject;

// ============================================================================
// Cookie Display
// ============================================================================

/// Render an opaque cookie for logs and command output
pub fn cookie_to_base64(cookie: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(cookie)
}

/// Parse a cookie given on the command line
pub fn cookie_from_base64(text: &str) -> crate::Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(text.trim())
        .map_err(|e| crate::Error::invalid_value("cookie", format!("not valid base64: {e}")))
}

//! Script composition.
//!
//! Prepends a single assignment statement to a script:
//!
//! ```text
//! self.__file_manifest = [
//!   {
//!     "url": "index.css",
//!     "revision": "d41d8cd98f00b204e9800998ecf8427e"
//!   }
//! ];
//! <original script bytes>
//! ```
//!
//! The script is handled as raw bytes so its encoding, whitespace and line
//! endings come through untouched.

use crate::manifest::ManifestEntry;

/// Render entries as pretty-printed JSON with two-space indentation.
pub fn serialize_manifest(entries: &[ManifestEntry]) -> Result<String, serde_json::Error> {
  serde_json::to_string_pretty(entries)
}

/// Build `"<variable_name> = <json>;\n"` followed by `script`.
pub fn compose_script(variable_name: &str, entries: &[ManifestEntry], script: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
  let assignment = format!("{} = {};\n", variable_name, serialize_manifest(entries)?);

  let mut composed = Vec::with_capacity(assignment.len() + script.len());
  composed.extend_from_slice(assignment.as_bytes());
  composed.extend_from_slice(script);
  Ok(composed)
}

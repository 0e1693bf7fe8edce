//! Manifest entry types.
//!
//! # Serialization
//!
//! Entries serialize with `url` before `revision`. The field order of
//! [`ManifestEntry`] is therefore part of the output format: the injected
//! manifest must be byte-identical across builds of an unchanged tree.
//!
//! ```json
//! [
//!   {
//!     "url": "index.css",
//!     "revision": "d41d8cd98f00b204e9800998ecf8427e"
//!   },
//!   {
//!     "url": "app.3f9a1c.js"
//!   }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One cacheable asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
  /// The URL the service worker will request, usually relative to its scope.
  pub url: String,
  /// Content fingerprint. `None` when the URL is self-versioning.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub revision: Option<String>,
}

impl ManifestEntry {
  pub fn new(url: impl Into<String>, revision: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      revision: Some(revision.into()),
    }
  }

  pub fn unrevisioned(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      revision: None,
    }
  }
}

/// Error raised by a [`ManifestTransform`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransformError(pub String);

impl TransformError {
  pub fn new(message: impl Into<String>) -> Self {
    Self(message.into())
  }
}

/// A step that rewrites the manifest after enumeration.
///
/// Transforms run in order and each receives the previous step's output. Any
/// error aborts manifest generation.
///
/// Closures of the right shape implement this trait:
///
/// ```ignore
/// let strip_maps = |entries: Vec<ManifestEntry>| -> Result<_, TransformError> {
///   Ok(entries.into_iter().filter(|e| !e.url.ends_with(".map")).collect())
/// };
/// ```
pub trait ManifestTransform: Send + Sync {
  fn transform(&self, entries: Vec<ManifestEntry>) -> Result<Vec<ManifestEntry>, TransformError>;
}

impl<F> ManifestTransform for F
where
  F: Fn(Vec<ManifestEntry>) -> Result<Vec<ManifestEntry>, TransformError> + Send + Sync,
{
  fn transform(&self, entries: Vec<ManifestEntry>) -> Result<Vec<ManifestEntry>, TransformError> {
    self(entries)
  }
}

//! Manifest acquisition.
//!
//! A [`ManifestSource`] turns a [`ManifestConfig`] into the ordered entry list
//! that gets injected. The injection pipeline only depends on this trait, so
//! enumeration and hashing strategies can be swapped without touching it.

mod glob;

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ManifestConfig;
use crate::manifest::{ManifestEntry, TransformError};

pub use glob::GlobManifestSource;

/// Errors that can occur while building a manifest.
#[derive(Debug, Error)]
pub enum AcquireError {
  #[error("unable to read glob directory {}: {source}", path.display())]
  GlobDirectory { path: PathBuf, source: std::io::Error },

  #[error("glob directory {} is not a directory", path.display())]
  NotADirectory { path: PathBuf },

  #[error("invalid glob pattern '{pattern}': {message}")]
  InvalidPattern { pattern: String, message: String },

  #[error("failed to walk {}: {message}", path.display())]
  Walk { path: PathBuf, message: String },

  #[error("failed to read file {}: {source}", path.display())]
  ReadFile { path: PathBuf, source: std::io::Error },

  #[error("templated URL '{url}' did not match any files")]
  UnmatchedTemplatedUrl { url: String },

  #[error("manifest transform failed: {0}")]
  Transform(#[from] TransformError),

  #[error("manifest contains duplicate URL '{0}'")]
  DuplicateUrl(String),

  #[error("manifest task failed: {0}")]
  Task(String),
}

/// Produces manifest entries for a configuration.
///
/// Implementations must be read-only and deterministic: an unchanged tree and
/// config yield byte-identical entries on every call.
pub trait ManifestSource {
  fn entries(
    &self,
    config: &ManifestConfig,
  ) -> impl Future<Output = Result<Vec<ManifestEntry>, AcquireError>> + Send;
}

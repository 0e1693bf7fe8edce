//! The manifest injection pipeline.
//!
//! Stages run strictly in sequence and the first failure aborts the run:
//! 1. Validate the config (no filesystem access)
//! 2. Acquire manifest entries from a [`ManifestSource`]
//! 3. Read `sw_src` fully and prepend the manifest assignment
//! 4. Create the parent directories of `sw_dest` and write the result
//!
//! `sw_dest` is never touched unless every earlier stage succeeded. Because the
//! source is buffered before the write starts, `sw_src` and `sw_dest` may be
//! the same file.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::compose::compose_script;
use crate::config::{ConfigError, PrependConfig};
use crate::source::{AcquireError, GlobManifestSource, ManifestSource};
use crate::write::{WriteError, write_script};

/// Errors that can occur while injecting a manifest.
#[derive(Debug, Error)]
pub enum PrependError {
  #[error("invalid prepend manifest argument: {0}")]
  InvalidArgument(#[from] ConfigError),

  #[error(transparent)]
  Acquire(#[from] AcquireError),

  #[error("failed to read {}: {source}", path.display())]
  ReadSource { path: PathBuf, source: io::Error },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error(transparent)]
  Write(#[from] WriteError),
}

/// Inject a manifest of the assets under `glob_directory` into `sw_src` and
/// write the result to `sw_dest`.
///
/// # Example
///
/// ```ignore
/// let manifest = ManifestConfig::new("build").with_glob_patterns(["**/*.{html,js,css}"]);
/// let config = PrependConfig::new("src/sw.js", "build/sw.js", manifest);
/// prepend_manifest(&config).await?;
/// ```
pub async fn prepend_manifest(config: &PrependConfig) -> Result<(), PrependError> {
  prepend_manifest_with(config, &GlobManifestSource).await
}

/// Same as [`prepend_manifest`] with a caller-supplied manifest source.
pub async fn prepend_manifest_with<S>(config: &PrependConfig, source: &S) -> Result<(), PrependError>
where
  S: ManifestSource,
{
  config.validate()?;

  let entries = source.entries(&config.acquisition_config()).await?;

  let script = fs::read(&config.sw_src).await.map_err(|e| PrependError::ReadSource {
    path: config.sw_src.clone(),
    source: e,
  })?;

  let composed = compose_script(&config.manifest_variable_name, &entries, &script)?;
  write_script(&config.sw_dest, &composed).await?;

  info!(
    src = ?config.sw_src,
    dest = ?config.sw_dest,
    entries = entries.len(),
    "injected manifest"
  );
  Ok(())
}

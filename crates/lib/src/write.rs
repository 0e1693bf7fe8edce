//! Durable write of the composed script.
//!
//! Parent directories are created first. The content then goes to a sibling
//! temporary file which is renamed over the destination, so readers see either
//! the previous file or the complete new one. An existing destination keeps
//! its permissions, and a symlinked destination is written through: the link
//! stays and its target is replaced.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors that can occur while writing the destination script.
#[derive(Debug, Error)]
pub enum WriteError {
  #[error("unable to make output directory {}: '{source}'", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

/// Write `contents` to `dest`, replacing any existing file.
pub async fn write_script(dest: &Path, contents: &[u8]) -> Result<(), WriteError> {
  if let Some(dir) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(dir).await.map_err(|e| WriteError::CreateDir {
      path: dir.to_path_buf(),
      source: e,
    })?;
  }

  let target = match fs::canonicalize(dest).await {
    Ok(resolved) => resolved,
    Err(_) => dest.to_path_buf(),
  };
  let write_error = |source: io::Error| WriteError::Write {
    path: dest.to_path_buf(),
    source,
  };

  let temp_path = temp_path_for(&target)
    .ok_or_else(|| write_error(io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name")))?;

  if let Err(e) = replace_with(&target, &temp_path, contents).await {
    let _ = fs::remove_file(&temp_path).await;
    return Err(write_error(e));
  }

  debug!(path = ?dest, target = ?target, bytes = contents.len(), "wrote script");
  Ok(())
}

async fn replace_with(target: &Path, temp_path: &Path, contents: &[u8]) -> io::Result<()> {
  fs::write(temp_path, contents).await?;
  if let Ok(existing) = fs::metadata(target).await {
    fs::set_permissions(temp_path, existing.permissions()).await?;
  }
  fs::rename(temp_path, target).await
}

/// `dir/.name.<pid>.tmp` next to `dest`.
fn temp_path_for(dest: &Path) -> Option<PathBuf> {
  let name = dest.file_name()?;
  let mut temp_name = OsString::from(".");
  temp_name.push(name);
  temp_name.push(format!(".{}.tmp", std::process::id()));
  Some(dest.with_file_name(temp_name))
}

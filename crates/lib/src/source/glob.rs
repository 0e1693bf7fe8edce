//! Glob-based manifest source.
//!
//! Walks `glob_directory`, keeps files matching any include glob and no ignore
//! glob, and uses the MD5 of each file's content as its revision. Globs use
//! gitignore syntax with `{a,b}` alternation and are matched relative to the
//! directory root.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use tokio::task;
use tracing::{debug, info, warn};

use super::{AcquireError, ManifestSource};
use crate::config::{ManifestConfig, TemplatedUrl};
use crate::manifest::{ManifestEntry, ManifestTransform, ModifyUrlPrefix, NoRevisionForUrlsMatching};
use crate::util::hash::{ContentHash, hash_bytes, hash_composite, hash_file};

/// The default [`ManifestSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobManifestSource;

/// A hashed asset before transforms are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileDetails {
  url: String,
  hash: ContentHash,
  size: u64,
}

impl FileDetails {
  fn into_entry(self) -> ManifestEntry {
    ManifestEntry::new(self.url, self.hash.0)
  }
}

impl ManifestSource for GlobManifestSource {
  async fn entries(&self, config: &ManifestConfig) -> Result<Vec<ManifestEntry>, AcquireError> {
    let walk_config = config.clone();
    let details = task::spawn_blocking(move || enumerate(&walk_config))
      .await
      .map_err(|e| AcquireError::Task(e.to_string()))??;

    let entries = filter_oversized(details, config.maximum_file_size_to_cache_in_bytes)
      .into_iter()
      .map(FileDetails::into_entry)
      .collect();

    let entries = apply_transforms(entries, config)?;
    ensure_unique(&entries)?;

    info!(
      directory = ?config.glob_directory,
      entries = entries.len(),
      "generated manifest"
    );
    Ok(entries)
  }
}

/// Hash every matched file, then every templated URL.
fn enumerate(config: &ManifestConfig) -> Result<Vec<FileDetails>, AcquireError> {
  let root = config.glob_directory.as_path();

  let metadata = fs::metadata(root).map_err(|e| AcquireError::GlobDirectory {
    path: root.to_path_buf(),
    source: e,
  })?;
  if !metadata.is_dir() {
    return Err(AcquireError::NotADirectory {
      path: root.to_path_buf(),
    });
  }

  let ignores = build_matcher(root, &config.glob_ignores)?;
  let includes = build_matcher(root, &config.glob_patterns)?;

  let mut details = Vec::new();
  for (url, path) in matching_files(root, &includes, &ignores)? {
    let hashed = hash_file(&path).map_err(|e| AcquireError::ReadFile { path, source: e })?;
    details.push(FileDetails {
      url,
      hash: hashed.hash,
      size: hashed.size,
    });
  }
  debug!(directory = ?root, files = details.len(), "hashed matching files");

  for (url, source) in &config.templated_urls {
    details.push(templated_details(root, url, source, &ignores)?);
  }

  Ok(details)
}

fn templated_details(
  root: &Path,
  url: &str,
  source: &TemplatedUrl,
  ignores: &Override,
) -> Result<FileDetails, AcquireError> {
  match source {
    TemplatedUrl::Content(content) => Ok(FileDetails {
      url: url.to_string(),
      hash: hash_bytes(content.as_bytes()),
      size: content.len() as u64,
    }),
    TemplatedUrl::Files(patterns) => {
      let includes = build_matcher(root, patterns)?;
      let files = matching_files(root, &includes, ignores)?;
      if files.is_empty() {
        return Err(AcquireError::UnmatchedTemplatedUrl { url: url.to_string() });
      }

      let mut hashes = Vec::with_capacity(files.len());
      let mut size = 0;
      for (_, path) in files {
        let hashed = hash_file(&path).map_err(|e| AcquireError::ReadFile { path, source: e })?;
        size += hashed.size;
        hashes.push(hashed.hash);
      }

      Ok(FileDetails {
        url: url.to_string(),
        hash: hash_composite(&hashes),
        size,
      })
    }
  }
}

fn build_matcher(root: &Path, patterns: &[String]) -> Result<Override, AcquireError> {
  let mut builder = OverrideBuilder::new(root);
  for pattern in patterns {
    builder.add(pattern).map_err(|e| AcquireError::InvalidPattern {
      pattern: pattern.clone(),
      message: e.to_string(),
    })?;
  }
  builder.build().map_err(|e| AcquireError::InvalidPattern {
    pattern: patterns.join(", "),
    message: e.to_string(),
  })
}

/// Files under `root` selected by `includes` and not by `ignores`, as
/// `(url, path)` pairs sorted by URL.
fn matching_files(root: &Path, includes: &Override, ignores: &Override) -> Result<Vec<(String, PathBuf)>, AcquireError> {
  let mut builder = WalkBuilder::new(root);
  builder
    .standard_filters(false)
    .hidden(true)
    .follow_links(false)
    .sort_by_file_name(|a, b| a.cmp(b));

  let mut files = Vec::new();
  for entry in builder.build() {
    let entry = entry.map_err(|e| AcquireError::Walk {
      path: root.to_path_buf(),
      message: e.to_string(),
    })?;

    if !entry.file_type().is_some_and(|t| t.is_file()) {
      continue;
    }

    let path = entry.path();
    if !includes.matched(path, false).is_whitelist() || ignores.matched(path, false).is_whitelist() {
      continue;
    }

    files.push((relative_url(root, path), path.to_path_buf()));
  }

  files.sort_by(|a, b| a.0.cmp(&b.0));
  Ok(files)
}

/// `/`-separated path of `path` relative to `root`.
fn relative_url(root: &Path, path: &Path) -> String {
  let relative = path.strip_prefix(root).unwrap_or(path);
  relative
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

fn filter_oversized(details: Vec<FileDetails>, limit: u64) -> Vec<FileDetails> {
  details
    .into_iter()
    .filter(|d| {
      if d.size > limit {
        warn!(
          url = %d.url,
          size = d.size,
          limit,
          "skipping asset larger than maximumFileSizeToCacheInBytes"
        );
        return false;
      }
      true
    })
    .collect()
}

fn apply_transforms(entries: Vec<ManifestEntry>, config: &ManifestConfig) -> Result<Vec<ManifestEntry>, AcquireError> {
  let mut entries = entries;

  if let Some(pattern) = &config.dont_cache_bust_urls_matching {
    entries = NoRevisionForUrlsMatching(pattern.clone()).transform(entries)?;
  }
  if !config.modify_url_prefix.is_empty() {
    entries = ModifyUrlPrefix(config.modify_url_prefix.clone()).transform(entries)?;
  }
  for transform in &config.manifest_transforms {
    entries = transform.transform(entries)?;
  }

  Ok(entries)
}

fn ensure_unique(entries: &[ManifestEntry]) -> Result<(), AcquireError> {
  let mut seen = HashSet::with_capacity(entries.len());
  for entry in entries {
    if !seen.insert(entry.url.as_str()) {
      return Err(AcquireError::DuplicateUrl(entry.url.clone()));
    }
  }
  Ok(())
}

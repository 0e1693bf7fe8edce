//! Built-in manifest transforms.
//!
//! These run before any caller-supplied transform, cache-busting exemption
//! first and prefix rewriting second.

use indexmap::IndexMap;
use regex::Regex;

use super::types::{ManifestEntry, ManifestTransform, TransformError};

/// Drops the revision of every entry whose URL matches the pattern.
///
/// Used for assets that already carry a content hash in their file name.
#[derive(Debug, Clone)]
pub struct NoRevisionForUrlsMatching(pub Regex);

impl ManifestTransform for NoRevisionForUrlsMatching {
  fn transform(&self, entries: Vec<ManifestEntry>) -> Result<Vec<ManifestEntry>, TransformError> {
    Ok(
      entries
        .into_iter()
        .map(|mut entry| {
          if self.0.is_match(&entry.url) {
            entry.revision = None;
          }
          entry
        })
        .collect(),
    )
  }
}

/// Replaces a leading URL prefix.
///
/// Prefixes are tried in map order and only the first one that matches is
/// applied, once.
#[derive(Debug, Clone, Default)]
pub struct ModifyUrlPrefix(pub IndexMap<String, String>);

impl ModifyUrlPrefix {
  fn rewrite(&self, url: &str) -> Option<String> {
    self
      .0
      .iter()
      .find(|(prefix, _)| url.starts_with(prefix.as_str()))
      .map(|(prefix, replacement)| format!("{}{}", replacement, &url[prefix.len()..]))
  }
}

impl ManifestTransform for ModifyUrlPrefix {
  fn transform(&self, entries: Vec<ManifestEntry>) -> Result<Vec<ManifestEntry>, TransformError> {
    Ok(
      entries
        .into_iter()
        .map(|mut entry| {
          if let Some(url) = self.rewrite(&entry.url) {
            entry.url = url;
          }
          entry
        })
        .collect(),
    )
  }
}

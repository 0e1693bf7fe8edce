//! Configuration for manifest generation and injection.
//!
//! Configs can be built in code with the `with_*` setters or loaded from a
//! JSON object using the camelCase keys of the original build tooling:
//!
//! ```json
//! {
//!   "swSrc": "src/sw.js",
//!   "swDest": "build/sw.js",
//!   "globDirectory": "build",
//!   "globPatterns": ["**/*.{html,js,css}"],
//!   "globIgnores": "admin.html",
//!   "dontCacheBustUrlsMatching": "\\.\\w{8}\\.",
//!   "manifestVariableName": "self.__file_manifest"
//! }
//! ```
//!
//! Loading always ends in [`PrependConfig::validate`], which never touches the
//! filesystem.

mod de;

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_GLOB_IGNORES, DEFAULT_GLOB_PATTERNS, DEFAULT_MANIFEST_VARIABLE, DEFAULT_MAXIMUM_FILE_SIZE};
use crate::manifest::ManifestTransform;

/// Keys accepted by [`ManifestConfig::from_value`].
const MANIFEST_KEYS: &[&str] = &[
  "globDirectory",
  "globPatterns",
  "globIgnores",
  "templatedUrls",
  "modifyUrlPrefix",
  "maximumFileSizeToCacheInBytes",
  "dontCacheBustUrlsMatching",
];

/// Keys accepted by [`PrependConfig::from_value`] in addition to [`MANIFEST_KEYS`].
const PREPEND_KEYS: &[&str] = &["swSrc", "swDest", "manifestVariableName"];

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("configuration must be a JSON object")]
  NotAnObject,

  #[error("unknown option '{0}'")]
  UnknownKey(String),

  #[error("{0}")]
  Shape(#[source] serde_json::Error),

  #[error("'{field}' {reason}")]
  Invalid { field: &'static str, reason: String },

  #[error("failed to read config file {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse config file {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },
}

impl ConfigError {
  fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
    ConfigError::Invalid {
      field,
      reason: reason.into(),
    }
  }
}

/// How the revision of a templated URL is derived.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TemplatedUrl {
  /// Globs whose matched files together determine the rendered content.
  Files(Vec<String>),
  /// A literal string that uniquely identifies the rendered content.
  Content(String),
}

/// Settings for enumerating and hashing the assets of a build directory.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestConfig {
  /// Root the globs are matched against. URLs are relative to it.
  pub glob_directory: PathBuf,

  #[serde(default = "default_glob_patterns")]
  pub glob_patterns: Vec<String>,

  #[serde(default = "default_glob_ignores", deserialize_with = "de::one_or_many")]
  pub glob_ignores: Vec<String>,

  /// Server-rendered URLs, in the order they are appended to the manifest.
  #[serde(default)]
  pub templated_urls: IndexMap<String, TemplatedUrl>,

  #[serde(default)]
  pub modify_url_prefix: IndexMap<String, String>,

  #[serde(default = "default_maximum_file_size")]
  pub maximum_file_size_to_cache_in_bytes: u64,

  #[serde(default, deserialize_with = "de::optional_regex")]
  pub dont_cache_bust_urls_matching: Option<Regex>,

  /// Applied after the built-in transforms. Code-only.
  #[serde(skip)]
  pub manifest_transforms: Vec<Arc<dyn ManifestTransform>>,
}

fn default_glob_patterns() -> Vec<String> {
  DEFAULT_GLOB_PATTERNS.iter().map(|s| s.to_string()).collect()
}

fn default_glob_ignores() -> Vec<String> {
  DEFAULT_GLOB_IGNORES.iter().map(|s| s.to_string()).collect()
}

fn default_maximum_file_size() -> u64 {
  DEFAULT_MAXIMUM_FILE_SIZE
}

fn default_manifest_variable_name() -> String {
  DEFAULT_MANIFEST_VARIABLE.to_string()
}

impl fmt::Debug for ManifestConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ManifestConfig")
      .field("glob_directory", &self.glob_directory)
      .field("glob_patterns", &self.glob_patterns)
      .field("glob_ignores", &self.glob_ignores)
      .field("templated_urls", &self.templated_urls)
      .field("modify_url_prefix", &self.modify_url_prefix)
      .field(
        "maximum_file_size_to_cache_in_bytes",
        &self.maximum_file_size_to_cache_in_bytes,
      )
      .field("dont_cache_bust_urls_matching", &self.dont_cache_bust_urls_matching)
      .field("manifest_transforms", &self.manifest_transforms.len())
      .finish()
  }
}

impl ManifestConfig {
  pub fn new(glob_directory: impl Into<PathBuf>) -> Self {
    Self {
      glob_directory: glob_directory.into(),
      glob_patterns: default_glob_patterns(),
      glob_ignores: default_glob_ignores(),
      templated_urls: IndexMap::new(),
      modify_url_prefix: IndexMap::new(),
      maximum_file_size_to_cache_in_bytes: DEFAULT_MAXIMUM_FILE_SIZE,
      dont_cache_bust_urls_matching: None,
      manifest_transforms: Vec::new(),
    }
  }

  /// Shape-check a JSON object and build a validated config from it.
  pub fn from_value(value: Value) -> Result<Self, ConfigError> {
    check_keys(&value, &[MANIFEST_KEYS])?;
    let config: Self = serde_json::from_value(value).map_err(ConfigError::Shape)?;
    config.validate()?;
    Ok(config)
  }

  pub fn with_glob_patterns<I, S>(mut self, patterns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.glob_patterns = patterns.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_glob_ignores<I, S>(mut self, ignores: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.glob_ignores = ignores.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_templated_url(mut self, url: impl Into<String>, source: TemplatedUrl) -> Self {
    self.templated_urls.insert(url.into(), source);
    self
  }

  pub fn with_modify_url_prefix(mut self, prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
    self.modify_url_prefix.insert(prefix.into(), replacement.into());
    self
  }

  pub fn with_maximum_file_size(mut self, bytes: u64) -> Self {
    self.maximum_file_size_to_cache_in_bytes = bytes;
    self
  }

  pub fn with_dont_cache_bust(mut self, pattern: Regex) -> Self {
    self.dont_cache_bust_urls_matching = Some(pattern);
    self
  }

  pub fn with_transform(mut self, transform: impl ManifestTransform + 'static) -> Self {
    self.manifest_transforms.push(Arc::new(transform));
    self
  }

  /// This config with `sw_dest` added to the ignores when it lies inside
  /// `glob_directory`.
  ///
  /// A previously written destination that matches the globs would otherwise
  /// be hashed on the next run and the output would never settle. Both paths
  /// are resolved through the filesystem first, so `..` segments and symlinks
  /// do not hide the overlap.
  pub fn excluding_destination(&self, sw_dest: &Path) -> Cow<'_, Self> {
    let Some(relative) = destination_within(&self.glob_directory, sw_dest) else {
      return Cow::Borrowed(self);
    };
    if relative.is_empty() || relative.contains(['*', '?', '[', ']', '{', '}', '\\', '!']) {
      return Cow::Borrowed(self);
    }

    debug!(pattern = %relative, "ignoring destination inside glob directory");
    let mut owned = self.clone();
    owned.glob_ignores.push(format!("/{}", relative));
    Cow::Owned(owned)
  }

  /// Check the config for values that can never produce a manifest.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.glob_directory.as_os_str().is_empty() {
      return Err(ConfigError::invalid("globDirectory", "must not be empty"));
    }
    if self.glob_patterns.is_empty() {
      return Err(ConfigError::invalid("globPatterns", "must contain at least one pattern"));
    }
    if self.glob_patterns.iter().any(|p| p.is_empty()) {
      return Err(ConfigError::invalid("globPatterns", "must not contain empty patterns"));
    }
    if self.glob_ignores.iter().any(|p| p.is_empty()) {
      return Err(ConfigError::invalid("globIgnores", "must not contain empty patterns"));
    }
    for (url, source) in &self.templated_urls {
      if url.is_empty() {
        return Err(ConfigError::invalid("templatedUrls", "must not contain an empty URL"));
      }
      if let TemplatedUrl::Files(patterns) = source {
        if patterns.is_empty() || patterns.iter().any(|p| p.is_empty()) {
          return Err(ConfigError::invalid(
            "templatedUrls",
            format!("'{}' must list at least one non-empty pattern", url),
          ));
        }
      }
    }
    if self.modify_url_prefix.keys().any(|k| k.is_empty()) {
      return Err(ConfigError::invalid("modifyUrlPrefix", "must not contain an empty prefix"));
    }
    if self.maximum_file_size_to_cache_in_bytes == 0 {
      return Err(ConfigError::invalid("maximumFileSizeToCacheInBytes", "must be greater than zero"));
    }
    Ok(())
  }
}

/// Settings for reading a script, injecting a manifest, and writing the result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrependConfig {
  /// Script the manifest is injected into.
  pub sw_src: PathBuf,

  /// Where the composed script is written. Parent directories are created.
  pub sw_dest: PathBuf,

  /// Binding the manifest is assigned to, e.g. `self.__file_manifest`.
  #[serde(default = "default_manifest_variable_name")]
  pub manifest_variable_name: String,

  #[serde(flatten)]
  pub manifest: ManifestConfig,
}

impl PrependConfig {
  pub fn new(sw_src: impl Into<PathBuf>, sw_dest: impl Into<PathBuf>, manifest: ManifestConfig) -> Self {
    Self {
      sw_src: sw_src.into(),
      sw_dest: sw_dest.into(),
      manifest_variable_name: default_manifest_variable_name(),
      manifest,
    }
  }

  pub fn with_manifest_variable_name(mut self, name: impl Into<String>) -> Self {
    self.manifest_variable_name = name.into();
    self
  }

  /// Shape-check a JSON object and build a validated config from it.
  pub fn from_value(value: Value) -> Result<Self, ConfigError> {
    check_keys(&value, &[PREPEND_KEYS, MANIFEST_KEYS])?;
    let config: Self = serde_json::from_value(value).map_err(ConfigError::Shape)?;
    config.validate()?;
    Ok(config)
  }

  /// Load a JSON config file.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    Self::from_value(read_json(path)?)
  }

  /// The manifest settings a run actually enumerates with: [`Self::manifest`]
  /// minus the destination script itself.
  pub fn acquisition_config(&self) -> Cow<'_, ManifestConfig> {
    self.manifest.excluding_destination(&self.sw_dest)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.sw_src.as_os_str().is_empty() {
      return Err(ConfigError::invalid("swSrc", "must not be empty"));
    }
    if self.sw_dest.as_os_str().is_empty() {
      return Err(ConfigError::invalid("swDest", "must not be empty"));
    }
    if !is_binding_path(&self.manifest_variable_name) {
      return Err(ConfigError::invalid(
        "manifestVariableName",
        format!("'{}' is not a valid JavaScript binding", self.manifest_variable_name),
      ));
    }
    self.manifest.validate()
  }
}

/// `/`-separated path of `dest` below `root`, if it is below it at all.
fn destination_within(root: &Path, dest: &Path) -> Option<String> {
  let relative = match (fs::canonicalize(root), resolve_destination(dest)) {
    (Ok(root), Some(dest)) => dest.strip_prefix(&root).ok()?.to_path_buf(),
    _ => {
      let root = std::path::absolute(root).ok()?;
      let dest = std::path::absolute(dest).ok()?;
      dest.strip_prefix(&root).ok()?.to_path_buf()
    }
  };

  Some(
    relative
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/"),
  )
}

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing tail re-appended.
fn resolve_destination(dest: &Path) -> Option<PathBuf> {
  let absolute = std::path::absolute(dest).ok()?;
  let mut existing = absolute.as_path();
  let mut missing = Vec::new();
  loop {
    match fs::canonicalize(existing) {
      Ok(resolved) => return Some(missing.iter().rev().fold(resolved, |path, name| path.join(name))),
      Err(_) => {
        missing.push(existing.file_name()?.to_os_string());
        existing = existing.parent()?;
      }
    }
  }
}

/// Read a file and parse it as JSON without interpreting its shape.
pub fn read_json(path: &Path) -> Result<Value, ConfigError> {
  let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
    path: path.to_path_buf(),
    source: e,
  })?;
  serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
    path: path.to_path_buf(),
    source: e,
  })
}

fn check_keys(value: &Value, allowed: &[&[&str]]) -> Result<(), ConfigError> {
  let object = value.as_object().ok_or(ConfigError::NotAnObject)?;
  for key in object.keys() {
    if !allowed.iter().any(|keys| keys.contains(&key.as_str())) {
      return Err(ConfigError::UnknownKey(key.clone()));
    }
  }
  Ok(())
}

/// `foo`, `self.__file_manifest`, `$app.assets`.
fn is_binding_path(name: &str) -> bool {
  fn is_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
  }
  fn is_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
  }

  !name.is_empty()
    && name.split('.').all(|segment| {
      let mut chars = segment.chars();
      matches!(chars.next(), Some(c) if is_start(c)) && chars.all(is_part)
    })
}

//! Config flags shared by every command.
//!
//! Flags are layered over the JSON config file (when given) key by key, so a
//! flag always wins over the file. The merged object goes through the same
//! shape check as a config file on its own.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::{Map, Value};

use precache_lib::config::read_json;

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
  /// JSON config file using camelCase keys (swSrc, globDirectory, ...)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// Directory the glob patterns are matched against
  #[arg(long)]
  pub glob_directory: Option<PathBuf>,

  /// Include files matching this glob (repeatable)
  #[arg(long = "glob-pattern", value_name = "GLOB")]
  pub glob_patterns: Vec<String>,

  /// Exclude files matching this glob (repeatable)
  #[arg(long = "glob-ignore", value_name = "GLOB")]
  pub glob_ignores: Vec<String>,

  /// Rewrite a leading URL prefix (repeatable)
  #[arg(long = "modify-url-prefix", value_name = "PREFIX=REPLACEMENT", value_parser = parse_prefix_rule)]
  pub modify_url_prefix: Vec<(String, String)>,

  /// Skip files larger than this many bytes
  #[arg(long, value_name = "BYTES")]
  pub maximum_file_size: Option<u64>,

  /// Omit revisions for URLs matching this regex
  #[arg(long, value_name = "REGEX")]
  pub dont_cache_bust: Option<String>,
}

impl ConfigArgs {
  /// Load the config file (if any) and apply flag overrides.
  pub fn to_object(&self) -> Result<Map<String, Value>> {
    let mut object = match &self.config {
      Some(path) => match read_json(path)? {
        Value::Object(object) => object,
        _ => bail!("config file {} must contain a JSON object", path.display()),
      },
      None => Map::new(),
    };

    if let Some(dir) = &self.glob_directory {
      object.insert("globDirectory".into(), path_value(dir)?);
    }
    if !self.glob_patterns.is_empty() {
      object.insert("globPatterns".into(), Value::from(self.glob_patterns.clone()));
    }
    if !self.glob_ignores.is_empty() {
      object.insert("globIgnores".into(), Value::from(self.glob_ignores.clone()));
    }
    if !self.modify_url_prefix.is_empty() {
      let rules = object
        .entry("modifyUrlPrefix")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .context("modifyUrlPrefix in config file must be an object")?;
      for (prefix, replacement) in &self.modify_url_prefix {
        rules.insert(prefix.clone(), Value::from(replacement.as_str()));
      }
    }
    if let Some(bytes) = self.maximum_file_size {
      object.insert("maximumFileSizeToCacheInBytes".into(), Value::from(bytes));
    }
    if let Some(pattern) = &self.dont_cache_bust {
      object.insert("dontCacheBustUrlsMatching".into(), Value::from(pattern.as_str()));
    }

    Ok(object)
  }
}

/// JSON string for a path flag. Config values are JSON, so the path must be UTF-8.
pub(super) fn path_value(path: &Path) -> Result<Value> {
  path
    .to_str()
    .map(Value::from)
    .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}

fn parse_prefix_rule(value: &str) -> Result<(String, String), String> {
  value
    .split_once('=')
    .map(|(prefix, replacement)| (prefix.to_string(), replacement.to_string()))
    .ok_or_else(|| format!("expected PREFIX=REPLACEMENT, got '{}'", value))
}

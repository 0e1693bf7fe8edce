//! Implementation of the `precache manifest` command.
//!
//! Prints the entries that `inject` would write, without touching any file.
//! Accepts the same config file as `inject`. When it names a `swDest`, that
//! script is left out of the listing exactly as `inject` leaves it out.

use std::borrow::Cow;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

use precache_lib::{GlobManifestSource, ManifestConfig, ManifestSource, PrependError};

use super::ConfigArgs;
use crate::output::{OutputFormat, format_bytes, print_entry, print_info, print_json, print_stat};

/// Keys only meaningful to `inject`.
const SCRIPT_KEYS: &[&str] = &["swSrc", "swDest", "manifestVariableName"];

pub fn cmd_manifest(args: &ConfigArgs, format: OutputFormat) -> Result<()> {
  let mut object = args.to_object()?;
  let sw_dest = object
    .get("swDest")
    .cloned()
    .map(serde_json::from_value::<PathBuf>)
    .transpose()
    .context("swDest must be a path")?;
  for key in SCRIPT_KEYS {
    object.remove(*key);
  }
  let config = ManifestConfig::from_value(Value::Object(object)).map_err(PrependError::from)?;
  let acquisition = match &sw_dest {
    Some(dest) => config.excluding_destination(dest),
    None => Cow::Borrowed(&config),
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let entries = rt
    .block_on(GlobManifestSource.entries(&acquisition))
    .context("Failed to build manifest")?;

  if format.is_json() {
    return print_json(&entries);
  }

  if entries.is_empty() {
    print_info("No files matched the glob patterns.");
    return Ok(());
  }

  for entry in &entries {
    print_entry(entry);
  }
  println!();
  print_stat("Entries", &entries.len().to_string());
  print_stat(
    "Size limit",
    &format_bytes(config.maximum_file_size_to_cache_in_bytes),
  );
  Ok(())
}

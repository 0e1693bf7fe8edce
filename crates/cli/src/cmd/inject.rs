//! Implementation of the `precache inject` command.
//!
//! Builds a manifest of the assets under the glob directory, prepends it to the
//! source script and writes the result to the destination.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::info;

use precache_lib::{PrependConfig, PrependError, prepend_manifest};

use super::ConfigArgs;
use super::args::path_value;
use crate::output::print_success;

#[derive(Debug, Clone, Args)]
pub struct InjectArgs {
  #[command(flatten)]
  pub config: ConfigArgs,

  /// Script to inject the manifest into
  #[arg(long)]
  pub sw_src: Option<PathBuf>,

  /// Output path for the composed script
  #[arg(long)]
  pub sw_dest: Option<PathBuf>,

  /// Global binding the manifest is assigned to
  #[arg(long, value_name = "NAME")]
  pub variable_name: Option<String>,
}

impl InjectArgs {
  fn to_config(&self) -> Result<PrependConfig> {
    let mut object = self.config.to_object()?;

    if let Some(src) = &self.sw_src {
      object.insert("swSrc".into(), path_value(src)?);
    }
    if let Some(dest) = &self.sw_dest {
      object.insert("swDest".into(), path_value(dest)?);
    }
    if let Some(name) = &self.variable_name {
      object.insert("manifestVariableName".into(), Value::from(name.as_str()));
    }

    PrependConfig::from_value(Value::Object(object))
      .map_err(PrependError::from)
      .map_err(Into::into)
  }
}

/// Execute the inject command.
///
/// # Errors
///
/// Returns an error if the config is invalid, the manifest cannot be built,
/// the source script cannot be read, or the destination cannot be written.
pub fn cmd_inject(args: &InjectArgs) -> Result<()> {
  let config = args.to_config()?;
  info!(src = ?config.sw_src, dest = ?config.sw_dest, "injecting manifest");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(prepend_manifest(&config))
    .context("Failed to inject manifest")?;

  print_success(&format!(
    "Injected {} into {}",
    config.manifest_variable_name,
    config.sw_dest.display()
  ));
  Ok(())
}

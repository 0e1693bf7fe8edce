//! Terminal output for the precache commands.
//!
//! Status lines go through the `print_*` helpers so color handling stays in
//! one place. Manifest entries render as a revision column followed by the URL.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use precache_lib::ManifestEntry;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const INFO: &str = "•";
  pub const DASH: &str = "-";
}

/// Width of the revision column in entry listings.
const REVISION_WIDTH: usize = 12;

pub fn truncate_hash(hash: &str) -> &str {
  match hash.char_indices().nth(REVISION_WIDTH) {
    Some((end, _)) => &hash[..end],
    None => hash,
  }
}

/// Shortened revision, or a dash for entries the browser never cache-busts.
pub fn revision_label(entry: &ManifestEntry) -> &str {
  entry.revision.as_deref().map(truncate_hash).unwrap_or(symbols::DASH)
}

/// One manifest entry as `  <revision>  <url>`.
pub fn print_entry(entry: &ManifestEntry) {
  println!(
    "  {:<width$}  {}",
    revision_label(entry).if_supports_color(Stream::Stdout, |s| s.dimmed()),
    entry.url,
    width = REVISION_WIDTH
  );
}

pub fn format_bytes(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;
  const GB: u64 = MB * 1024;

  if bytes >= GB {
    format!("{:.1} GB", bytes as f64 / GB as f64)
  } else if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{} B", bytes)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

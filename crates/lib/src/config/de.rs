//! Deserializers for config fields whose JSON form is looser than their Rust type.

use regex::Regex;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
  One(String),
  Many(Vec<String>),
}

/// Accepts either a single string or a list of strings.
pub fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match OneOrMany::deserialize(deserializer)? {
    OneOrMany::One(value) => vec![value],
    OneOrMany::Many(values) => values,
  })
}

/// Compiles an optional regex source string.
pub fn optional_regex<'de, D>(deserializer: D) -> Result<Option<Regex>, D::Error>
where
  D: Deserializer<'de>,
{
  let source: Option<String> = Option::deserialize(deserializer)?;
  source
    .map(|s| Regex::new(&s).map_err(|e| serde::de::Error::custom(format!("invalid regex '{}': {}", s, e))))
    .transpose()
}

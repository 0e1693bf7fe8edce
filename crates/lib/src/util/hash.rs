//! Content hashing for manifest revisions.
//!
//! Revisions are lowercase hex MD5 digests. They only need to change when
//! content changes, so a fast digest is enough:
//! - `hash_file()`: streamed hash of a single file, with its size
//! - `hash_bytes()`: arbitrary byte hashing
//! - `hash_composite()`: one revision derived from several others

use std::fs;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// A 32-character hex digest identifying a revision of some content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Digest and byte length of a hashed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHash {
  pub hash: ContentHash,
  pub size: u64,
}

/// Hash a file's contents.
///
/// The file is read in fixed-size chunks so large assets never need to be
/// fully buffered.
pub fn hash_file(path: &Path) -> Result<FileHash, std::io::Error> {
  let mut file = fs::File::open(path)?;

  let mut hasher = Md5::new();
  let mut buffer = [0u8; 8192];
  let mut size = 0u64;

  loop {
    let bytes_read = file.read(&mut buffer)?;
    if bytes_read == 0 {
      break;
    }
    size += bytes_read as u64;
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(FileHash {
    hash: ContentHash(format!("{:x}", hasher.finalize())),
    size,
  })
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Md5::new();
  hasher.update(data);
  ContentHash(format!("{:x}", hasher.finalize()))
}

/// Combine several revisions into one.
///
/// The hex strings are fed to the digest in order, so the result depends on
/// both the member revisions and their order.
pub fn hash_composite<'a, I>(hashes: I) -> ContentHash
where
  I: IntoIterator<Item = &'a ContentHash>,
{
  let mut hasher = Md5::new();
  for hash in hashes {
    hasher.update(hash.0.as_bytes());
  }
  ContentHash(format!("{:x}", hasher.finalize()))
}

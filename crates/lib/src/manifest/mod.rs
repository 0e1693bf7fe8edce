//! Precache manifest types.
//!
//! A manifest is the ordered list of `{url, revision}` entries describing every
//! asset a service worker should cache, plus the transform seam that lets
//! callers rewrite that list before it is injected.

mod transform;
mod types;

pub use transform::{ModifyUrlPrefix, NoRevisionForUrlsMatching};
pub use types::*;

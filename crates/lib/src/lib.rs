//! precache-lib: build-time precache manifests for service workers
//!
//! This crate enumerates the static assets of a build directory into a
//! deterministic, revisioned manifest and injects it into a script:
//! - `config`: `ManifestConfig` / `PrependConfig` and their validation
//! - `manifest`: `ManifestEntry` and the `ManifestTransform` seam
//! - `source`: the `ManifestSource` trait and its glob-based default
//! - `compose`: renders the manifest assignment in front of a script
//! - `write`: creates directories and replaces the destination atomically
//! - `prepend`: the `prepend_manifest` pipeline tying these together

pub mod compose;
pub mod config;
pub mod consts;
pub mod manifest;
pub mod prepend;
pub mod source;
pub mod util;
pub mod write;

pub use config::{ConfigError, ManifestConfig, PrependConfig, TemplatedUrl};
pub use manifest::{ManifestEntry, ManifestTransform, TransformError};
pub use prepend::{PrependError, prepend_manifest, prepend_manifest_with};
pub use source::{AcquireError, GlobManifestSource, ManifestSource};

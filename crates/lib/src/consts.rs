/// Global binding the manifest is assigned to when no variable name is configured.
pub const DEFAULT_MANIFEST_VARIABLE: &str = "self.__file_manifest";

pub const DEFAULT_GLOB_PATTERNS: &[&str] = &["**/*.{js,css}"];

pub const DEFAULT_GLOB_IGNORES: &[&str] = &["node_modules/**/*"];

/// 2 MiB.
pub const DEFAULT_MAXIMUM_FILE_SIZE: u64 = 2 * 1024 * 1024;

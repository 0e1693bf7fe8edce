//! End-to-end tests for prepend_manifest against real directory trees.

use std::path::PathBuf;

use precache_lib::write::WriteError;
use precache_lib::{ManifestConfig, PrependConfig, PrependError, prepend_manifest};
use serde_json::json;

use super::common::{TestEnv, fixture_path, read};

const EXPECTED_PREFIX: &str = r#"self.__file_manifest = [
  {
    "url": "index.css",
    "revision": "d41d8cd98f00b204e9800998ecf8427e"
  },
  {
    "url": "index.html",
    "revision": "d41d8cd98f00b204e9800998ecf8427e"
  }
];
"#;

fn sample_config(sw_dest: PathBuf) -> PrependConfig {
  let samples = fixture_path("prepend-samples");
  let manifest = ManifestConfig::new(samples.join("assets")).with_glob_patterns(["**/*.{html,css}"]);
  PrependConfig::new(samples.join("service-worker.js"), sw_dest, manifest)
}

#[tokio::test]
async fn prepends_manifest_to_sample_worker() {
  let env = TestEnv::new();
  let dest = env.path("sw.js");

  prepend_manifest(&sample_config(dest.clone())).await.unwrap();

  let output = read(&dest);
  let original = read(&fixture_path("prepend-samples/service-worker.js"));
  assert!(output.starts_with(EXPECTED_PREFIX), "unexpected output:\n{}", output);
  assert_eq!(&output[EXPECTED_PREFIX.len()..], original);
  assert!(output[EXPECTED_PREFIX.len()..].starts_with("// sw body"));
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
  let env = TestEnv::new();
  env.write_file("build/index.html", "<html></html>");
  env.write_file("build/app.js", "console.log(1);");
  let src = env.write_file("src/sw.js", "// worker");

  // Destination inside the glob directory, matching the default patterns.
  let config = PrependConfig::new(src, env.path("build/sw.js"), ManifestConfig::new(env.path("build")));

  prepend_manifest(&config).await.unwrap();
  let first = std::fs::read(env.path("build/sw.js")).unwrap();
  prepend_manifest(&config).await.unwrap();
  let second = std::fs::read(env.path("build/sw.js")).unwrap();

  assert_eq!(first, second);
  assert!(!String::from_utf8(first).unwrap().contains("\"sw.js\""));
}

#[tokio::test]
async fn repeated_runs_settle_when_glob_directory_has_parent_segments() {
  let env = TestEnv::new();
  env.write_file("build/index.html", "<html></html>");
  env.write_file("other/keep", "");
  let src = env.write_file("src/sw.js", "// worker");

  let manifest = ManifestConfig::new(env.path("other/../build"));
  let config = PrependConfig::new(src, env.path("build/sw.js"), manifest);

  prepend_manifest(&config).await.unwrap();
  let first = std::fs::read(env.path("build/sw.js")).unwrap();
  prepend_manifest(&config).await.unwrap();
  let second = std::fs::read(env.path("build/sw.js")).unwrap();

  assert_eq!(first, second);
}

#[cfg(unix)]
#[tokio::test]
async fn symlinked_destination_updates_its_target() {
  let env = TestEnv::new();
  let target = env.write_file("real.js", "old");
  std::os::unix::fs::symlink(&target, env.path("link.js")).unwrap();

  prepend_manifest(&sample_config(env.path("link.js"))).await.unwrap();

  let link = std::fs::symlink_metadata(env.path("link.js")).unwrap();
  assert!(link.file_type().is_symlink());
  assert!(read(&target).starts_with(EXPECTED_PREFIX));
}

#[tokio::test]
async fn original_bytes_follow_the_assignment() {
  let env = TestEnv::new();
  env.write_file("build/a.js", "a");
  let body = "'use strict';\r\n\r\nself.addEventListener('install', () => {});\r\n";
  let src = env.write_file("sw.js", body);

  let config = PrependConfig::new(src, env.path("dist/sw.js"), ManifestConfig::new(env.path("build")));
  prepend_manifest(&config).await.unwrap();

  let output = env.read("dist/sw.js");
  let split = output.find("];\n").unwrap() + 3;
  assert_eq!(&output[split..], body);
}

#[tokio::test]
async fn creates_missing_destination_directories() {
  let env = TestEnv::new();
  let dest = env.path("deeply/nested/output/dir/sw.js");

  prepend_manifest(&sample_config(dest.clone())).await.unwrap();

  assert!(read(&dest).starts_with(EXPECTED_PREFIX));
}

#[tokio::test]
async fn malformed_config_is_rejected_without_writes() {
  let env = TestEnv::new();

  let err = PrependConfig::from_value(json!({
    "swSrc": fixture_path("prepend-samples/service-worker.js"),
    "swDest": env.path("out/sw.js"),
  }))
  .map_err(PrependError::from)
  .unwrap_err();
  assert!(err.to_string().starts_with("invalid prepend manifest argument:"));

  let mut config = sample_config(env.path("out/sw.js"));
  config.manifest.glob_patterns.clear();
  let err = prepend_manifest(&config).await.unwrap_err();

  assert!(matches!(err, PrependError::InvalidArgument(_)));
  assert!(!env.path("out").exists());
}

#[tokio::test]
async fn missing_source_is_read_error_and_destination_survives() {
  let env = TestEnv::new();
  env.write_file("build/a.js", "a");
  env.write_file("out/sw.js", "previous build");

  let config = PrependConfig::new(
    env.path("does-not-exist.js"),
    env.path("out/sw.js"),
    ManifestConfig::new(env.path("build")),
  );
  let err = prepend_manifest(&config).await.unwrap_err();

  assert!(matches!(err, PrependError::ReadSource { .. }));
  assert_eq!(env.read("out/sw.js"), "previous build");
}

#[tokio::test]
async fn missing_source_does_not_create_destination() {
  let env = TestEnv::new();
  env.write_file("build/a.js", "a");

  let config = PrependConfig::new(
    env.path("does-not-exist.js"),
    env.path("out/sw.js"),
    ManifestConfig::new(env.path("build")),
  );
  assert!(prepend_manifest(&config).await.is_err());
  assert!(!env.path("out").exists());
}

#[tokio::test]
async fn missing_glob_directory_fails_before_reading_source() {
  let env = TestEnv::new();
  let src = env.write_file("sw.js", "x");

  let config = PrependConfig::new(src, env.path("out/sw.js"), ManifestConfig::new(env.path("nope")));
  let err = prepend_manifest(&config).await.unwrap_err();

  assert!(matches!(err, PrependError::Acquire(_)));
  assert!(!env.path("out").exists());
}

#[tokio::test]
async fn unwritable_directory_is_reported_as_such() {
  let env = TestEnv::new();
  env.write_file("occupied", "file in the way");

  let err = prepend_manifest(&sample_config(env.path("occupied/sw.js")))
    .await
    .unwrap_err();

  assert!(matches!(err, PrependError::Write(WriteError::CreateDir { .. })));
  assert!(err.to_string().starts_with("unable to make output directory"));
}

#[tokio::test]
async fn source_and_destination_may_be_the_same_file() {
  let env = TestEnv::new();
  env.write_file("build/index.css", "");
  let sw = env.write_file("sw.js", "// in place");

  let manifest = ManifestConfig::new(env.path("build"));
  let config = PrependConfig::new(sw.clone(), sw.clone(), manifest);
  prepend_manifest(&config).await.unwrap();

  let output = read(&sw);
  assert!(output.starts_with("self.__file_manifest = [\n"));
  assert!(output.ends_with("];\n// in place"));
}

#[tokio::test]
async fn independent_invocations_can_run_concurrently() {
  let env = TestEnv::new();
  let first = sample_config(env.path("one/sw.js"));
  let second = sample_config(env.path("two/sw.js"));

  let (a, b) = tokio::join!(prepend_manifest(&first), prepend_manifest(&second));
  a.unwrap();
  b.unwrap();

  assert_eq!(env.read("one/sw.js"), env.read("two/sw.js"));
}

//! Inject command integration tests.

use predicates::prelude::*;

use super::common::{EMPTY_MD5, TestEnv};

fn expected_prefix(variable: &str) -> String {
  format!(
    "{} = [\n  {{\n    \"url\": \"index.css\",\n    \"revision\": \"{md5}\"\n  }},\n  {{\n    \"url\": \"index.html\",\n    \"revision\": \"{md5}\"\n  }}\n];\n",
    variable,
    md5 = EMPTY_MD5
  )
}

#[test]
fn inject_with_flags() {
  let env = TestEnv::with_sample_site();

  env
    .precache_cmd()
    .args([
      "inject",
      "--sw-src",
      "src/sw.js",
      "--sw-dest",
      "dist/sw.js",
      "--glob-directory",
      "build",
      "--glob-pattern",
      "**/*.{html,css}",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Injected self.__file_manifest into"));

  let output = env.read("dist/sw.js");
  assert_eq!(output, format!("{}// sw body", expected_prefix("self.__file_manifest")));
}

#[test]
fn inject_with_config_file() {
  let env = TestEnv::with_sample_site();
  env.write_file(
    "precache.json",
    r#"{
      "swSrc": "src/sw.js",
      "swDest": "dist/sw.js",
      "globDirectory": "build",
      "globPatterns": ["**/*.{html,css}"],
      "manifestVariableName": "assetManifest"
    }"#,
  );

  env
    .precache_cmd()
    .args(["inject", "--config", "precache.json"])
    .assert()
    .success();

  assert!(env.read("dist/sw.js").starts_with(&expected_prefix("assetManifest")));
}

#[test]
fn flags_override_config_file() {
  let env = TestEnv::with_sample_site();
  env.write_file(
    "precache.json",
    r#"{ "swSrc": "src/sw.js", "swDest": "dist/sw.js", "globDirectory": "build", "globPatterns": ["**/*.{html,css}"] }"#,
  );

  env
    .precache_cmd()
    .args(["inject", "--config", "precache.json", "--sw-dest", "other/sw.js"])
    .assert()
    .success();

  assert!(env.path("other/sw.js").exists());
  assert!(!env.path("dist").exists());
}

#[test]
fn inject_is_idempotent() {
  let env = TestEnv::with_sample_site();
  let args = [
    "inject",
    "--sw-src",
    "src/sw.js",
    "--sw-dest",
    "build/sw.js",
    "--glob-directory",
    "build",
    "--glob-pattern",
    "**/*.{html,css,js}",
  ];

  env.precache_cmd().args(args).assert().success();
  let first = env.read("build/sw.js");
  env.precache_cmd().args(args).assert().success();
  let second = env.read("build/sw.js");

  assert_eq!(first, second);
}

#[test]
fn dont_cache_bust_and_prefix_flags() {
  let env = TestEnv::empty();
  env.write_file("build/app.1a2b3c4d.js", "x");
  env.write_file("src/sw.js", "");

  env
    .precache_cmd()
    .args([
      "inject",
      "--sw-src",
      "src/sw.js",
      "--sw-dest",
      "dist/sw.js",
      "--glob-directory",
      "build",
      "--dont-cache-bust",
      r"\.\w{8}\.",
      "--modify-url-prefix",
      "=/static/",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("modifyUrlPrefix"));

  env
    .precache_cmd()
    .args([
      "inject",
      "--sw-src",
      "src/sw.js",
      "--sw-dest",
      "dist/sw.js",
      "--glob-directory",
      "build",
      "--dont-cache-bust",
      r"\.\w{8}\.",
      "--modify-url-prefix",
      "app=/static/app",
    ])
    .assert()
    .success();

  assert_eq!(
    env.read("dist/sw.js"),
    "self.__file_manifest = [\n  {\n    \"url\": \"/static/app.1a2b3c4d.js\"\n  }\n];\n"
  );
}

#[test]
fn missing_source_fails_without_creating_destination() {
  let env = TestEnv::with_sample_site();

  env
    .precache_cmd()
    .args([
      "inject",
      "--sw-src",
      "src/missing.js",
      "--sw-dest",
      "dist/sw.js",
      "--glob-directory",
      "build",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to read"));

  assert!(!env.path("dist").exists());
}

#[test]
fn blocked_destination_directory_is_labeled() {
  let env = TestEnv::with_sample_site();
  env.write_file("dist", "a file where a directory should be");

  env
    .precache_cmd()
    .args([
      "inject",
      "--sw-src",
      "src/sw.js",
      "--sw-dest",
      "dist/sw.js",
      "--glob-directory",
      "build",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unable to make output directory"));
}

#[test]
fn invalid_variable_name_is_rejected() {
  let env = TestEnv::with_sample_site();

  env
    .precache_cmd()
    .args([
      "inject",
      "--sw-src",
      "src/sw.js",
      "--sw-dest",
      "dist/sw.js",
      "--glob-directory",
      "build",
      "--variable-name",
      "not a binding",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid prepend manifest argument"));

  assert!(!env.path("dist").exists());
}

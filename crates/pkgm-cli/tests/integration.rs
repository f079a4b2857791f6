//! Integration tests for create-pkg-manifest

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCENARIO_LINE: &str = r#"    <project name="dart/third_party/pkg/foo" path="dart/third_party/pkg/foo" remote="https://example.com/foo" revision="abc123"/>"#;

/// A scratch project root holding a DEPS file
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn with_deps(content: &str) -> Option<Self> {
        let dir = TempDir::new().ok()?;
        fs::write(dir.path().join("DEPS"), content).ok()?;
        Some(Self { dir })
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn deps(&self) -> PathBuf {
        self.root().join("DEPS")
    }

    fn output(&self) -> PathBuf {
        self.root().join("out.manifest")
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("create-pkg-manifest");
        cmd.current_dir(self.root());
        cmd.arg("--deps").arg(self.deps());
        cmd.arg("--output").arg(self.output());
        cmd
    }
}

fn dart_style_deps() -> &'static str {
    r#"
# Only the third_party/pkg entries end up in the manifest.
vars = {
  "dart_root": "sdk",
  "github_mirror":
      "https://chromium.googlesource.com/external/github.com/dart-lang/%s.git",
  "chromium_git": "https://chromium.googlesource.com",

  "args_tag": "@0.13.0",
  "path_tag": "@1.3.6",
  "dart_style_tag": "@0.2.4",
  "gyp_rev": "@6ee91ad8659871916f9aa840d42e1513befdf638",
}

deps = {
  Var("dart_root") + "/third_party/pkg/args":
      (Var("github_mirror") % "args") + Var("args_tag"),
  Var("dart_root") + "/third_party/pkg/path":
      (Var("github_mirror") % "path") + Var("path_tag"),
  Var("dart_root") + "/third_party/pkg_tested/dart_style":
      (Var("github_mirror") % "dart_style") + Var("dart_style_tag"),
  Var("dart_root") + "/third_party/gyp":
      Var("chromium_git") + "/external/gyp.git" + Var("gyp_rev"),
}

deps_os = {
  "win": {
    Var("dart_root") + "/third_party/cygwin":
      Var("chromium_git") + "/chromium/deps/cygwin.git" +
      "@" + "c89e446b273697fadf3a10ff1007a97c0b7de6df",
  },
}

hooks = [
  {
    'name': 'checked_in_dart_sdks',
    'pattern': '.',
    'action': [
      'download_from_google_storage',
      '--no_auth',
      '--directory',
      Var('dart_root') + '/tools/sdks',
    ],
  },
]
"#
}

#[test]
fn test_version() {
    cargo_bin_cmd!("create-pkg-manifest")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("create-pkg-manifest"));
}

#[test]
fn test_help_lists_both_flags() {
    cargo_bin_cmd!("create-pkg-manifest")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--deps"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_unknown_flag_fails() {
    cargo_bin_cmd!("create-pkg-manifest")
        .arg("--frobnicate")
        .assert()
        .failure();
}

#[test]
fn test_single_dependency_scenario() {
    let Some(ws) = Workspace::with_deps(
        r#"vars = {"x_tag": "abc123"}
deps = {"sdk/third_party/pkg/foo": "https://example.com/foo@" + Var("x_tag")}
"#,
    ) else {
        return;
    };

    ws.command()
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 1 project"));

    let written = fs::read_to_string(ws.output()).unwrap_or_default();
    assert!(written.contains(SCENARIO_LINE));
}

#[test]
fn test_full_manifest_shape() {
    let Some(ws) = Workspace::with_deps(dart_style_deps()) else {
        return;
    };

    ws.command().assert().success();

    let expected = concat!(
        "<!-- This file is generated by create-pkg-manifest. DO NOT EDIT -->\n",
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<manifest>\n",
        "  <projects>\n",
        "    <project name=\"dart/third_party/pkg/args\" path=\"dart/third_party/pkg/args\" remote=\"https://chromium.googlesource.com/external/github.com/dart-lang/args.git\" revision=\"0.13.0\"/>\n",
        "    <project name=\"dart/third_party/pkg/path\" path=\"dart/third_party/pkg/path\" remote=\"https://chromium.googlesource.com/external/github.com/dart-lang/path.git\" revision=\"1.3.6\"/>\n",
        "    <project name=\"dart/third_party/pkg_tested/dart_style\" path=\"dart/third_party/pkg_tested/dart_style\" remote=\"https://chromium.googlesource.com/external/github.com/dart-lang/dart_style.git\" revision=\"0.2.4\"/>\n",
        "  </projects>\n",
        "</manifest>\n",
    );
    assert_eq!(fs::read_to_string(ws.output()).unwrap_or_default(), expected);
}

#[test]
fn test_no_matching_dependencies_writes_empty_manifest() {
    let Some(ws) = Workspace::with_deps(r#"deps = {"other/path": "https://example.com/bar@v1"}"#)
    else {
        return;
    };

    ws.command().assert().success();

    let written = fs::read_to_string(ws.output()).unwrap_or_default();
    assert!(written.contains("  <projects>\n  </projects>\n"));
    assert!(!written.contains("<project "));
}

#[test]
fn test_runs_are_byte_identical() {
    let Some(ws) = Workspace::with_deps(dart_style_deps()) else {
        return;
    };

    ws.command().assert().success();
    let first = fs::read(ws.output()).unwrap_or_default();
    ws.command().assert().success();
    let second = fs::read(ws.output()).unwrap_or_default();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_malformed_reference_fails_without_output() {
    let Some(ws) = Workspace::with_deps(
        r#"deps = {"sdk/third_party/pkg/foo": "https://example.com/foo"}"#,
    ) else {
        return;
    };

    ws.command()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("MalformedReferenceError"))
        .stderr(predicate::str::contains("dart/third_party/pkg/foo"));

    assert!(!ws.output().exists());
}

#[test]
fn test_malformed_reference_keeps_previous_output() {
    let Some(ws) = Workspace::with_deps(
        r#"deps = {"sdk/third_party/pkg/foo": "https://example.com/foo"}"#,
    ) else {
        return;
    };
    assert!(fs::write(ws.output(), "previous manifest").is_ok());

    ws.command().assert().failure();

    assert_eq!(
        fs::read_to_string(ws.output()).unwrap_or_default(),
        "previous manifest"
    );
}

#[test]
fn test_undefined_variable_fails() {
    let Some(ws) = Workspace::with_deps(
        r#"vars = {}
deps = {"sdk/third_party/pkg/foo": "https://example.com/foo@" + Var("undefined_name")}
"#,
    ) else {
        return;
    };

    ws.command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("UndefinedVariableError"))
        .stderr(predicate::str::contains("undefined_name"));

    assert!(!ws.output().exists());
}

#[test]
fn test_parse_error_names_file_and_line() {
    let Some(ws) = Workspace::with_deps("vars = {}\ndeps = {\n  'a': 'b' * 2,\n}\n") else {
        return;
    };

    ws.command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("DeclarationParseError"))
        .stderr(predicate::str::contains("DEPS"))
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn test_unpinned_entries_outside_selection_are_ignored() {
    let Some(ws) = Workspace::with_deps(
        r#"vars = {"x_tag": "abc123"}
deps = {
  "sdk/third_party/pkg/foo": "https://example.com/foo@" + Var("x_tag"),
  "sdk/third_party/unused": None,
  "sdk/buildtools": {"packages": [{"package": "gn", "version": "v1"}], "dep_type": "cipd"},
}
"#,
    ) else {
        return;
    };

    ws.command().assert().success();

    let written = fs::read_to_string(ws.output()).unwrap_or_default();
    assert!(written.contains(SCENARIO_LINE));
    assert_eq!(written.matches("<project ").count(), 1);
}

#[test]
fn test_arbitrary_code_is_rejected() {
    let Some(ws) = Workspace::with_deps("import os\nos.system('true')\n") else {
        return;
    };

    ws.command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("DeclarationParseError"));
}

#[test]
fn test_missing_input_fails() {
    let Some(ws) = Workspace::with_deps("") else {
        return;
    };
    assert!(fs::remove_file(ws.deps()).is_ok());

    ws.command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("InputNotFoundError"));
    assert!(!ws.output().exists());
}

#[test]
fn test_defaults_resolve_in_working_directory() {
    let Some(ws) = Workspace::with_deps(
        r#"deps = {"sdk/third_party/pkg/foo": "https://example.com/foo@v1"}"#,
    ) else {
        return;
    };

    cargo_bin_cmd!("create-pkg-manifest")
        .current_dir(ws.root())
        .assert()
        .success();

    assert!(ws.root().join("dart_third_party_pkg.manifest").exists());
}

#[test]
fn test_short_flags_and_quiet() {
    let Some(ws) = Workspace::with_deps(
        r#"deps = {"sdk/third_party/pkg/foo": "https://example.com/foo@v1"}"#,
    ) else {
        return;
    };

    cargo_bin_cmd!("create-pkg-manifest")
        .arg("-q")
        .arg("-d")
        .arg(ws.deps())
        .arg("-o")
        .arg(ws.output())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    assert!(ws.output().exists());
}

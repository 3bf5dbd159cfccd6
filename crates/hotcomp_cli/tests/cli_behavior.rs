//! Integration tests for CLI behavior
//!
//! These tests verify the external behavior of the CLI tool.

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Helper to create a command for the hotcomp CLI running inside `dir`
fn hotcomp_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hotcomp"));
    cmd.current_dir(dir.path());
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("App.svelte").write_str("<h1>hello</h1>").unwrap();
    dir.child("main.js").write_str("import App from './App.svelte';").unwrap();
    dir
}

mod help_command {
    use super::*;

    #[test]
    fn shows_help_with_flag() {
        hotcomp_cmd(&TempDir::new().unwrap())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"));
    }

    #[test]
    fn shows_version_with_flag() {
        hotcomp_cmd(&TempDir::new().unwrap())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn requires_files_for_transform() {
        hotcomp_cmd(&TempDir::new().unwrap())
            .arg("transform")
            .assert()
            .failure();
    }
}

#[cfg(unix)]
mod transform_command {
    use super::*;

    #[test]
    fn second_request_is_served_from_cache() {
        let dir = project();

        hotcomp_cmd(&dir)
            .args(["transform", "App.svelte"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/App.svelte: compiled"))
            .stdout(predicate::str::contains("/App.svelte: cached"))
            .stdout(predicate::str::contains("1 compiled, 1 cached"));
    }

    #[test]
    fn no_cache_flag_compiles_every_request() {
        let dir = project();

        hotcomp_cmd(&dir)
            .args(["--no-cache", "transform", "App.svelte", "--repeat", "3"])
            .assert()
            .success()
            .stdout(predicate::str::contains("3 compiled, 0 cached"));
    }

    #[test]
    fn other_files_pass_through() {
        let dir = project();

        hotcomp_cmd(&dir)
            .args(["transform", "main.js", "--repeat", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/main.js: passthrough"));
    }

    #[test]
    fn compile_failure_exits_with_one() {
        let dir = project();

        hotcomp_cmd(&dir)
            .args(["transform", "App.svelte", "--compiler", "false"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("/App.svelte: failed"));
    }

    #[test]
    fn missing_file_fails_only_its_own_request() {
        let dir = project();

        hotcomp_cmd(&dir)
            .args(["transform", "Missing.svelte", "App.svelte", "--repeat", "1"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("/Missing.svelte: failed"))
            .stdout(predicate::str::contains("/App.svelte: compiled"));
    }

    #[test]
    fn non_utf8_file_fails_only_its_own_request() {
        let dir = project();
        dir.child("Binary.svelte").write_binary(&[0xff, 0xfe, 0x00]).unwrap();

        hotcomp_cmd(&dir)
            .args(["transform", "Binary.svelte", "App.svelte", "--repeat", "1"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("/Binary.svelte: failed"))
            .stdout(predicate::str::contains("/App.svelte: compiled"));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let dir = project();
        dir.child("hotcomp.json")
            .write_str(r#"{ "useTransformCach": true }"#)
            .unwrap();

        hotcomp_cmd(&dir)
            .args(["transform", "App.svelte"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Config validation failed"));
    }

    #[test]
    fn discovered_config_sets_extensions() {
        let dir = project();
        dir.child("notes.txt").write_str("plain").unwrap();
        dir.child(".hotcomp.json")
            .write_str(r#"{ "extensions": [".txt"] }"#)
            .unwrap();

        hotcomp_cmd(&dir)
            .args(["transform", "notes.txt", "App.svelte", "--repeat", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/notes.txt: compiled"))
            .stdout(predicate::str::contains("/App.svelte: passthrough"));
    }

    #[test]
    fn root_flag_resolves_request_paths() {
        let dir = TempDir::new().unwrap();
        dir.child("public/src/App.svelte").write_str("<p/>").unwrap();

        hotcomp_cmd(&dir)
            .args(["transform", "/src/App.svelte", "--root", "public"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/src/App.svelte: cached"));
    }

    #[test]
    fn out_dir_receives_compiled_code() {
        let dir = project();

        hotcomp_cmd(&dir)
            .args(["transform", "App.svelte", "--compiler", "tr a-z A-Z"])
            .args(["--out-dir", "out"])
            .assert()
            .success();

        dir.child("out/App.svelte").assert("<H1>HELLO</H1>");
    }

    #[test]
    fn json_output_reports_statuses() {
        let dir = project();

        let output = hotcomp_cmd(&dir)
            .args(["transform", "App.svelte", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let statuses: Vec<_> = report["requests"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["status"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(statuses, vec!["compiled", "cached"]);
        assert_eq!(report["cache"]["entries"], 1);
        assert_eq!(report["cache"]["hits"], 1);
    }
}

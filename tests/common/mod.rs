//! Shared test helpers for tdmerge integration tests.
//!
//! All tests use temp directories, no side effects on the real tree.

#![allow(dead_code)]

use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// A fresh temp directory holding the given `(relative path, contents)` files.
pub fn setup_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    for (path, contents) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, contents).unwrap();
    }
    dir
}

/// Read a file under `dir` as text.
pub fn read(dir: &Path, path: &str) -> String {
    std::fs::read_to_string(dir.join(path))
        .unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

/// File names in `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Run tdmerge in `dir`.
pub fn tdmerge_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tdmerge"))
        .args(args)
        .current_dir(dir)
        .env_remove("TDMERGE_LOG")
        .output()
        .expect("failed to execute tdmerge")
}

/// Run tdmerge in `dir` with `stdin` piped in.
pub fn tdmerge_stdin(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tdmerge"))
        .args(args)
        .current_dir(dir)
        .env_remove("TDMERGE_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn tdmerge");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait for tdmerge")
}

/// Run tdmerge and assert it succeeds. Returns stdout as string.
pub fn tdmerge_ok(dir: &Path, args: &[&str]) -> String {
    let out = tdmerge_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "tdmerge {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Write `value` as JSON to `dir/name` and return the file name.
pub fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> String {
    std::fs::write(dir.join(name), serde_json::to_string(value).unwrap()).unwrap();
    name.to_owned()
}

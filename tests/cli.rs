use std::{
    fs,
    path::Path,
    process::{Command, Output, Stdio},
    thread::sleep,
    time::{Duration, Instant},
};

use nix::{
    sys::signal::{Signal, kill},
    unistd::Pid,
};
use regex::Regex;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

fn blockio(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blockio"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run blockio")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn reported_hash(output: &Output) -> String {
    let re = Regex::new(r"SHA-256 hash: ([0-9a-f]{64})\b").unwrap();
    let out = stdout(output);
    let caps = re.captures(&out).unwrap_or_else(|| panic!("no hash in output: {out}"));
    caps[1].to_string()
}

fn sha256_hex(path: &Path) -> String {
    Sha256::digest(fs::read(path).unwrap())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[test]
fn write_then_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f");
    let path_arg = path.to_str().unwrap();

    let write = blockio(&["--mode", "write", "--path", path_arg, "--block-size", "1024", "--blocks", "10"]);
    assert!(write.status.success(), "{}", stderr(&write));
    assert_eq!(fs::metadata(&path).unwrap().len(), 10240);
    assert!(stdout(&write).contains("(10240 bytes in"), "{}", stdout(&write));

    let read = blockio(&["--mode", "read", "--path", path_arg, "--block-size", "1024"]);
    assert!(read.status.success(), "{}", stderr(&read));
    assert!(stdout(&read).contains("(10240 bytes in"), "{}", stdout(&read));
    assert_eq!(reported_hash(&read), sha256_hex(&path));
    assert_eq!(reported_hash(&read), reported_hash(&write));
}

#[test]
fn write_with_sync() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f");
    let output = blockio(&[
        "--mode", "write", "--path", path.to_str().unwrap(),
        "--block-size", "4096", "--blocks", "8", "--iter-sleep", "0", "--sync",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(fs::metadata(&path).unwrap().len(), 32768);
}

#[test]
fn read_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty");
    fs::write(&path, b"").unwrap();
    let output = blockio(&["--mode", "read", "--path", path.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("(0 bytes in"));
    assert_eq!(
        reported_hash(&output),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn both_mode_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f");
    let output = blockio(&[
        "--mode", "both", "--path", path.to_str().unwrap(),
        "--block-size", "512", "--blocks", "4", "--iter-sleep", "0",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Reading finished"));
    assert_eq!(reported_hash(&output), sha256_hex(&path));
}

#[test]
fn configuration_errors_exit_one_without_touching_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f");
    let path_arg = path.to_str().unwrap();
    let cases: &[&[&str]] = &[
        &["--mode", "append", "--path", path_arg],
        &["--path", path_arg],
        &["--mode", "write"],
        &["--mode", "write", "--path", ""],
        &["--mode", "write", "--path", path_arg, "--block-size", "0"],
        &["--mode", "write", "--path", path_arg, "--iter-sleep", "soon"],
        &["--mode", "write", "--path", path_arg, "--blocks", "-1"],
    ];
    for args in cases {
        let output = blockio(args);
        assert_eq!(output.status.code(), Some(1), "{args:?}: {}", stderr(&output));
        assert!(!stderr(&output).is_empty(), "{args:?}");
        assert!(!path.exists(), "{args:?} created the file");
    }
}

#[test]
fn unknown_mode_is_reported() {
    let output = blockio(&["--mode", "copy", "--path", "unused"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(r#"unknown --mode argument "copy""#), "{}", stderr(&output));
}

#[test]
fn help_exits_zero() {
    let output = blockio(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("--iter-sleep"));
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = blockio(&["--mode", "read", "--path", dir.path().join("nope").to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to open file for reading"), "{}", stderr(&output));
}

#[test]
fn interrupt_stops_writing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f");
    let child = Command::new(env!("CARGO_BIN_EXE_blockio"))
        .args([
            "--mode", "write", "--path", path.to_str().unwrap(),
            "--block-size", "1024", "--blocks", "100000", "--iter-sleep", "10ms",
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // the file is created after the signal listener is installed
    let start = Instant::now();
    while fs::metadata(&path).map(|m| m.len()).unwrap_or(0) == 0 {
        assert!(start.elapsed() < Duration::from_secs(10), "writer never started");
        sleep(Duration::from_millis(10));
    }
    sleep(Duration::from_millis(100));
    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(1), "{}", stderr(&output));
    assert!(stderr(&output).contains("writing cancelled"), "{}", stderr(&output));
    let len = fs::metadata(&path).unwrap().len();
    assert!(len > 0 && len < 1024 * 100000);
    assert_eq!(len % 1024, 0);
}

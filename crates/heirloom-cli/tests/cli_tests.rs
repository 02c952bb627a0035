//! Integration tests for the `heirloom` CLI binary.
//!
//! These exercise the CLI as a subprocess against vault files in a temp
//! directory, verifying exit codes, stdout, and file-system side effects.
//! Each `init` pays the real KDF cost, so vaults are reused across
//! assertions where possible.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::process::Command;

/// Locate the `heirloom` binary built by `cargo test`.
fn heirloom_bin() -> String {
    let path = env!("CARGO_BIN_EXE_heirloom");
    assert!(
        Path::new(path).exists(),
        "heirloom binary not found at {path}"
    );
    path.to_owned()
}

/// Run heirloom with args and return (`exit_code`, stdout, stderr).
fn run(vault: &Path, passphrase: Option<&str>, args: &[&str]) -> (i32, String, String) {
    let mut command = Command::new(heirloom_bin());
    command
        .args(args)
        .arg("--vault")
        .arg(vault)
        .env_remove("HEIRLOOM_PASSPHRASE")
        .env_remove("HEIRLOOM_VAULT");
    if let Some(passphrase) = passphrase {
        command.arg("--passphrase").arg(passphrase);
    }
    let output = command.output().expect("failed to execute heirloom");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn version_flag_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(&dir.path().join("v"), None, &["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("heirloom"));
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(&dir.path().join("v"), None, &["--help"]);
    assert_eq!(code, 0);
    for command in ["init", "status", "show", "history", "versions", "export", "import"] {
        assert!(stdout.contains(command), "help should list '{command}'");
    }
}

// ── Lifecycle ────────────────────────────────────────────────────────

#[test]
fn init_creates_vault_file_and_show_reads_it() {
    let dir = tempfile::tempdir().unwrap();
    let vault = dir.path().join("vault.heirloom");

    let (code, stdout, stderr) = run(&vault, Some("test-pass"), &["init"]);
    assert_eq!(code, 0, "init failed: {stderr}");
    assert!(stdout.contains("created vault"));
    assert!(vault.exists());

    let (code, stdout, _) = run(&vault, None, &["status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("vault exists"));

    let (code, stdout, stderr) = run(&vault, Some("test-pass"), &["show"]);
    assert_eq!(code, 0, "show failed: {stderr}");
    assert!(stdout.contains("format version: 4"));
    assert!(stdout.contains("entries (0):"));

    let (code, stdout, _) = run(&vault, Some("test-pass"), &["history"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("store_created"));
}

#[test]
fn status_without_vault_reports_missing() {
    let dir = tempfile::tempdir().unwrap();
    let vault = dir.path().join("absent.heirloom");
    let (code, stdout, _) = run(&vault, None, &["status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no vault"));
}

#[test]
fn init_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    let vault = dir.path().join("vault.heirloom");
    let (code, _, _) = run(&vault, Some("p"), &["init"]);
    assert_eq!(code, 0);
    let (code, _, stderr) = run(&vault, Some("p"), &["init"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("already exists"));
}

#[test]
fn wrong_passphrase_fails_without_detail() {
    let dir = tempfile::tempdir().unwrap();
    let vault = dir.path().join("vault.heirloom");
    run(&vault, Some("right"), &["init"]);

    let (code, _, stderr) = run(&vault, Some("wrong"), &["show"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("wrong passphrase or invalid vault file"));
    // The merged signal must not name a specific cause.
    assert!(!stderr.contains("base64"));
    assert!(!stderr.contains("tag"));
}

#[test]
fn missing_passphrase_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let vault = dir.path().join("vault.heirloom");
    let (code, _, stderr) = run(&vault, None, &["init"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("passphrase is required"));
}

#[test]
fn init_rejects_odd_salt_length() {
    let dir = tempfile::tempdir().unwrap();
    let vault = dir.path().join("vault.heirloom");
    let (code, _, stderr) = run(&vault, Some("p"), &["init", "--salt-length", "8"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("salt length must be 16 or 32"));
}

#[test]
fn export_then_import_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let vault = dir.path().join("vault.heirloom");
    let backup = dir.path().join("backup.heirloom");
    let restored = dir.path().join("restored.heirloom");

    run(&vault, Some("p"), &["init"]);
    let (code, _, stderr) = run(
        &vault,
        Some("p"),
        &["export", backup.to_str().unwrap()],
    );
    assert_eq!(code, 0, "export failed: {stderr}");
    assert!(backup.exists());

    let (code, stdout, stderr) = run(
        &restored,
        Some("p"),
        &["import", backup.to_str().unwrap()],
    );
    assert_eq!(code, 0, "import failed: {stderr}");
    assert!(stdout.contains("imported vault"));

    let (code, stdout, _) = run(&restored, Some("p"), &["history"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("vault_imported"));
    assert!(stdout.contains("store_created"));
}

#[test]
fn versions_on_fresh_vault_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let vault = dir.path().join("vault.heirloom");
    run(&vault, Some("p"), &["init"]);
    let (code, stdout, _) = run(&vault, Some("p"), &["versions"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no snapshots retained"));
}

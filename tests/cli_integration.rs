//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Get path to the bookvault binary
fn bookvault_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps/
    path.push("bookvault");
    path
}

/// Run bookvault with passwords supplied as lines on stdin
fn run_bookvault_with_passwords(
    args: &[&str],
    passwords: &str,
) -> Result<std::process::Output, std::io::Error> {
    let mut child = Command::new(bookvault_bin())
        .arg("--password-stdin")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // Ignore BrokenPipe errors - the command may exit before reading stdin
        // if it encounters an error (e.g., file not found)
        let _ = stdin.write_all(passwords.as_bytes());
    }

    child.wait_with_output()
}

#[test]
fn test_create_info_roundtrip_encrypted() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("novel.book");

    let result = run_bookvault_with_passwords(
        &[
            "create",
            "-o",
            path.to_str().unwrap(),
            "--title",
            "My Novel",
            "--author",
            "Jane Doe",
            "--encrypt",
        ],
        "secret\n",
    )
    .unwrap();
    assert!(
        result.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let result =
        run_bookvault_with_passwords(&["info", "-i", path.to_str().unwrap()], "secret\n").unwrap();
    assert!(
        result.status.success(),
        "info failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("My Novel"));
    assert!(stdout.contains("Jane Doe"));
}

#[test]
fn test_info_wrong_password_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("novel.book");

    let result = run_bookvault_with_passwords(
        &["create", "-o", path.to_str().unwrap(), "--encrypt"],
        "secret\n",
    )
    .unwrap();
    assert!(result.status.success());

    let result =
        run_bookvault_with_passwords(&["info", "-i", path.to_str().unwrap()], "wrong\n").unwrap();
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("invalid password"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn test_verify_exit_codes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("novel.book");

    let result = run_bookvault_with_passwords(
        &["create", "-o", path.to_str().unwrap(), "--encrypt"],
        "correct-horse\n",
    )
    .unwrap();
    assert!(result.status.success());

    let ok = run_bookvault_with_passwords(&["verify", "-i", path.to_str().unwrap()], "correct-horse\n")
        .unwrap();
    assert!(ok.status.success());

    let bad =
        run_bookvault_with_passwords(&["verify", "-i", path.to_str().unwrap()], "wrong\n").unwrap();
    assert!(!bad.status.success());
}

#[test]
fn test_change_password() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("novel.book");

    let result = run_bookvault_with_passwords(
        &["create", "-o", path.to_str().unwrap(), "--title", "Rotated", "--encrypt"],
        "old-pass\n",
    )
    .unwrap();
    assert!(result.status.success());

    // change-password reads the old then the new password, one per line.
    let result = run_bookvault_with_passwords(
        &["change-password", "-f", path.to_str().unwrap()],
        "old-pass\nnew-pass\n",
    )
    .unwrap();
    assert!(
        result.status.success(),
        "change-password failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let ok =
        run_bookvault_with_passwords(&["verify", "-i", path.to_str().unwrap()], "new-pass\n").unwrap();
    assert!(ok.status.success());

    let old =
        run_bookvault_with_passwords(&["verify", "-i", path.to_str().unwrap()], "old-pass\n").unwrap();
    assert!(!old.status.success());
}

#[test]
fn test_change_password_rejects_empty_new_password() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("novel.book");

    let result = run_bookvault_with_passwords(
        &["create", "-o", path.to_str().unwrap(), "--encrypt"],
        "old-pass\n",
    )
    .unwrap();
    assert!(result.status.success());
    let before = fs::read(&path).unwrap();

    let result = run_bookvault_with_passwords(
        &["change-password", "-f", path.to_str().unwrap()],
        "old-pass\n\n",
    )
    .unwrap();
    assert!(!result.status.success());

    // The file is untouched after a rejected rotation.
    assert_eq!(before, fs::read(&path).unwrap());
}

#[test]
fn test_encrypt_decrypt_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let plain = temp_dir.path().join("plain.book");
    let crypt = temp_dir.path().join("crypt.book");
    let back = temp_dir.path().join("back.book");

    let result = run_bookvault_with_passwords(
        &["create", "-o", plain.to_str().unwrap(), "--title", "Cycle"],
        "",
    )
    .unwrap();
    assert!(result.status.success());

    let result = run_bookvault_with_passwords(
        &["encrypt", "-i", plain.to_str().unwrap(), "-o", crypt.to_str().unwrap()],
        "pw\n",
    )
    .unwrap();
    assert!(result.status.success());
    assert!(fs::read(&crypt).unwrap().starts_with(b"BOOK"));

    let result = run_bookvault_with_passwords(
        &["decrypt", "-i", crypt.to_str().unwrap(), "-o", back.to_str().unwrap()],
        "pw\n",
    )
    .unwrap();
    assert!(result.status.success());

    let bytes = fs::read(&back).unwrap();
    assert!(bytes.starts_with(b"{"));
    assert!(String::from_utf8_lossy(&bytes).contains("Cycle"));
}

#[test]
fn test_export_markdown() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("novel.book");
    let md = temp_dir.path().join("novel.md");

    let result = run_bookvault_with_passwords(
        &[
            "create",
            "-o",
            path.to_str().unwrap(),
            "--title",
            "Export Me",
            "--author",
            "Ghost Writer",
        ],
        "",
    )
    .unwrap();
    assert!(result.status.success());

    let result = run_bookvault_with_passwords(
        &["export", "-i", path.to_str().unwrap(), "-o", md.to_str().unwrap()],
        "",
    )
    .unwrap();
    assert!(
        result.status.success(),
        "export failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let text = fs::read_to_string(&md).unwrap();
    assert!(text.contains("# Export Me"));
    assert!(text.contains("**Author:** Ghost Writer"));
}

#[test]
fn test_missing_file_reports_error() {
    let result =
        run_bookvault_with_passwords(&["info", "-i", "/nonexistent/path.book"], "").unwrap();
    assert!(!result.status.success());
    assert!(!result.stderr.is_empty());
}

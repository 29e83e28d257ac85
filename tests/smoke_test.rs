/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

#[test]
fn binary_shows_help() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("termglobe"),
        "Help output should mention termglobe"
    );
}

#[test]
fn binary_shows_version() {
    let output = Command::new("cargo")
        .args(["run", "--", "--version"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = Command::new("cargo")
        .args(["run", "--", "nonexistent-command"])
        .output()
        .expect("Failed to execute cargo run");

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    // Should show helpful error, not a panic backtrace
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn countries_lists_dataset() {
    let output = Command::new("cargo")
        .args(["run", "--", "countries"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "countries failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hongkong"));
    assert!(stdout.contains("Hong Kong"));
}

#[test]
fn print_renders_braille_frame() {
    let output = Command::new("cargo")
        .args(["run", "--", "print", "--frames", "200", "--width", "80", "--height", "24", "--seed", "1", "--mono"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "print failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 24);
    assert!(
        stdout.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)),
        "Printed frame should contain braille dots"
    );
}

#[test]
fn print_rejects_unknown_country() {
    let output = Command::new("cargo")
        .args(["run", "--", "print", "--country", "atlantis"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("atlantis"));
    assert!(!stderr.contains("panicked at"));
}

#[test]
fn run_without_terminal_fails_gracefully() {
    // stdout is a pipe here, not a tty
    let output = Command::new("cargo")
        .args(["run", "--", "run"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked at"));
}

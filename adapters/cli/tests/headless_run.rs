use std::process::Command;

#[test]
fn headless_run_prints_a_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_grid-defence"))
        .args([
            "--tower",
            "1,0",
            "--tower",
            "3,2",
            "--speed",
            "4",
            "--waves",
            "1",
            "--max-seconds",
            "30",
        ])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch the grid-defence binary");

    assert!(output.status.success(), "binary exited with {}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("outcome: "), "unexpected output:\n{stdout}");
    assert!(stdout.contains("enemies spawned: 12"), "unexpected output:\n{stdout}");
}

#[test]
fn missing_config_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_grid-defence"))
        .args(["--config", "does-not-exist.toml"])
        .output()
        .expect("failed to launch the grid-defence binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"), "unexpected stderr:\n{stderr}");
}

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::process::Command;

#[test]
fn summary_only_runs_headless_lifecycle() {
    let mut cmd = Command::cargo_bin("softrender").expect("binary exists");
    cmd.args(["--width", "4", "--height", "2", "--summary-only"]);
    cmd.assert()
        .success()
        .stdout(contains("Frame buffer 4x2 (8 pixels)"))
        .stdout(contains("Background #7bc3dd (0x007bc3dd)"))
        .stdout(contains("(-1.00, 1.00, -1.00) color #ff0000"))
        .stdout(contains(
            "Presented 1 frame(s); 3 handle(s) acquired, 3 released, 0 outstanding",
        ));
}

#[test]
fn background_override_is_reported() {
    let mut cmd = Command::cargo_bin("softrender").expect("binary exists");
    cmd.args(["--summary-only", "--background", "#102030"]);
    cmd.assert()
        .success()
        .stdout(contains("Frame buffer 800x600 (480000 pixels)"))
        .stdout(contains("Background #102030 (0x00102030)"));
}

#[test]
fn zero_width_is_rejected() {
    let mut cmd = Command::cargo_bin("softrender").expect("binary exists");
    cmd.args(["--width", "0", "--summary-only"]);
    cmd.assert()
        .failure()
        .stderr(contains("invalid renderer configuration"));
}

#[test]
fn oversized_frame_fails_without_panicking() {
    let mut cmd = Command::cargo_bin("softrender").expect("binary exists");
    cmd.args(["--width", "4294967295", "--height", "4294967295", "--summary-only"]);
    cmd.assert()
        .failure()
        .stderr(contains("failed to initialize renderer"))
        .stderr(contains("cannot allocate 4294967295x4294967295 frame buffer"))
        .stderr(contains("panicked").not());
}

#[test]
fn unknown_flag_is_rejected() {
    let mut cmd = Command::cargo_bin("softrender").expect("binary exists");
    cmd.arg("--fullscreen");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --fullscreen"));
}

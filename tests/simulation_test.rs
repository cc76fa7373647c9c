use std::process::{Command, Output};

fn run_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_parking_sim"))
        .args(args)
        .env("RUST_LOG", "warn,parking_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_sim(&["--ticks", "60", "--seed", "7", "--quiet-map"]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Initial state:"));
    assert!(stdout.contains("=== Final State ==="));
    assert!(!stdout.contains("=== World Map ==="), "map drawn despite --quiet-map");
}

/// Test that simulation statistics are logged
#[test]
fn test_simulation_statistics_logged() {
    let output = run_sim(&["--ticks", "40", "--seed", "11", "--order", "shuffled"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for label in [
        "Ticks:",
        "Total cars:",
        "Total cars parked:",
        "Open spots:",
        "Cells moved:",
        "Lane changes:",
        "Parking rate:",
    ] {
        assert!(stderr.contains(label), "Missing '{}' statistic", label);
    }

    let ticks_line = stderr
        .lines()
        .find(|line| line.contains("Ticks:"))
        .expect("Could not find 'Ticks' line");
    let ticks: u64 = ticks_line
        .split("Ticks:")
        .nth(1)
        .and_then(|s| s.trim().parse().ok())
        .expect("Could not parse tick count");
    assert_eq!(ticks, 40);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== World Map ==="));
}

/// Test that --json prints a parseable final snapshot
#[test]
fn test_json_snapshot_output() {
    let output = run_sim(&["--ticks", "15", "--seed", "3", "--json"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let snapshot: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout is not a JSON snapshot");
    assert_eq!(snapshot["tick"], 15);
    assert_eq!(snapshot["cars"].as_array().map(Vec::len), Some(9));
    assert_eq!(snapshot["parking_spots"].as_array().map(Vec::len), Some(17));
}

/// Test that a map can be loaded from a JSON file
#[test]
fn test_config_file_is_loaded() {
    let path = std::env::temp_dir().join(format!("parking_sim_cli_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{
            "width": 5,
            "height": 1,
            "streets": [ { "from": [0, 0], "to": [4, 0], "entry": "right" } ],
            "parking": [ { "cell": [2, 0], "number": 1 } ],
            "cars": [ { "variant": "patient", "start": [0, 0] } ]
        }"#,
    )
    .expect("Failed to write config");

    let output = run_sim(&["--ticks", "5", "--config", path.to_str().unwrap()]);
    let _ = std::fs::remove_file(&path);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parked in spot 1"), "stderr: {}", stderr);
    assert!(stderr.contains("Parking rate: 100.0%"), "stderr: {}", stderr);
}

/// Test that a missing config file fails with a useful message
#[test]
fn test_missing_config_file_fails() {
    let output = run_sim(&["--config", "/nonexistent/parking_sim.json"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read config"), "stderr: {}", stderr);
}

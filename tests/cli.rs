use std::process::Command;

use serde_json::Value;

fn gofscan(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_gofscan"))
        .args(args)
        .output()
        .expect("run gofscan")
}

#[test]
fn json_flag_prints_only_the_report() {
    let output = gofscan(&[
        "--json",
        "--ids",
        "a,b",
        "--delay",
        "0.01",
        "--base-url",
        "http://127.0.0.1:9",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["scanned_count"], 2);
    assert_eq!(report["found_count"], 0);

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Scan complete"));
}

#[test]
fn json_flag_with_output_file_keeps_stdout_parseable() {
    let path = std::env::temp_dir().join(format!("gofscan_cli_{}.json", std::process::id()));
    let output = gofscan(&[
        "--json",
        "--ids",
        "a",
        "--delay",
        "0.01",
        "--base-url",
        "http://127.0.0.1:9",
        "--output",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(printed["scanned_count"], saved["scanned_count"]);
}

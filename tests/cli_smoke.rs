use std::path::PathBuf;
use std::process::Command;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_vizbed")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) { "vizbed.exe" } else { "vizbed" });
            p
        })
}

fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn cli_lint_accepts_a_valid_spec_with_detected_provider() {
    let spec_path = write_fixture(
        "valid.vl.json",
        r#"{"$schema": "https://vega.github.io/schema/vega-lite/v5.json", "mark": "bar"}"#,
    );

    let output = Command::new(exe())
        .args(["lint", "--in"])
        .arg(&spec_path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn cli_compile_emits_a_ready_outcome() {
    let spec_path = write_fixture(
        "compile.vg.json",
        r#"{"$schema": "https://vega.github.io/schema/vega/v5.json", "marks": []}"#,
    );

    let output = Command::new(exe())
        .args(["compile", "--width", "800", "--height", "600", "--in"])
        .arg(&spec_path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["status"], "ready");
    assert_eq!(
        outcome["parsedSpec"]["width"],
        serde_json::json!({"signal": "vizbedContainer.width"})
    );
}

#[test]
fn cli_lint_fails_on_broken_json() {
    let spec_path = write_fixture("broken.json", "{nope");

    let status = Command::new(exe())
        .args(["lint", "--provider", "vega", "--in"])
        .arg(&spec_path)
        .status()
        .unwrap();

    assert!(!status.success());
}

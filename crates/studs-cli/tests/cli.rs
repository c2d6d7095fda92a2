use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

const REGION: &str = r#"{
    "width": 1200, "height": 900,
    "passes": [
        {"variant": "sharpened", "rotation": 0, "detections": [
            {"geometry": [[90,95],[110,95],[110,105],[90,105]], "text": "W12x26", "confidence": 0.93},
            {"geometry": [[95,255],[115,255],[115,265],[95,265]], "text": "[l8]", "confidence": 0.81}
        ]},
        {"variant": "binarized", "rotation": 0, "detections": [
            {"geometry": [[96,256],[116,256],[116,266],[96,266]], "text": "[18]", "confidence": 0.88},
            {"geometry": [[900,800],[920,800],[920,810],[900,810]], "text": "[4]", "confidence": 0.7}
        ]}
    ]
}"#;

fn studs() -> Command {
    Command::cargo_bin("studs").unwrap()
}

fn write_region(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn extract_prints_json_report() {
    let dir = TempDir::new().unwrap();
    let input = write_region(dir.path(), "region.json", REGION);
    let output = dir.path().join("report.json");

    studs()
        .arg("extract")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("Output written to"));

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        report,
        serde_json::json!({
            "studs": [18],
            "profiles": {"W12X26": [18]},
            "studs_count": 1,
            "studs_total": 18
        })
    );
}

#[test]
fn extract_csv_and_text_formats() {
    let dir = TempDir::new().unwrap();
    let input = write_region(dir.path(), "region.json", REGION);

    studs()
        .args(["extract", "-f", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("profile,studs\nW12X26,18\n"));

    studs()
        .args(["extract", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Studs: 1 callouts, 18 total"));
}

#[test]
fn extract_max_distance_override_isolates_count() {
    let dir = TempDir::new().unwrap();
    let input = write_region(dir.path(), "region.json", REGION);

    studs()
        .args(["extract", "-f", "text", "--max-distance", "50", "--show-detections"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Studs: 0 callouts, 0 total"))
        .stdout(contains("isolated counts ignored"));
}

#[test]
fn extract_replay_plan_runs_only_planned_passes() {
    let dir = TempDir::new().unwrap();
    let input = write_region(
        dir.path(),
        "manual.json",
        r#"{"width": 500, "height": 500, "passes": [
            {"variant": "sharpened", "detections": [
                {"geometry": [[90,95],[110,95],[110,105],[90,105]], "text": "W12x26"}
            ]},
            {"variant": "manual", "detections": [
                {"geometry": [[95,255],[115,255],[115,265],[95,265]], "text": "[18]"}
            ]}
        ]}"#,
    );

    studs()
        .args(["extract", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Studs: 1 callouts, 18 total"));

    studs()
        .args(["extract", "-f", "text", "--replay-plan"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Studs: 0 callouts, 0 total"));
}

#[test]
fn extract_replay_plan_matches_direct_for_planned_passes() {
    let dir = TempDir::new().unwrap();
    let input = write_region(dir.path(), "region.json", REGION);

    studs()
        .args(["extract", "-f", "csv", "--replay-plan"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("profile,studs\nW12X26,18\n"));
}

#[test]
fn extract_missing_input_fails() {
    studs()
        .args(["extract", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(contains("Input file not found"));
}

#[test]
fn extract_unsupported_rotation_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_region(
        dir.path(),
        "flipped.json",
        r#"{"width": 10, "height": 10, "passes": [{"variant": "flipped", "rotation": 180, "detections": []}]}"#,
    );

    studs()
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("180"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    write_region(dir.path(), "a.json", REGION);
    write_region(dir.path(), "b.json", REGION);
    write_region(dir.path(), "broken.json", "{ not json");
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.json");

    studs()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("-o")
        .arg(&out)
        .args(["--summary", "--continue-on-error", "-j", "2"])
        .assert()
        .success()
        .stdout(contains("2 successful"));

    assert!(out.join("a.studs.json").exists());
    assert!(out.join("b.studs.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,studs_count,studs_total"));
    assert!(summary.contains("a.json,success,1,18,W12X26,"));
    assert!(summary.contains("broken.json,error,"));
}

#[test]
fn batch_stops_on_error_by_default() {
    let dir = TempDir::new().unwrap();
    write_region(dir.path(), "broken.json", "{ not json");
    let pattern = dir.path().join("*.json");

    studs()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(contains("Processing failed"));
}

#[test]
fn plan_lists_default_passes() {
    studs()
        .arg("plan")
        .assert()
        .success()
        .stdout(contains("5 passes"))
        .stdout(contains("rotated_270"));
}

#[test]
fn config_init_set_get_with_explicit_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("studs.json");

    studs()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();

    studs()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "extraction.count_max", "80"])
        .assert()
        .success();

    studs()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "extraction.count_max"])
        .assert()
        .success()
        .stdout(contains("80"));

    studs()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "extraction.count_min", "90"])
        .assert()
        .failure();
}

#[test]
fn config_file_drives_extraction() {
    let dir = TempDir::new().unwrap();
    let input = write_region(dir.path(), "region.json", REGION);
    let config = dir.path().join("studs.json");
    fs::write(&config, r#"{"extraction": {"count_min": 1}}"#).unwrap();

    studs()
        .arg("-c")
        .arg(&config)
        .args(["extract", "-f", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("W12X26,18\nW12X26,4\n"));
}

//! End-to-end tests of the `pds-match` binary against fixture files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const FIXTURE: &str = r#"{
    "persons": [
        {"nhs_number": "9449306753", "given": ["OCTAVIA"], "family": ["CHISLETT"],
         "birth_date": "2008-09-20", "gender": "female", "postcode": ["LS1 4HR"]}
    ],
    "search_rules": [
        {"family": "CHISLETT", "birth_date": "2008-09-20",
         "result": {"kind": "matched", "nhs_number": "9449306753", "score": 0.98}},
        {"family": "SMITH", "result": {"kind": "multi_matched"}}
    ],
    "redirects": {"9434765919": "9449306753"}
}"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn pds_match() -> Command {
    Command::cargo_bin("pds-match").expect("binary is built")
}

fn octavia_args() -> [&'static str; 6] {
    [
        "--given",
        "OCTAVIA",
        "--family",
        "CHISLETT",
        "--birth-date",
        "2008-09-20",
    ]
}

#[test]
fn test_validate_nhs_number() {
    pds_match()
        .args(["validate-nhs-number", "9449306753"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9449306753: valid"));

    pds_match()
        .args(["validate-nhs-number", "943 476 5919", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"));

    pds_match()
        .args(["validate-nhs-number", "1234567890"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("invalid"));
}

#[test]
fn test_strategies_listing() {
    pds_match()
        .arg("strategies")
        .assert()
        .success()
        .stdout(predicate::str::contains("cascade"))
        .stdout(predicate::str::contains("exact"))
        .stdout(predicate::str::contains("fuzzy"));
}

#[test]
fn test_strategies_show_cascade() {
    pds_match()
        .args([
            "strategies",
            "--show-cascade",
            "--strategy",
            "cascade",
            "--strategy-version",
            "1",
            "--given",
            "OCTAVIA",
            "--family",
            "CHISLETT",
            "--birth-date",
            "2008-09-05",
            "--format",
            "tsv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tExactGFD\teq2008-09-05"))
        .stdout(predicate::str::contains("FuzzyAltDob\teq2008-05-09"));
}

#[test]
fn test_match_json() {
    let dir = TempDir::new().unwrap();
    let registry = write_file(&dir, "registry.json", FIXTURE);

    let output = pds_match()
        .args(["match", "--registry"])
        .arg(&registry)
        .args(octavia_args())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "Match");
    assert_eq!(json["nhs_number"], "9449306753");
    assert_eq!(json["process_stage"], "ExactGFD");
    assert_eq!(json["quality"]["given"], "Valid");
}

#[test]
fn test_match_text_many_and_tsv() {
    let dir = TempDir::new().unwrap();
    let registry = write_file(&dir, "registry.json", FIXTURE);

    pds_match()
        .args(["match", "--registry"])
        .arg(&registry)
        .args(["--given", "JOHN", "--family", "SMITH", "--birth-date", "1980-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: ManyMatch"));

    pds_match()
        .args(["match", "--registry"])
        .arg(&registry)
        .args(octavia_args())
        .args(["--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Match\t9449306753\t0.9800\tExactGFD"));
}

#[test]
fn test_match_raw_dob() {
    let dir = TempDir::new().unwrap();
    let registry = write_file(&dir, "registry.json", FIXTURE);

    pds_match()
        .args(["match", "--registry"])
        .arg(&registry)
        .args(["--given", "OCTAVIA", "--family", "CHISLETT"])
        .args(["--raw-dob", "ge2008-01-01", "--raw-dob", "le2008-12-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Match"));

    pds_match()
        .args(["match", "--registry"])
        .arg(&registry)
        .args(["--given", "OCTAVIA", "--family", "CHISLETT", "--raw-dob", "about2008"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid birth-date token"));
}

#[test]
fn test_reconcile_superseded() {
    let dir = TempDir::new().unwrap();
    let registry = write_file(&dir, "registry.json", FIXTURE);

    let output = pds_match()
        .args(["reconcile", "--registry"])
        .arg(&registry)
        .args(["--nhs-number", "9434765919"])
        .args(octavia_args())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "LocalNhsNumberIsSuperseded");
    assert_eq!(json["match_outcome"]["status"], "Match");
    assert_eq!(json["person"]["nhs_number"], "9449306753");
}

#[test]
fn test_reconcile_text_lists_differences() {
    let dir = TempDir::new().unwrap();
    let registry = write_file(&dir, "registry.json", FIXTURE);

    pds_match()
        .args(["reconcile", "--registry"])
        .arg(&registry)
        .args(["--nhs-number", "9449306753", "--postcode", "M1 1AE"])
        .args(octavia_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: ManyDifferences"))
        .stdout(predicate::str::contains("postcode"))
        .stdout(predicate::str::contains("LS1 4HR"));
}

#[test]
fn test_config_file_and_overrides() {
    let dir = TempDir::new().unwrap();
    let registry = write_file(&dir, "registry.json", FIXTURE);
    let config = write_file(
        &dir,
        "config.json",
        r#"{"thresholds": {"match_threshold": 0.99, "potential_match_threshold": 0.9}}"#,
    );

    pds_match()
        .args(["match", "--registry"])
        .arg(&registry)
        .arg("--config")
        .arg(&config)
        .args(octavia_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: PotentialMatch"));

    let bad = write_file(
        &dir,
        "bad.json",
        r#"{"thresholds": {"match_threshold": 0.5, "potential_match_threshold": 0.9}}"#,
    );
    pds_match()
        .args(["match", "--registry"])
        .arg(&registry)
        .arg("--config")
        .arg(&bad)
        .args(octavia_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));

    pds_match()
        .args(["match", "--registry"])
        .arg(&registry)
        .args(["--strategy", "phonetic"])
        .args(octavia_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("phonetic"));
}

#[test]
fn test_missing_registry_file() {
    pds_match()
        .args(["match", "--registry", "/nonexistent/registry.json"])
        .args(octavia_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load registry"));
}

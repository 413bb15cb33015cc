#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const HEADER: &str =
    "student_id,student_name,exam_date,reading,use_of_english,writing,listening,speaking,notes\n";

fn tracker() -> Command {
    let mut cmd = Command::cargo_bin("c2-score-tracker").expect("binary should compile");
    cmd.env_remove("RUST_LOG")
        .env_remove("C2_SCORES_CSV")
        .env_remove("C2_LOG_LEVEL");
    cmd
}

fn write_scores(dir: &TempDir, rows: &str) -> std::path::PathBuf {
    let path = dir.path().join("scores.csv");
    fs::write(&path, format!("{HEADER}{rows}")).expect("scores file should be written");
    path
}

#[test]
fn convert_interpolates_reading_mark() {
    tracker()
        .args(["convert", "--component", "reading", "--raw", "32"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reading raw 32 -> scale 210"));
}

#[test]
fn convert_rejects_mark_above_maximum() {
    tracker()
        .args(["convert", "--component", "useOfEnglish", "--raw", "29"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum for Use of English is 28"));
}

#[test]
fn convert_rejects_unknown_component() {
    tracker()
        .args(["convert", "--component", "grammar", "--raw", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown skill component"));
}

#[test]
fn estimate_reports_overall_and_band() {
    tracker()
        .args([
            "estimate",
            "--reading",
            "36",
            "--use-of-english",
            "22",
            "--writing",
            "34",
            "--listening",
            "24",
            "--speaking",
            "66",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: 220 (5 of 5 skills)"))
        .stdout(predicate::str::contains("Band: Grade A (CEFR C2, certificate: yes)"));
}

#[test]
fn estimate_json_marks_partial_exam_incomplete() {
    let output = tracker()
        .args(["estimate", "--reading", "28", "--format", "json"])
        .output()
        .expect("estimate should run");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(value["scale_scores"]["reading"], 200);
    assert_eq!(value["overall"]["overall"], 200);
    assert_eq!(value["overall"]["included_count"], 1);
    assert_eq!(value["overall"]["is_complete"], false);
    assert_eq!(value["band"]["label"], "Grade C");
}

#[test]
fn estimate_rejects_quarter_speaking_marks() {
    tracker()
        .args(["estimate", "--speaking", "40.25"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("half marks only"));
}

#[test]
fn attention_lists_flagged_students_by_severity() {
    let dir = TempDir::new().expect("temp dir should be created");
    let csv = write_scores(
        &dir,
        "s1,Avery Lee,2026-01-05,28,17,24,18,45,\n\
         s2,Jules Moreno,2026-02-20,36,22,34,24,66,\n\
         s2,Jules Moreno,2026-03-01,28,17,24,18,45,\n\
         s3,Kiara Patel,2026-03-01,36,22,34,24,66,\n",
    );

    tracker()
        .arg("attention")
        .arg("--csv")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "- Jules Moreno (s2) [Regressing] Latest: 200 - dropped 20 pts",
        ))
        .stdout(predicate::str::contains("- Avery Lee (s1) [Inactive 4w]"))
        .stdout(predicate::str::contains("Kiara Patel").not());
}

#[test]
fn attention_json_uses_snake_case_reasons() {
    let dir = TempDir::new().expect("temp dir should be created");
    let csv = write_scores(
        &dir,
        "s1,Avery Lee,2026-02-20,22,,,,,\n\
         s1,Avery Lee,2026-03-01,22,,,,,\n",
    );

    let output = tracker()
        .arg("attention")
        .arg("--csv")
        .arg(&csv)
        .args(["--format", "json"])
        .output()
        .expect("attention should run");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(value[0]["flag"]["reason"], "below_pass");
    assert_eq!(value[0]["latest_overall"], 180);
}

#[test]
fn attention_reports_bad_row() {
    let dir = TempDir::new().expect("temp dir should be created");
    let csv = write_scores(&dir, "s1,Avery Lee,2026-02-20,45,,,,,\n");

    tracker()
        .arg("attention")
        .arg("--csv")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("row 2"));
}

#[test]
fn attention_reads_csv_path_from_env() {
    let dir = TempDir::new().expect("temp dir should be created");
    let csv = write_scores(&dir, "s1,Avery Lee,2026-03-01,36,22,34,24,66,\n");

    tracker()
        .arg("attention")
        .env("C2_SCORES_CSV", &csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Every student is on track."));
}

#[test]
fn seed_then_report_round_trip() {
    let dir = TempDir::new().expect("temp dir should be created");
    let csv = dir.path().join("seed.csv");
    let out = dir.path().join("report.md");

    tracker()
        .arg("seed")
        .arg("--out")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 13 sample entries"));

    tracker()
        .arg("report")
        .arg("--csv")
        .arg(&csv)
        .args(["--label", "Spring cohort"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let report = fs::read_to_string(&out).expect("report should exist");
    assert!(report.contains("Generated for Spring cohort (most recent exam 2026-03-09)"));
    assert!(report.contains("## Needs Attention"));
    assert!(report.contains("Jules Moreno [Regressing]"));
    assert!(report.contains("Sam Okafor [Incomplete]"));
}
